//! Conversion of a raw MIDI byte stream into USB-MIDI Event Packets.
//!
//! Transports accept whole MIDI messages (e.g. a Note-On triple or a sysex fragment) but the wire carries fixed
//! 4-byte packets whose header encodes how many of the three payload bytes are meaningful. The encoder keeps state
//! between calls because a sysex may be spread over many writes.

use crate::{
    packet::Packet,
    sysex::{SYSEX_END, SYSEX_START},
};

/// Code Index Numbers, per table 4-1 of the USB Device Class Definition for MIDI Devices.
mod cin {
    pub const SYSTEM_COMMON_2: u8 = 0x2;
    pub const SYSTEM_COMMON_3: u8 = 0x3;
    pub const SYSEX_CONTINUE: u8 = 0x4;
    /// Also used for single-byte system common messages.
    pub const SYSEX_END_1: u8 = 0x5;
    pub const SYSEX_END_2: u8 = 0x6;
    pub const SYSEX_END_3: u8 = 0x7;
    pub const SINGLE_BYTE: u8 = 0xF;
}

/// Stateful MIDI-to-USB-MIDI packetizer for a single cable.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamEncoder {
    cable: u8,
    pending: [u8; 3],
    len: usize,
    /// Number of bytes the message in progress needs; zero when idle or inside a sysex.
    expected: usize,
    in_sysex: bool,
}

impl StreamEncoder {
    /// Constructs an encoder stamping `cable` (0-15) into every packet header.
    pub fn new(cable: u8) -> Self {
        Self {
            cable: cable & 0xF,
            ..Self::default()
        }
    }

    /// Feeds bytes through the encoder, handing each completed packet to `emit`.
    ///
    /// Every input byte ends up in exactly one packet, except for bytes of an unfinished message, which stay pending
    /// until a later call completes them.
    pub fn encode(&mut self, bytes: &[u8], mut emit: impl FnMut(Packet)) {
        for &byte in bytes {
            self.push(byte, &mut emit);
        }
    }

    fn push(&mut self, byte: u8, emit: &mut impl FnMut(Packet)) {
        match byte {
            SYSEX_START => {
                self.reset();
                self.in_sysex = true;
                self.append(byte);
            }
            SYSEX_END if self.in_sysex => {
                self.append(byte);
                let code = match self.len {
                    1 => cin::SYSEX_END_1,
                    2 => cin::SYSEX_END_2,
                    _ => cin::SYSEX_END_3,
                };
                self.release(code, emit);
                self.in_sysex = false;
            }
            // real-time messages may be interleaved anywhere, even inside a sysex
            0xF8..=0xFF => emit(self.packet(cin::SINGLE_BYTE, [byte, 0, 0])),
            0xF1 | 0xF3 => self.begin(byte, 2),
            0xF2 => self.begin(byte, 3),
            0xF4..=0xF7 => {
                self.reset();
                emit(self.packet(cin::SYSEX_END_1, [byte, 0, 0]));
            }
            0x80..=0xEF => self.begin(byte, if matches!(byte >> 4, 0xC | 0xD) { 2 } else { 3 }),
            _ if self.in_sysex => {
                self.append(byte);
                if self.len == 3 {
                    self.release(cin::SYSEX_CONTINUE, emit);
                }
            }
            _ if self.expected > 0 => {
                self.append(byte);
                if self.len == self.expected {
                    let code = match self.pending[0] {
                        0xF1 | 0xF3 => cin::SYSTEM_COMMON_2,
                        0xF2 => cin::SYSTEM_COMMON_3,
                        status => status >> 4,
                    };
                    self.release(code, emit);
                }
            }
            _ => {
                trace!("Stray data byte {} outside of any message", byte);
                emit(self.packet(cin::SINGLE_BYTE, [byte, 0, 0]));
            }
        }
    }

    fn begin(&mut self, status: u8, expected: usize) {
        self.reset();
        self.append(status);
        self.expected = expected;
    }

    fn append(&mut self, byte: u8) {
        self.pending[self.len] = byte;
        self.len += 1;
    }

    fn release(&mut self, code: u8, emit: &mut impl FnMut(Packet)) {
        let mut payload = [0; 3];
        payload[..self.len].copy_from_slice(&self.pending[..self.len]);
        emit(self.packet(code, payload));
        self.len = 0;
        self.expected = 0;
    }

    fn reset(&mut self) {
        if self.len > 0 {
            debug!("Discarding {} bytes of an incomplete message", self.len);
        }
        self.len = 0;
        self.expected = 0;
        self.in_sysex = false;
    }

    fn packet(&self, code: u8, [a, b, c]: [u8; 3]) -> Packet {
        [(self.cable << 4) | code, a, b, c]
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::vec::Vec;

    fn encode(encoder: &mut StreamEncoder, bytes: &[u8]) -> Vec<Packet> {
        let mut packets = Vec::new();
        encoder.encode(bytes, |p| packets.push(p));
        packets
    }

    #[test]
    fn note_on() {
        let mut encoder = StreamEncoder::new(0);
        assert_eq!(
            std::vec![[0x09, 0x90, 45, 3]],
            encode(&mut encoder, &[0x90, 45, 3]),
            "Expected left but got right"
        );
    }

    #[test]
    fn cable_is_stamped_in_header() {
        let mut encoder = StreamEncoder::new(1);
        assert_eq!(
            std::vec![[0x19, 0x90, 1, 0]],
            encode(&mut encoder, &[0x90, 1, 0]),
            "Expected left but got right"
        );
    }

    #[test]
    fn program_change_is_two_bytes() {
        let mut encoder = StreamEncoder::new(0);
        assert_eq!(
            std::vec![[0x0C, 0xC0, 5, 0]],
            encode(&mut encoder, &[0xC0, 5])
        );
    }

    #[test]
    fn complete_sysex() {
        let mut encoder = StreamEncoder::new(0);
        let bytes = [0xF0, 0x00, 0x20, 0x29, 0x02, 0x10, 0x0E, 0x00, 0xF7];
        assert_eq!(
            std::vec![
                [0x04, 0xF0, 0x00, 0x20],
                [0x04, 0x29, 0x02, 0x10],
                [0x07, 0x0E, 0x00, 0xF7],
            ],
            encode(&mut encoder, &bytes),
            "Expected left but got right"
        );
    }

    #[test]
    fn sysex_end_with_one_and_two_bytes() {
        let mut encoder = StreamEncoder::new(0);
        assert_eq!(
            std::vec![[0x04, 0xF0, 1, 2], [0x05, 0xF7, 0, 0]],
            encode(&mut encoder, &[0xF0, 1, 2, 0xF7])
        );
        assert_eq!(
            std::vec![[0x04, 0xF0, 1, 2], [0x06, 3, 0xF7, 0]],
            encode(&mut encoder, &[0xF0, 1, 2, 3, 0xF7])
        );
    }

    #[test]
    fn sysex_spans_calls() {
        let mut encoder = StreamEncoder::new(0);
        assert!(encode(&mut encoder, &[0xF0, 1]).is_empty());
        assert_eq!(
            std::vec![[0x04, 0xF0, 1, 2], [0x05, 0xF7, 0, 0]],
            encode(&mut encoder, &[2, 0xF7]),
            "Expected left but got right"
        );
    }

    #[test]
    fn real_time_inside_sysex() {
        let mut encoder = StreamEncoder::new(0);
        assert_eq!(
            std::vec![[0x0F, 0xF8, 0, 0], [0x04, 0xF0, 1, 2]],
            encode(&mut encoder, &[0xF0, 1, 0xF8, 2])
        );
    }

    #[test]
    fn stray_bytes_are_not_lost() {
        let mut encoder = StreamEncoder::new(0);
        assert_eq!(
            std::vec![[0x05, 0xF7, 0, 0], [0x0F, 0x29, 0, 0], [0x0F, 0x02, 0, 0]],
            encode(&mut encoder, &[0xF7, 0x29, 0x02]),
            "Expected left but got right"
        );
    }
}
