//! Decoding of USB-MIDI Event Packets.
//!
//! Every packet is 32 bits long:
//!
//! 0. the Packet Header: cable number in the high nibble, Code Index Number in the low nibble
//! 1. the MIDI status byte (message type in the high nibble, channel in the low nibble)
//! 2. data byte 1, varying by message type
//! 3. data byte 2, varying by message type
//!
//! Only the message type and data bytes are of interest to the controller; the rest is decoded for logging.

/// Length in bytes of a USB-MIDI Event Packet.
pub const PACKET_LEN: usize = 4;

/// A raw USB-MIDI Event Packet as delivered by (or handed to) a transport.
pub type Packet = [u8; PACKET_LEN];

/// A single packet, picked apart. Lives only as long as one interpretation cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodedEvent {
    /// Virtual cable the packet travelled on.
    pub cable: u8,
    /// High nibble of the status byte, e.g. `Bh` for a Control-Change. Unrecognized values are passed along untouched.
    pub message_type: u8,
    /// Low nibble of the status byte.
    pub channel: u8,
    /// First data byte; the controller number of a Control-Change.
    pub data1: u8,
    /// Second data byte; the value of a Control-Change.
    pub data2: u8,
}

impl DecodedEvent {
    /// Decodes a single packet. Never fails: every bit pattern maps to some event.
    pub fn decode(packet: &Packet) -> Self {
        let [header, status, data1, data2] = *packet;
        Self {
            cable: header >> 4,
            message_type: status >> 4,
            channel: status & 0xF,
            data1,
            data2,
        }
    }

    /// The three MIDI bytes the packet carries, status byte first, ready for
    /// [`MidiMessage::from_bytes`][`wmidi::MidiMessage::from_bytes`].
    pub fn message_bytes(&self) -> [u8; 3] {
        [(self.message_type << 4) | self.channel, self.data1, self.data2]
    }
}

/// Splits the bytes of one transport read into decoded events.
///
/// A read may carry several packets back to back. A zero-length read yields nothing; a trailing fragment shorter
/// than a full packet is logged and dropped.
pub fn decode_all(data: &[u8]) -> impl Iterator<Item = DecodedEvent> + '_ {
    data.chunks(PACKET_LEN).filter_map(|potential_packet| {
        match <&Packet>::try_from(potential_packet) {
            Ok(packet) => Some(DecodedEvent::decode(packet)),
            Err(_) => {
                error!(
                    "USB-MIDI Event Packets must always be 32 bits long, dropping {} bytes",
                    potential_packet.len()
                );
                None
            }
        }
    })
}
