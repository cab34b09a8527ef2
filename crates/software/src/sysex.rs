//! Builders for the messages the controller understands.
//!
//! Apart from Note-On, every command is a system exclusive message in the controller's vendor protocol:
//!
//! `F0h 00h 20h 29h 02h 10h <opcode> <payload...> F7h`
//!
//! Payload bytes are [`U7`]s, so a built message can never carry a stray status byte between its delimiters.

use tinyvec::{ArrayVec, array_vec};
use wmidi::{Channel, MidiMessage, Note, U7};

/// Opening byte of a system exclusive message.
pub const SYSEX_START: u8 = 0xF0;
/// Closing byte of a system exclusive message.
pub const SYSEX_END: u8 = 0xF7;

/// Manufacturer ID (`00h 20h 29h`) followed by the device family bytes (`02h 10h`).
const VENDOR_PREFIX: [u8; 5] = [0x00, 0x20, 0x29, 0x02, 0x10];

/// Number of pads in a painted row or column.
const LINE_LEN: usize = 10;

/// An encoded message, ready to be bridged. Large enough for the longest command (a painted row or column).
pub type Message = ArrayVec<[u8; 32]>;

mod opcode {
    pub const PAINT_COLUMN: u8 = 0x0C;
    pub const PAINT_ROW: u8 = 0x0D;
    pub const PAINT_ALL: u8 = 0x0E;
    pub const SELECT_LAYOUT: u8 = 0x16;
    pub const PULSE_LED: u8 = 0x28;
    pub const SELECT_MODE: u8 = 0x2C;
}

// payloads selecting "standalone" mode and "programmer" layout
const STANDALONE_MODE: u8 = 0x03;
const PROGRAMMER_LAYOUT: u8 = 0x03;

/// A single illumination or set-up command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Select "standalone" mode. It's the default, but users who also use Ableton may have left the controller in
    /// another mode.
    SelectStandaloneMode,
    /// Select "programmer" layout ("note" layout is the default).
    SelectProgrammerLayout,
    /// Paint every pad the same colour.
    PaintAll {
        /// Palette index.
        color: U7,
    },
    /// Paint all ten pads of a column the same colour.
    PaintColumn {
        /// Column index, 0 being the leftmost.
        column: U7,
        /// Palette index.
        color: U7,
    },
    /// Paint all ten pads of a row the same colour.
    PaintRow {
        /// Row index, 0 being the bottom.
        row: U7,
        /// Palette index.
        color: U7,
    },
    /// "Pulse" a single LED using a colour from the palette.
    PulseLed {
        /// LED index, e.g. `63h` for the side LED.
        led: U7,
        /// Palette index.
        color: U7,
    },
    /// A plain Note-On on the first channel. In programmer layout the note number addresses the pad at
    /// `row * 10 + column`, and the velocity is its palette colour.
    NoteOn {
        /// Pad to light.
        note: Note,
        /// Palette index.
        velocity: U7,
    },
}

impl Command {
    /// Encodes the command into the bytes which go over the wire.
    pub fn encode(&self) -> Message {
        match *self {
            Self::SelectStandaloneMode => sysex(opcode::SELECT_MODE, &[STANDALONE_MODE]),
            Self::SelectProgrammerLayout => sysex(opcode::SELECT_LAYOUT, &[PROGRAMMER_LAYOUT]),
            Self::PaintAll { color } => sysex(opcode::PAINT_ALL, &[u8::from(color)]),
            Self::PaintColumn { column, color } => paint_line(opcode::PAINT_COLUMN, column, color),
            Self::PaintRow { row, color } => paint_line(opcode::PAINT_ROW, row, color),
            Self::PulseLed { led, color } => {
                sysex(opcode::PULSE_LED, &[u8::from(led), u8::from(color)])
            }
            Self::NoteOn { note, velocity } => {
                let mut data = [0; 32];
                let len = MidiMessage::NoteOn(Channel::Ch1, note, velocity)
                    .copy_to_slice(&mut data)
                    .unwrap_or_default();
                Message::from_array_len(data, len)
            }
        }
    }
}

fn paint_line(opcode: u8, index: U7, color: U7) -> Message {
    let mut payload = [u8::from(color); LINE_LEN + 1];
    payload[0] = u8::from(index);
    sysex(opcode, &payload)
}

/// Frames a payload of 7-bit bytes with the vendor header and the closing delimiter.
fn sysex(opcode: u8, payload: &[u8]) -> Message {
    let mut message: Message = array_vec!();
    message.push(SYSEX_START);
    message.extend_from_slice(&VENDOR_PREFIX);
    message.push(opcode);
    message.extend_from_slice(payload);
    message.push(SYSEX_END);
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u7(value: u8) -> U7 {
        U7::from_u8_lossy(value)
    }

    #[test]
    fn standalone_mode() {
        assert_eq!(
            [0xF0, 0x00, 0x20, 0x29, 0x02, 0x10, 0x2C, 0x03, 0xF7],
            Command::SelectStandaloneMode.encode().as_slice(),
            "Expected left but got right"
        );
    }

    #[test]
    fn programmer_layout() {
        assert_eq!(
            [0xF0, 0x00, 0x20, 0x29, 0x02, 0x10, 0x16, 0x03, 0xF7],
            Command::SelectProgrammerLayout.encode().as_slice(),
            "Expected left but got right"
        );
    }

    #[test]
    fn paint_all() {
        assert_eq!(
            [0xF0, 0x00, 0x20, 0x29, 0x02, 0x10, 0x0E, 0x00, 0xF7],
            Command::PaintAll { color: u7(0) }.encode().as_slice(),
            "Expected left but got right"
        );
    }

    #[test]
    fn paint_column() {
        let expected = [
            0xF0, 0x00, 0x20, 0x29, 0x02, 0x10, 0x0C, 0x04, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 0xF7,
        ];
        let actual = Command::PaintColumn {
            column: u7(4),
            color: u7(3),
        }
        .encode();
        assert_eq!(expected, actual.as_slice(), "Expected left but got right");
    }

    #[test]
    fn paint_row() {
        let actual = Command::PaintRow {
            row: u7(5),
            color: u7(24),
        }
        .encode();
        assert_eq!(19, actual.len());
        assert_eq!([0x0D, 0x05, 24], actual[6..9], "Expected left but got right");
        assert_eq!(Some(&SYSEX_END), actual.last());
    }

    #[test]
    fn pulse_led() {
        assert_eq!(
            [0xF0, 0x00, 0x20, 0x29, 0x02, 0x10, 0x28, 0x63, 0x03, 0xF7],
            Command::PulseLed {
                led: u7(0x63),
                color: u7(3)
            }
            .encode()
            .as_slice(),
            "Expected left but got right"
        );
    }

    #[test]
    fn note_on() {
        assert_eq!(
            [0x90, 45, 3],
            Command::NoteOn {
                note: Note::from(u7(45)),
                velocity: u7(3)
            }
            .encode()
            .as_slice(),
            "Expected left but got right"
        );
    }
}
