//! Turns Control-Change events from the arrow buttons into cursor moves.

use crate::{
    cursor::{Cursor, Direction},
    packet::DecodedEvent,
};
use wmidi::MidiMessage;

/// Controller numbers the arrow buttons send in programmer layout.
pub mod arrow {
    /// Upward arrow
    pub const UP: u8 = 91;
    /// Downward arrow
    pub const DOWN: u8 = 92;
    /// Left arrow
    pub const LEFT: u8 = 93;
    /// Right arrow
    pub const RIGHT: u8 = 94;
}

/// Maps a controller number to the move it requests, if any.
pub fn direction(controller: u8) -> Option<Direction> {
    match controller {
        arrow::UP => Some(Direction::Up),
        arrow::DOWN => Some(Direction::Down),
        arrow::LEFT => Some(Direction::Left),
        arrow::RIGHT => Some(Direction::Right),
        _ => None,
    }
}

/// Applies `event` to `cursor`. Returns `true` when the cursor moved, i.e. when the grid needs repainting.
///
/// Only the press of an arrow button counts: the button sends a non-zero value when pressed and zero when released.
/// Anything else leaves the cursor alone.
pub fn interpret(cursor: &mut Cursor, event: &DecodedEvent) -> bool {
    let bytes = event.message_bytes();
    let Ok(message) = MidiMessage::from_bytes(&bytes) else {
        trace!(
            "Ignoring packet with message type {} which holds no MIDI message",
            event.message_type
        );
        return false;
    };

    match message {
        MidiMessage::ControlChange(channel, control_function, control_value) => {
            let Some(direction) = direction(u8::from(control_function)) else {
                debug!(
                    "Received unsupported Control Change {} on channel {}",
                    u8::from(control_function),
                    channel.number()
                );
                return false;
            };
            if u8::from(control_value) == 0 {
                return false;
            }

            let moved = cursor.step(direction);
            if moved {
                info!("Moved {} to {}", direction, cursor);
            } else {
                debug!("Cursor already at the edge, ignoring {}", direction);
            }
            moved
        }
        _ => {
            trace!("Ignoring message type {}", event.message_type);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control_change(controller: u8, value: u8) -> DecodedEvent {
        DecodedEvent {
            cable: 0,
            message_type: 0xB,
            channel: 0,
            data1: controller,
            data2: value,
        }
    }

    #[test]
    fn press_moves_cursor() {
        let mut cursor = Cursor::Cell { row: 5, col: 4 };
        assert!(interpret(&mut cursor, &control_change(arrow::RIGHT, 127)));
        assert_eq!(
            Cursor::Cell { row: 5, col: 5 },
            cursor,
            "Expected left but got right"
        );
    }

    #[test]
    fn every_arrow_is_recognized() {
        let mut cursor = Cursor::Cell { row: 5, col: 4 };
        interpret(&mut cursor, &control_change(arrow::UP, 1));
        interpret(&mut cursor, &control_change(arrow::LEFT, 1));
        assert_eq!(Cursor::Cell { row: 6, col: 3 }, cursor);
        interpret(&mut cursor, &control_change(arrow::DOWN, 1));
        interpret(&mut cursor, &control_change(arrow::RIGHT, 1));
        assert_eq!(Cursor::Cell { row: 5, col: 4 }, cursor);
    }

    #[test]
    fn release_is_ignored() {
        for controller in [arrow::UP, arrow::DOWN, arrow::LEFT, arrow::RIGHT] {
            let mut cursor = Cursor::Cell { row: 5, col: 4 };
            assert!(
                !interpret(&mut cursor, &control_change(controller, 0)),
                "Release of {} should not be dirty",
                controller
            );
            assert_eq!(Cursor::Cell { row: 5, col: 4 }, cursor);
        }
    }

    #[test]
    fn other_controllers_are_ignored() {
        let mut cursor = Cursor::default();
        assert!(!interpret(&mut cursor, &control_change(95, 127)));
        assert!(!interpret(&mut cursor, &control_change(0, 127)));
        assert_eq!(Cursor::default(), cursor);
    }

    #[test]
    fn other_message_types_are_ignored() {
        let mut cursor = Cursor::default();
        let note = DecodedEvent {
            message_type: 0x9,
            ..control_change(arrow::UP, 127)
        };
        assert!(!interpret(&mut cursor, &note));
        assert_eq!(Cursor::default(), cursor);
    }

    #[test]
    fn blocked_move_is_not_dirty() {
        let mut cursor = Cursor::Viewport {
            x_offset: 5,
            y_offset: 0,
        };
        assert!(!interpret(&mut cursor, &control_change(arrow::RIGHT, 127)));
        let mut cursor = Cursor::Viewport {
            x_offset: -5,
            y_offset: 0,
        };
        assert!(!interpret(&mut cursor, &control_change(arrow::LEFT, 127)));
    }

    #[test]
    fn any_channel_is_accepted() {
        let mut cursor = Cursor::Cell { row: 5, col: 4 };
        let event = DecodedEvent {
            channel: 9,
            ..control_change(arrow::DOWN, 127)
        };
        assert!(interpret(&mut cursor, &event));
        assert_eq!(Cursor::Cell { row: 4, col: 4 }, cursor, "Expected left but got right");
    }

    #[test]
    fn invalid_data_bytes_are_ignored() {
        let mut cursor = Cursor::default();
        assert!(
            !interpret(&mut cursor, &control_change(arrow::UP, 0xFF)),
            "A value with the high bit set is not a MIDI data byte"
        );
        assert!(!interpret(&mut cursor, &control_change(0x80 | arrow::UP, 127)));
        assert_eq!(Cursor::default(), cursor);
    }

    #[test]
    fn non_channel_messages_are_ignored() {
        let mut cursor = Cursor::default();
        let clock = DecodedEvent::decode(&[0x0F, 0xF8, 0, 0]);
        assert!(!interpret(&mut cursor, &clock));
        let stray = DecodedEvent::decode(&[0x00, 0x5B, 91, 127]);
        assert!(!interpret(&mut cursor, &stray));
        assert_eq!(Cursor::default(), cursor);
    }
}
