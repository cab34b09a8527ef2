//! The cursor is the only mutable domain state of the bridge: the highlighted position on the controller's grid.

use crate::configuration::RenderMode;

/// Number of rows (and columns) on the controller's grid, including the surrounding buttons.
pub const GRID_SIZE: u8 = 10;

/// Furthest a [`Cursor::Viewport`] may be displaced from the centre along either axis.
pub const MAX_OFFSET: i8 = 5;

/// A directional move requested by the performer via one of the arrow buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Upward arrow
    Up,
    /// Downward arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
}

/// Where the highlight sits. The two variants are mutually exclusive rendering modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Cursor {
    /// A single highlighted row and column. Both coordinates wrap around the edges of the grid.
    Cell {
        /// Highlighted row, 0-9.
        row: u8,
        /// Highlighted column, 0-9.
        col: u8,
    },
    /// A two-by-two block of rows and columns displaced from the centre of the grid. Offsets are clamped to
    /// `-MAX_OFFSET..=MAX_OFFSET`; a move past a bound does nothing.
    Viewport {
        /// Horizontal displacement; the highlighted columns are `4 - x_offset` and `5 - x_offset`.
        x_offset: i8,
        /// Vertical displacement; the highlighted rows are `4 - y_offset` and `5 - y_offset`.
        y_offset: i8,
    },
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new(RenderMode::default())
    }
}

impl Cursor {
    /// Returns the starting position for the given mode.
    pub fn new(mode: RenderMode) -> Self {
        match mode {
            RenderMode::DiscreteCell => Self::Cell { row: 5, col: 4 },
            RenderMode::ViewportOffset => Self::Viewport {
                x_offset: 0,
                y_offset: 0,
            },
        }
    }

    /// The mode this cursor is rendered in.
    pub fn mode(&self) -> RenderMode {
        match self {
            Self::Cell { .. } => RenderMode::DiscreteCell,
            Self::Viewport { .. } => RenderMode::ViewportOffset,
        }
    }

    /// Moves the cursor one step. Returns `true` if the position actually changed.
    ///
    /// A position outside the grid is brought back onto it by the move.
    pub fn step(&mut self, direction: Direction) -> bool {
        let before = *self;
        match self {
            Self::Cell { row, col } => match direction {
                Direction::Up => *row = (*row % GRID_SIZE + 1) % GRID_SIZE,
                Direction::Down => *row = (*row % GRID_SIZE + GRID_SIZE - 1) % GRID_SIZE,
                Direction::Left => *col = (*col % GRID_SIZE + GRID_SIZE - 1) % GRID_SIZE,
                Direction::Right => *col = (*col % GRID_SIZE + 1) % GRID_SIZE,
            },
            Self::Viewport { x_offset, y_offset } => match direction {
                Direction::Up => *y_offset = clamp_offset(y_offset.saturating_sub(1)),
                Direction::Down => *y_offset = clamp_offset(y_offset.saturating_add(1)),
                Direction::Left => *x_offset = clamp_offset(x_offset.saturating_sub(1)),
                Direction::Right => *x_offset = clamp_offset(x_offset.saturating_add(1)),
            },
        }
        *self != before
    }
}

fn clamp_offset(offset: i8) -> i8 {
    offset.clamp(-MAX_OFFSET, MAX_OFFSET)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(row: u8, col: u8) -> Cursor {
        Cursor::Cell { row, col }
    }

    fn viewport(x_offset: i8, y_offset: i8) -> Cursor {
        Cursor::Viewport { x_offset, y_offset }
    }

    #[test]
    fn defaults() {
        assert_eq!(cell(5, 4), Cursor::new(RenderMode::DiscreteCell));
        assert_eq!(viewport(0, 0), Cursor::new(RenderMode::ViewportOffset));
        assert_eq!(RenderMode::DiscreteCell, Cursor::default().mode());
    }

    #[test]
    fn up_wraps_forward() {
        let mut cursor = cell(5, 4);
        let mut rows = [0; 5];
        for row in rows.iter_mut() {
            assert!(cursor.step(Direction::Up), "Every step should move the cell");
            if let Cursor::Cell { row: r, .. } = cursor {
                *row = r;
            }
        }
        assert_eq!([6, 7, 8, 9, 0], rows, "Expected left but got right");
    }

    #[test]
    fn down_wraps_backward() {
        let mut cursor = cell(0, 4);
        cursor.step(Direction::Down);
        assert_eq!(cell(9, 4), cursor, "Expected left but got right");
    }

    #[test]
    fn columns_wrap() {
        let mut cursor = cell(5, 9);
        cursor.step(Direction::Right);
        assert_eq!(cell(5, 0), cursor);
        cursor.step(Direction::Left);
        assert_eq!(cell(5, 9), cursor);
    }

    #[test]
    fn offsets_move_within_bounds() {
        let mut cursor = viewport(0, 0);
        assert!(cursor.step(Direction::Up));
        assert!(cursor.step(Direction::Right));
        assert_eq!(viewport(1, -1), cursor, "Expected left but got right");
    }

    #[test]
    fn offsets_clamp_at_bounds() {
        let mut cursor = viewport(5, 5);
        assert!(!cursor.step(Direction::Right), "Should not move past the upper bound");
        assert!(!cursor.step(Direction::Down), "Should not move past the upper bound");
        assert_eq!(viewport(5, 5), cursor);

        let mut cursor = viewport(-5, -5);
        assert!(!cursor.step(Direction::Left), "Should not move past the lower bound");
        assert!(!cursor.step(Direction::Up), "Should not move past the lower bound");
        assert_eq!(viewport(-5, -5), cursor);
    }

    #[test]
    fn cell_off_the_grid_steps_back_on() {
        let mut cursor = cell(250, u8::MAX);
        assert!(cursor.step(Direction::Up));
        assert!(cursor.step(Direction::Left));
        assert_eq!(cell(1, 4), cursor, "Expected left but got right");

        let mut cursor = cell(u8::MAX, 247);
        cursor.step(Direction::Down);
        cursor.step(Direction::Right);
        assert_eq!(cell(4, 8), cursor, "Expected left but got right");
    }

    #[test]
    fn offsets_past_the_bounds_are_pulled_in() {
        let mut cursor = viewport(-125, i8::MAX);
        assert!(cursor.step(Direction::Left));
        assert_eq!(viewport(-5, i8::MAX), cursor, "Expected left but got right");
        assert!(cursor.step(Direction::Down));
        assert_eq!(viewport(-5, 5), cursor, "Expected left but got right");

        let mut cursor = viewport(i8::MIN, 0);
        assert!(cursor.step(Direction::Right));
        assert_eq!(viewport(-5, 0), cursor, "Expected left but got right");
    }
}
