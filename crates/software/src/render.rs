//! Painting the cursor onto the controller.
//!
//! Every pass repaints the whole grid from scratch, so the output depends on nothing but the cursor and palette.
//! Nothing is cached between passes.

use crate::{
    bridge::{MidiSink, bridge},
    configuration::Palette,
    cursor::{Cursor, GRID_SIZE},
    sysex::Command,
};
use core::ops::RangeInclusive;
use tinyvec::{ArrayVec, array_vec};
use wmidi::{Note, U7};

/// Notes covered by the Note-On scan. In programmer layout note `n` is the pad at row `n / 10`, column `n % 10`.
const NOTE_SCAN: RangeInclusive<u8> = 1..=98;

/// Something visible which changes every time the grid is repainted, e.g. an LED.
pub trait StatusIndicator {
    /// Flips the indicator.
    fn toggle(&mut self);
}

/// The rows and columns lit by a cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Highlight {
    rows: ArrayVec<[u8; 2]>,
    columns: ArrayVec<[u8; 2]>,
}

impl Highlight {
    /// Works out which rows and columns `cursor` lights.
    pub fn of(cursor: &Cursor) -> Self {
        match *cursor {
            Cursor::Cell { row, col } => Self {
                rows: array_vec!([u8; 2] => row),
                columns: array_vec!([u8; 2] => col),
            },
            Cursor::Viewport { x_offset, y_offset } => Self {
                rows: band(y_offset),
                columns: band(x_offset),
            },
        }
    }

    /// Whether the pad at `row`, `col` lies on a highlighted row or column.
    pub fn covers(&self, row: u8, col: u8) -> bool {
        self.rows.contains(&row) || self.columns.contains(&col)
    }
}

/// The pair of indices `4 - offset` and `5 - offset`. An index pushed below zero is left out rather than clamped, so
/// the band thins out to a single line at the edge of the grid. Indices past the grid are left out too.
fn band(offset: i8) -> ArrayVec<[u8; 2]> {
    let offset = i16::from(offset);
    [4 - offset, 5 - offset]
        .into_iter()
        .filter_map(|index| u8::try_from(index).ok())
        .filter(|index| *index <= GRID_SIZE)
        .collect()
}

/// The full sequence of commands which paints `cursor` onto the grid.
///
/// In order: mode and layout selection (harmless to repeat), a wipe to the background colour, the highlighted
/// columns then rows, the pulsing indicator LED and a Note-On for every pad in the scan. The Note-Ons repeat the
/// highlight for peripherals which ignore the sysex commands.
pub fn commands(cursor: &Cursor, palette: &Palette) -> impl Iterator<Item = Command> + use<> {
    let highlight = Highlight::of(cursor);
    let Palette {
        background,
        highlight: color,
        indicator_led,
        indicator,
    } = *palette;

    let setup = [
        Command::SelectStandaloneMode,
        Command::SelectProgrammerLayout,
        Command::PaintAll { color: background },
    ];
    let columns = highlight.columns.into_iter().map(move |column| Command::PaintColumn {
        column: U7::from_u8_lossy(column),
        color,
    });
    let rows = highlight.rows.into_iter().map(move |row| Command::PaintRow {
        row: U7::from_u8_lossy(row),
        color,
    });
    let pulse = Command::PulseLed {
        led: indicator_led,
        color: indicator,
    };
    let notes = NOTE_SCAN.map(move |note| Command::NoteOn {
        note: Note::from(U7::from_u8_lossy(note)),
        velocity: if highlight.covers(note / 10, note % 10) {
            color
        } else {
            U7::from_u8_lossy(0)
        },
    });

    setup
        .into_iter()
        .chain(columns)
        .chain(rows)
        .chain(core::iter::once(pulse))
        .chain(notes)
}

/// Paints `cursor` through the bridge, then toggles the indicator so a render pass is visible at a glance.
pub async fn render<D, H, L>(
    cursor: &Cursor,
    palette: &Palette,
    device: &mut D,
    mut host: Option<&mut H>,
    indicator: &mut L,
) where
    D: MidiSink,
    H: MidiSink,
    L: StatusIndicator,
{
    debug!("Rendering {}", cursor);
    for command in commands(cursor, palette) {
        bridge(&command.encode(), device, host.as_deref_mut()).await;
    }
    indicator.toggle();
}
