use num_derive::{FromPrimitive, ToPrimitive};

/// Selects how the cursor moves and how it is painted onto the grid. See [`Cursor`][`crate::cursor::Cursor`].
#[derive(Debug, Default, Clone, Copy, ToPrimitive, FromPrimitive, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderMode {
    /// One row and one column are lit. Arrow buttons move the crosshair, wrapping around the edges of the grid.
    #[default]
    DiscreteCell,
    /// A two-by-two band of rows and columns is lit. Arrow buttons scroll the band, stopping at the edges.
    ViewportOffset,
}
impl super::CycleConfig for RenderMode {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::CycleConfig;

    #[test]
    fn cycles_between_both_modes() {
        assert_eq!(RenderMode::ViewportOffset, RenderMode::DiscreteCell.cycle());
        assert_eq!(
            RenderMode::DiscreteCell,
            RenderMode::ViewportOffset.cycle(),
            "Should wrap around to first variant; expected left but got right"
        );
    }
}
