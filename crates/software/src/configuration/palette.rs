use wmidi::U7;

/// Colours (indices into the controller's built-in 128-colour palette) and LEDs used when painting the grid.
///
/// The "paint" sysex commands don't support RGB, so every colour is a palette index: 0 is black, 3 is white, 24 is
/// green, and so on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    /// Colour every pad is reset to before the highlight is drawn.
    pub background: U7,
    /// Colour of the highlighted rows, columns and notes.
    pub highlight: U7,
    /// Index of the LED which pulses to show the bridge is alive, by default the side LED.
    pub indicator_led: U7,
    /// Colour of the pulsing indicator LED.
    pub indicator: U7,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: U7::from_u8_lossy(0),
            highlight: U7::from_u8_lossy(3),
            indicator_led: U7::from_u8_lossy(0x63),
            indicator: U7::from_u8_lossy(3),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Palette {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "Palette {{ background: {}, highlight: {}, indicator_led: {}, indicator: {} }}",
            u8::from(self.background),
            u8::from(self.highlight),
            u8::from(self.indicator_led),
            u8::from(self.indicator)
        );
    }
}
