//! Text measurement used to reconstruct where the experiment drew each word.
//!
//! Layout only needs the pixel width of a string. Callers can plug in a real
//! TrueType font ([`GlyphFont`]), or the fixed-advance measurer which doubles
//! as a deterministic test table and as the built-in fallback font.

mod glyph;

pub use glyph::{DEFAULT_FONT_SEARCH_PATHS, GlyphFont, LoadedFont, load_font};

/// Contract implemented by any font metrics provider.
///
/// Implementations must be deterministic: the layout compares widths of
/// overlapping strings and relies on identical results for identical input.
pub trait TextMeasurer {
    /// Width in pixels of `text` rendered on a single line.
    fn text_width(&self, text: &str) -> f64;
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for &T {
    fn text_width(&self, text: &str) -> f64 {
        (**self).text_width(text)
    }
}

/// Monospaced measurer: every character advances by the same amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedAdvanceMeasurer {
    advance_px: f64,
}

impl FixedAdvanceMeasurer {
    #[must_use]
    pub const fn new(advance_px: f64) -> Self {
        Self { advance_px }
    }

    /// Built-in approximation of a proportional font at `font_size_px`.
    ///
    /// Assumes an average glyph advance of 0.6 em.
    #[must_use]
    pub fn builtin(font_size_px: f64) -> Self {
        Self::new(0.6 * font_size_px)
    }

    #[must_use]
    pub fn advance_px(self) -> f64 {
        self.advance_px
    }
}

impl TextMeasurer for FixedAdvanceMeasurer {
    fn text_width(&self, text: &str) -> f64 {
        self.advance_px * text.chars().count() as f64
    }
}
