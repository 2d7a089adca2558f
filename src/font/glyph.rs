use std::fmt;
use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use tracing::{debug, warn};

use crate::error::{JatosError, JatosResult};
use crate::font::{FixedAdvanceMeasurer, TextMeasurer};

/// Font files tried by [`load_font`], in order.
pub const DEFAULT_FONT_SEARCH_PATHS: &[&str] = &[
    "arial.ttf",
    "C:/Windows/Fonts/arial.ttf",
    "/usr/share/fonts/truetype/msttcorefonts/Arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
    "/Library/Fonts/Arial.ttf",
];

/// TrueType/OpenType font measured through glyph advances and kerning.
pub struct GlyphFont {
    font: FontVec,
    scale: PxScale,
    size_px: f64,
    source: Option<PathBuf>,
}

impl GlyphFont {
    /// Parses font bytes (first face of a collection) at an em size of `size_px`.
    pub fn from_bytes(bytes: Vec<u8>, size_px: f64) -> JatosResult<Self> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(JatosError::InvalidArgument(
                "font size must be finite and > 0".to_owned(),
            ));
        }

        let font = FontVec::try_from_vec_and_index(bytes, 0)
            .map_err(|err| JatosError::InvalidData(format!("failed to parse font: {err}")))?;

        // PxScale is expressed in line height; convert so one em == size_px.
        let units_per_em = font.units_per_em().unwrap_or(1000.0);
        let height_per_em = font.height_unscaled() / units_per_em;
        let scale = PxScale::from(size_px as f32 * height_per_em);

        Ok(Self {
            font,
            scale,
            size_px,
            source: None,
        })
    }

    pub fn open(path: impl AsRef<Path>, size_px: f64) -> JatosResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|err| JatosError::io(path, err))?;
        let mut font = Self::from_bytes(bytes, size_px)?;
        font.source = Some(path.to_path_buf());
        Ok(font)
    }

    #[must_use]
    pub fn size_px(&self) -> f64 {
        self.size_px
    }

    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

impl fmt::Debug for GlyphFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphFont")
            .field("size_px", &self.size_px)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl TextMeasurer for GlyphFont {
    fn text_width(&self, text: &str) -> f64 {
        let scaled = self.font.as_scaled(self.scale);
        let mut width = 0.0_f32;
        let mut previous = None;

        for ch in text.chars() {
            let glyph_id = scaled.glyph_id(ch);
            if let Some(previous_id) = previous {
                width += scaled.kern(previous_id, glyph_id);
            }
            width += scaled.h_advance(glyph_id);
            previous = Some(glyph_id);
        }

        f64::from(width)
    }
}

/// Font handed to the layout: either a real font file or the built-in fallback.
#[derive(Debug)]
pub enum LoadedFont {
    Glyph(GlyphFont),
    Builtin(FixedAdvanceMeasurer),
}

impl LoadedFont {
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin(_))
    }
}

impl TextMeasurer for LoadedFont {
    fn text_width(&self, text: &str) -> f64 {
        match self {
            Self::Glyph(font) => font.text_width(text),
            Self::Builtin(measurer) => measurer.text_width(text),
        }
    }
}

/// Loads the first usable font from `search_paths`.
///
/// Never fails: when no candidate can be opened the built-in measurer is
/// returned and a warning is logged.
pub fn load_font<P: AsRef<Path>>(size_px: f64, search_paths: &[P]) -> LoadedFont {
    for path in search_paths {
        let path = path.as_ref();
        match GlyphFont::open(path, size_px) {
            Ok(font) => {
                debug!(path = %path.display(), size_px, "loaded font");
                return LoadedFont::Glyph(font);
            }
            Err(err) => {
                debug!(path = %path.display(), error = %err, "font candidate rejected");
            }
        }
    }

    warn!(
        size_px,
        "no font file found, using built-in font; word positions may be less accurate"
    );
    LoadedFont::Builtin(FixedAdvanceMeasurer::builtin(size_px))
}
