use serde::{Deserialize, Serialize};

/// Pixel dimensions of the experiment canvas a trial was rendered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// One pointer position captured by the experiment, timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
    pub timestamp: f64,
}

impl PointerSample {
    #[must_use]
    pub fn new(x: f64, y: f64, timestamp: f64) -> Self {
        Self { x, y, timestamp }
    }
}

/// Pixel bounding box of one word in the reconstructed text layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordBox {
    pub word: String,
    pub word_index: usize,
    pub x_start: f64,
    pub x_end: f64,
    pub y_position: f64,
    pub line_index: usize,
}

impl WordBox {
    /// Returns whether `(x, y)` lies inside this box grown by the tolerances.
    ///
    /// Bounds are inclusive on every side.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64, x_tolerance: f64, y_tolerance: f64) -> bool {
        (self.x_start - x_tolerance) <= x
            && x <= (self.x_end + x_tolerance)
            && (self.y_position - y_tolerance) <= y
            && y <= (self.y_position + y_tolerance)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.x_end - self.x_start
    }
}

/// Dwell time accumulated over one word box.
///
/// Index fields serialize under the column names used by downstream analysis
/// scripts (`word_number`, `line_number`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordDuration {
    #[serde(rename = "word_number")]
    pub word_index: usize,
    pub word: String,
    pub duration_ms: f64,
    pub x_start: f64,
    pub x_end: f64,
    pub y_position: f64,
    #[serde(rename = "line_number")]
    pub line_index: usize,
}
