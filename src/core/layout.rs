use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::WordBox;
use crate::error::{JatosError, JatosResult};
use crate::font::TextMeasurer;

/// Padding and line spacing the experiment used when drawing reading text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutMetrics {
    /// Total horizontal padding; half of it is the left margin.
    pub horizontal_padding: u32,
    pub vertical_padding_top: u32,
    pub line_height: u32,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            horizontal_padding: 30,
            vertical_padding_top: 20,
            line_height: 25,
        }
    }
}

impl LayoutMetrics {
    /// Baseline offset added below the top padding for the first line.
    pub const FIRST_LINE_OFFSET: u32 = 10;

    #[must_use]
    pub fn text_start_x(self) -> f64 {
        f64::from(self.horizontal_padding / 2)
    }

    #[must_use]
    pub fn line_y(self, line_index: usize) -> f64 {
        f64::from(self.vertical_padding_top)
            + f64::from(Self::FIRST_LINE_OFFSET)
            + line_index as f64 * f64::from(self.line_height)
    }
}

/// Reconstructs the word-wrapped layout of `text` on a canvas `canvas_width` px wide.
///
/// Words are the tokens of a split on single spaces, so repeated, leading or
/// trailing spaces yield empty words with zero-width boxes. A word wider than
/// the available width is never broken; it gets a line of its own.
///
/// The cursor is re-derived from the width of the whole line so far (plus one
/// space) instead of summing word and space widths, which keeps kerning and
/// rounding from drifting along long lines.
pub fn compute_word_boxes<M: TextMeasurer + ?Sized>(
    text: &str,
    canvas_width: u32,
    font: &M,
    metrics: LayoutMetrics,
) -> JatosResult<Vec<WordBox>> {
    if canvas_width == 0 {
        return Err(JatosError::InvalidArgument(
            "canvas width must be > 0".to_owned(),
        ));
    }

    let text_start_x = metrics.text_start_x();
    let available_width = f64::from(canvas_width) - f64::from(metrics.horizontal_padding);

    let mut boxes = Vec::new();
    let mut current_line = String::new();
    let mut cursor = text_start_x;
    let mut line_index = 0_usize;

    for word in text.split(' ') {
        let candidate = if current_line.is_empty() {
            word.to_owned()
        } else {
            format!("{current_line} {word}")
        };

        if font.text_width(&candidate) > available_width && !current_line.is_empty() {
            line_index += 1;
            current_line = word.to_owned();
            cursor = text_start_x;
        } else {
            if !current_line.is_empty() {
                current_line.push(' ');
                cursor = text_start_x + font.text_width(&current_line);
            }
            current_line = candidate;
        }

        let word_width = font.text_width(word);
        boxes.push(WordBox {
            word: word.to_owned(),
            word_index: boxes.len(),
            x_start: cursor,
            x_end: cursor + word_width,
            y_position: metrics.line_y(line_index),
            line_index,
        });
        cursor += word_width;
    }

    trace!(
        words = boxes.len(),
        lines = line_index + 1,
        canvas_width,
        "reconstructed text layout"
    );
    Ok(boxes)
}
