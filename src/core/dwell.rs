use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::primitives::round_dp;
use crate::core::{PointerSample, WordBox, WordDuration};
use crate::error::{JatosError, JatosResult};

/// Hit-test tolerances and interval filter for dwell-time aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DwellPolicy {
    /// Horizontal slack in px added on both sides of a word box.
    pub x_tolerance: f64,
    /// Vertical slack in px around a word's y position.
    pub y_tolerance: f64,
    /// Intervals longer than this are tracking gaps and are not attributed.
    pub max_interval_ms: f64,
}

impl Default for DwellPolicy {
    fn default() -> Self {
        Self {
            x_tolerance: 5.0,
            y_tolerance: 15.0,
            max_interval_ms: 1000.0,
        }
    }
}

impl DwellPolicy {
    pub fn validate(self) -> JatosResult<()> {
        for (name, value) in [
            ("x_tolerance", self.x_tolerance),
            ("y_tolerance", self.y_tolerance),
            ("max_interval_ms", self.max_interval_ms),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(JatosError::InvalidArgument(format!(
                    "dwell policy `{name}` must be finite and >= 0"
                )));
            }
        }
        Ok(())
    }
}

/// Accumulates how long the pointer rested over each word box.
///
/// Each interval between consecutive samples is credited to the position of
/// its first sample. Intervals with `dt <= 0` or `dt > max_interval_ms` are
/// dropped, as are samples outside every box. When boxes overlap the first
/// box in layout order wins.
///
/// Returns one record per box in box order; fewer than two samples yields
/// all-zero durations. Durations are rounded to 2 decimals and coordinates to
/// 1 decimal only when the records are built.
pub fn compute_word_durations(
    samples: &[PointerSample],
    boxes: &[WordBox],
    policy: DwellPolicy,
) -> JatosResult<Vec<WordDuration>> {
    if boxes.is_empty() {
        return Err(JatosError::InvalidArgument(
            "word boxes must not be empty".to_owned(),
        ));
    }
    policy.validate()?;

    let mut durations = vec![0.0_f64; boxes.len()];
    let mut attributed = 0_usize;

    for pair in samples.windows(2) {
        let (point, next) = (pair[0], pair[1]);
        let dt = next.timestamp - point.timestamp;
        if !(dt > 0.0 && dt <= policy.max_interval_ms) {
            continue;
        }

        if let Some(position) = boxes.iter().position(|word_box| {
            word_box.contains(point.x, point.y, policy.x_tolerance, policy.y_tolerance)
        }) {
            durations[position] += dt;
            attributed += 1;
        }
    }

    trace!(
        samples = samples.len(),
        words = boxes.len(),
        attributed,
        "aggregated word durations"
    );

    Ok(boxes
        .iter()
        .zip(durations)
        .map(|(word_box, duration)| WordDuration {
            word_index: word_box.word_index,
            word: word_box.word.clone(),
            duration_ms: round_dp(duration, 2),
            x_start: round_dp(word_box.x_start, 1),
            x_end: round_dp(word_box.x_end, 1),
            y_position: round_dp(word_box.y_position, 1),
            line_index: word_box.line_index,
        })
        .collect())
}
