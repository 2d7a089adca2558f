use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{ReadingTrial, participant_id, reading_trials, source_stem};
use crate::core::{
    DwellPolicy, LayoutMetrics, PointerSample, WordBox, WordDuration, compute_word_boxes,
    compute_word_durations,
};
use crate::data::parse_trial_file;
use crate::error::{JatosError, JatosResult};
use crate::font::TextMeasurer;

/// Layout and aggregation parameters shared by every trial of a run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisOptions {
    pub layout: LayoutMetrics,
    pub dwell: DwellPolicy,
}

/// Everything computed for one reading trial, ready for export or rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialAnalysis {
    pub participant_id: String,
    /// Stem of the raw file the trial was read from (`6138_2`); empty when the
    /// trial was analyzed on its own.
    #[serde(default)]
    pub source: String,
    pub trial_num: usize,
    pub text_content: String,
    pub mouse_data: Vec<PointerSample>,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub word_positions: Vec<WordBox>,
    pub word_durations: Vec<WordDuration>,
}

/// Reconstructs the layout of one trial and aggregates its pointer stream.
///
/// Fails before any computation when the text is empty or the canvas has no
/// width.
pub fn analyze_trial<M: TextMeasurer + ?Sized>(
    participant_id: &str,
    trial: ReadingTrial,
    font: &M,
    options: AnalysisOptions,
) -> JatosResult<TrialAnalysis> {
    if trial.text_content.is_empty() {
        return Err(JatosError::InvalidArgument(format!(
            "trial {}: text must not be empty",
            trial.trial_num
        )));
    }
    if trial.canvas.width == 0 {
        return Err(JatosError::InvalidArgument(format!(
            "trial {}: canvas width must be > 0",
            trial.trial_num
        )));
    }

    let word_positions =
        compute_word_boxes(&trial.text_content, trial.canvas.width, font, options.layout)?;
    let word_durations = compute_word_durations(&trial.mouse_data, &word_positions, options.dwell)?;

    debug!(
        participant_id,
        trial_num = trial.trial_num,
        words = word_positions.len(),
        samples = trial.mouse_data.len(),
        "analyzed reading trial"
    );

    Ok(TrialAnalysis {
        participant_id: participant_id.to_owned(),
        source: String::new(),
        trial_num: trial.trial_num,
        text_content: trial.text_content,
        mouse_data: trial.mouse_data,
        canvas_width: trial.canvas.width,
        canvas_height: trial.canvas.height,
        word_positions,
        word_durations,
    })
}

/// Analyzes every reading trial of one raw result file.
pub fn analyze_file<M: TextMeasurer + ?Sized>(
    path: impl AsRef<Path>,
    font: &M,
    options: AnalysisOptions,
) -> JatosResult<Vec<TrialAnalysis>> {
    let path = path.as_ref();
    let (format, table) = parse_trial_file(path)?;
    let participant = participant_id(path);
    let trials = reading_trials(&table)?;
    debug!(
        path = %path.display(),
        ?format,
        rows = table.len(),
        reading_trials = trials.len(),
        "loaded raw trial file"
    );

    let source = source_stem(path);
    trials
        .into_iter()
        .map(|trial| {
            let mut analysis = analyze_trial(&participant, trial, font, options)?;
            analysis.source.clone_from(&source);
            Ok(analysis)
        })
        .collect()
}

/// Analyzes all reading trials across `raw_files`, in file then trial order.
pub fn build_trials<P, M>(
    raw_files: &[P],
    font: &M,
    options: AnalysisOptions,
) -> JatosResult<Vec<TrialAnalysis>>
where
    P: AsRef<Path> + Sync,
    M: TextMeasurer + Sync + ?Sized,
{
    #[cfg(feature = "parallel")]
    let per_file: Vec<Vec<TrialAnalysis>> = {
        use rayon::prelude::*;
        raw_files
            .par_iter()
            .map(|path| analyze_file(path, font, options))
            .collect::<JatosResult<_>>()?
    };

    #[cfg(not(feature = "parallel"))]
    let per_file: Vec<Vec<TrialAnalysis>> = raw_files
        .iter()
        .map(|path| analyze_file(path, font, options))
        .collect::<JatosResult<_>>()?;

    Ok(per_file.into_iter().flatten().collect())
}
