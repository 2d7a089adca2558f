//! Trial-level pipeline: raw result file -> reading trials -> word dwell times.

mod json_contract;
mod reading_trial;
mod trial_analysis;

pub use json_contract::{TRIAL_ANALYSIS_JSON_SCHEMA_V1, TrialAnalysisJsonContractV1};
pub use reading_trial::{
    CANVAS_HEIGHT_COLUMN, CANVAS_WIDTH_COLUMN, MOUSE_TRACKING_COLUMN, READING_TRIAL_TYPE,
    ReadingTrial, TEXT_CONTENT_COLUMN, TRIAL_TYPE_COLUMN, participant_id, reading_trials,
    source_stem,
};
pub use trial_analysis::{
    AnalysisOptions, TrialAnalysis, analyze_file, analyze_trial, build_trials,
};
