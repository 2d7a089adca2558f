//! jatos-tools: post-processing for JATOS mouse-tracking reading studies.
//!
//! The crate flattens exported result archives, parses lab.js / JATOS
//! line-delimited logs into tables, reconstructs where each word of a reading
//! trial was drawn, and turns the pointer stream into per-word dwell times
//! that can be rendered as a heatmap.

pub mod api;
pub mod archive;
pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod font;
pub mod render;
pub mod telemetry;

pub use api::{AnalysisOptions, TrialAnalysis, analyze_trial, build_trials};
pub use config::AppConfig;
pub use error::{JatosError, JatosResult};
