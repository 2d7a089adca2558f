use serde::{Deserialize, Serialize};

use crate::error::{JatosError, JatosResult};

use super::TrialAnalysis;

pub const TRIAL_ANALYSIS_JSON_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialAnalysisJsonContractV1 {
    pub schema_version: u32,
    pub trials: Vec<TrialAnalysis>,
}

impl TrialAnalysisJsonContractV1 {
    #[must_use]
    pub fn new(trials: Vec<TrialAnalysis>) -> Self {
        Self {
            schema_version: TRIAL_ANALYSIS_JSON_SCHEMA_V1,
            trials,
        }
    }

    pub fn to_json_pretty(&self) -> JatosResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            JatosError::InvalidData(format!("failed to serialize trial analysis contract v1: {e}"))
        })
    }

    /// Accepts either the versioned payload or a bare array of trials.
    pub fn from_json_compat_str(input: &str) -> JatosResult<Self> {
        if let Ok(trials) = serde_json::from_str::<Vec<TrialAnalysis>>(input) {
            return Ok(Self::new(trials));
        }
        let payload: Self = serde_json::from_str(input).map_err(|e| {
            JatosError::InvalidData(format!("failed to parse trial analysis json payload: {e}"))
        })?;
        if payload.schema_version != TRIAL_ANALYSIS_JSON_SCHEMA_V1 {
            return Err(JatosError::InvalidData(format!(
                "unsupported trial analysis schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload)
    }
}
