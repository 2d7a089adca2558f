//! TOML configuration for a post-processing run.
//!
//! Every section and field is optional; omitted values take the constants the
//! reading experiment was run with.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::AnalysisOptions;
use crate::core::{DwellPolicy, LayoutMetrics};
use crate::error::{JatosError, JatosResult};
use crate::font::{DEFAULT_FONT_SEARCH_PATHS, LoadedFont, load_font};
use crate::render::HeatmapStyle;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub layout: LayoutMetrics,
    pub dwell: DwellPolicy,
    pub font: FontConfig,
    pub heatmap: HeatmapStyle,
    pub logging: LoggingConfig,
}

/// Font used to re-measure the experiment text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Em size in pixels the experiment rendered text at.
    pub size_px: f64,
    /// Candidate font files, tried in order.
    pub search_paths: Vec<PathBuf>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            size_px: 18.0,
            search_paths: DEFAULT_FONT_SEARCH_PATHS
                .iter()
                .map(PathBuf::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `jatos_tools=debug`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}

impl AppConfig {
    /// Checks value ranges; returns the first offending field.
    pub fn validate(&self) -> JatosResult<()> {
        if self.layout.line_height == 0 {
            return Err(JatosError::Config("layout.line_height must be > 0".to_owned()));
        }
        self.dwell.validate().map_err(|err| match err {
            JatosError::InvalidArgument(message) => JatosError::Config(message),
            other => other,
        })?;
        if !self.font.size_px.is_finite() || self.font.size_px <= 0.0 {
            return Err(JatosError::Config(format!(
                "font.size_px must be finite and > 0, got {}",
                self.font.size_px
            )));
        }
        self.heatmap.validate()?;
        if self.logging.level.trim().is_empty() {
            return Err(JatosError::Config("logging.level must not be empty".to_owned()));
        }
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> JatosResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|err| JatosError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> JatosResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| JatosError::io(path, err))?;
        Self::from_toml_str(&content)
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> JatosResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_toml(&self) -> JatosResult<String> {
        toml::to_string_pretty(self).map_err(|err| JatosError::Config(err.to_string()))
    }

    #[must_use]
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            layout: self.layout,
            dwell: self.dwell,
        }
    }

    #[must_use]
    pub fn load_font(&self) -> LoadedFont {
        load_font(self.font.size_px, &self.font.search_paths)
    }
}

#[cfg(test)]
mod tests {
    use super::AppConfig;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = AppConfig::from_toml_str("").expect("empty config");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.layout.horizontal_padding, 30);
        assert_eq!(config.dwell.max_interval_ms, 1000.0);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [layout]
            line_height = 30

            [dwell]
            y_tolerance = 10.0
            "#,
        )
        .expect("partial config");
        assert_eq!(config.layout.line_height, 30);
        assert_eq!(config.layout.vertical_padding_top, 20);
        assert_eq!(config.dwell.y_tolerance, 10.0);
        assert_eq!(config.dwell.x_tolerance, 5.0);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(AppConfig::from_toml_str("[font]\nsize_px = 0.0").is_err());
        assert!(AppConfig::from_toml_str("[layout]\nline_height = 0").is_err());
        assert!(AppConfig::from_toml_str("[heatmap]\ncolors = [\"#ffffff\"]").is_err());
    }

    #[test]
    fn dwell_errors_read_as_configuration_errors() {
        let err = AppConfig::from_toml_str("[dwell]\nx_tolerance = -1.0").expect_err("negative");
        let message = err.to_string();
        assert!(message.starts_with("invalid configuration: "), "{message}");
        assert!(!message.contains("invalid argument"), "{message}");
        assert!(message.contains("x_tolerance"), "{message}");
    }

    #[test]
    fn toml_round_trip_preserves_config() {
        let config = AppConfig::default();
        let text = config.to_toml().expect("serialize");
        assert_eq!(AppConfig::from_toml_str(&text).expect("parse"), config);
    }
}
