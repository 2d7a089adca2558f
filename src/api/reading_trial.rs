use std::path::Path;

use serde_json::Value;

use crate::core::{Canvas, PointerSample};
use crate::data::{DataTable, Record};
use crate::error::{JatosError, JatosResult};

pub const TRIAL_TYPE_COLUMN: &str = "trial_type";
pub const READING_TRIAL_TYPE: &str = "reading";
pub const TEXT_CONTENT_COLUMN: &str = "text_content";
pub const CANVAS_WIDTH_COLUMN: &str = "canvas_width";
pub const CANVAS_HEIGHT_COLUMN: &str = "canvas_height";
pub const MOUSE_TRACKING_COLUMN: &str = "mouse_tracking_data";

/// Inputs of one reading trial: the text shown, the canvas and the pointer stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingTrial {
    /// Zero-based position among the reading trials of its file.
    pub trial_num: usize,
    pub text_content: String,
    pub canvas: Canvas,
    pub mouse_data: Vec<PointerSample>,
}

impl ReadingTrial {
    /// Extracts a reading trial from one table row.
    ///
    /// A missing, `null` or empty `mouse_tracking_data` cell yields an empty
    /// pointer stream; every other column is required.
    pub fn from_record(trial_num: usize, record: &Record) -> JatosResult<Self> {
        let text_content = record
            .get(TEXT_CONTENT_COLUMN)
            .and_then(Value::as_str)
            .ok_or_else(|| missing_column(trial_num, TEXT_CONTENT_COLUMN, "a string"))?
            .to_owned();

        let canvas = Canvas::new(
            pixel_dimension(trial_num, record, CANVAS_WIDTH_COLUMN)?,
            pixel_dimension(trial_num, record, CANVAS_HEIGHT_COLUMN)?,
        );

        let mouse_data = match record.get(MOUSE_TRACKING_COLUMN) {
            None | Some(Value::Null) => Vec::new(),
            // lab.js writes an empty cell when the pointer never moved.
            Some(Value::String(text)) if text.trim().is_empty() => Vec::new(),
            Some(value) => serde_json::from_value(value.clone()).map_err(|err| {
                JatosError::InvalidData(format!(
                    "reading trial {trial_num}: malformed `{MOUSE_TRACKING_COLUMN}`: {err}"
                ))
            })?,
        };

        Ok(Self {
            trial_num,
            text_content,
            canvas,
            mouse_data,
        })
    }
}

/// All rows with `trial_type == "reading"`, numbered in table order.
pub fn reading_trials(table: &DataTable) -> JatosResult<Vec<ReadingTrial>> {
    table
        .rows_where(TRIAL_TYPE_COLUMN, READING_TRIAL_TYPE)
        .enumerate()
        .map(|(trial_num, record)| ReadingTrial::from_record(trial_num, record))
        .collect()
}

/// Participant id encoded as the first `_` token of a raw file name (`6138_2.txt`).
#[must_use]
pub fn participant_id(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| name.split('_').next().map(str::to_owned))
        .unwrap_or_default()
}

/// File stem of a raw file (`6138_2` for `raw_data/6138_2.txt`), unique per component.
#[must_use]
pub fn source_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn pixel_dimension(trial_num: usize, record: &Record, column: &str) -> JatosResult<u32> {
    let value = record
        .get(column)
        .and_then(Value::as_f64)
        .ok_or_else(|| missing_column(trial_num, column, "a number"))?;

    if !value.is_finite() || value < 0.0 || value > f64::from(u32::MAX) {
        return Err(JatosError::InvalidData(format!(
            "reading trial {trial_num}: `{column}` out of range: {value}"
        )));
    }
    Ok(value.round() as u32)
}

fn missing_column(trial_num: usize, column: &str, expected: &str) -> JatosError {
    JatosError::InvalidData(format!(
        "reading trial {trial_num}: `{column}` must be {expected}"
    ))
}
