use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::data::{DataTable, Record};
use crate::error::{JatosError, JatosResult};

const LABJS_MARKER: &str = "\"labjs_version\"";

/// Layout of a raw result file, as detected by [`parse_trial_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialFileFormat {
    /// A single line holding a JSON array of trial objects.
    SingleArray,
    /// One trial object per line.
    ObjectPerLine,
}

/// Parses a lab.js result file into a table.
///
/// Each line is either an array of row objects or a single row object. The
/// first row carries session metadata (lab.js version, user agent, ...) and is
/// dropped when `remove_meta_data` is set.
pub fn parse_labjs_data(path: impl AsRef<Path>, remove_meta_data: bool) -> JatosResult<DataTable> {
    let path = path.as_ref();
    let content = read_file(path)?;

    let first_line = content.lines().next().unwrap_or_default();
    if !first_line.contains(LABJS_MARKER) {
        return Err(JatosError::UnrecognizedFormat {
            path: path.to_path_buf(),
            expected: "lab.js",
        });
    }

    let mut table = DataTable::new();
    for (line_number, value) in json_lines(path, &content)? {
        match value {
            Value::Array(items) => {
                for item in items {
                    table.push_row(into_record(path, line_number, item)?);
                }
            }
            other => table.push_row(into_record(path, line_number, other)?),
        }
    }

    if remove_meta_data {
        table.remove_first_row();
    }

    debug!(path = %path.display(), rows = table.len(), "parsed lab.js data");
    Ok(table)
}

/// Parses a generic JATOS result file: one JSON object per line, one row each.
pub fn parse_jatos_data(path: impl AsRef<Path>) -> JatosResult<DataTable> {
    let path = path.as_ref();
    let content = read_file(path)?;

    let mut table = DataTable::new();
    for (line_number, value) in json_lines(path, &content)? {
        table.push_row(into_record(path, line_number, value)?);
    }

    debug!(path = %path.display(), rows = table.len(), "parsed jatos data");
    Ok(table)
}

/// Parses a raw trial file in either layout used by reading studies.
pub fn parse_trial_file(path: impl AsRef<Path>) -> JatosResult<(TrialFileFormat, DataTable)> {
    let path = path.as_ref();
    let content = read_file(path)?;
    let mut lines = json_lines(path, &content)?;

    if let [(line_number, Value::Array(items))] = lines.as_mut_slice() {
        let line_number = *line_number;
        let rows = std::mem::take(items)
            .into_iter()
            .map(|item| into_record(path, line_number, item))
            .collect::<JatosResult<Vec<_>>>()?;
        debug!(path = %path.display(), rows = rows.len(), "parsed single-array trial file");
        return Ok((TrialFileFormat::SingleArray, DataTable::from_rows(rows)));
    }

    let rows = lines
        .into_iter()
        .map(|(line_number, value)| into_record(path, line_number, value))
        .collect::<JatosResult<Vec<_>>>()?;
    Ok((TrialFileFormat::ObjectPerLine, DataTable::from_rows(rows)))
}

fn read_file(path: &Path) -> JatosResult<String> {
    std::fs::read_to_string(path).map_err(|err| JatosError::io(path, err))
}

/// Decodes every non-blank line; line numbers are 1-based.
fn json_lines(path: &Path, content: &str) -> JatosResult<Vec<(usize, Value)>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line)
                .map(|value| (index + 1, value))
                .map_err(|source| JatosError::Json {
                    path: path.to_path_buf(),
                    line: index + 1,
                    source,
                })
        })
        .collect()
}

fn into_record(path: &Path, line_number: usize, value: Value) -> JatosResult<Record> {
    match value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        other => Err(JatosError::InvalidData(format!(
            "`{}` line {line_number}: expected a json object, found {}",
            path.display(),
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
