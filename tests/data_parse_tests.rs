use std::fs;
use std::path::{Path, PathBuf};

use jatos_tools::JatosError;
use jatos_tools::data::{TrialFileFormat, parse_jatos_data, parse_labjs_data, parse_trial_file};
use serde_json::{Value, json};
use tempfile::TempDir;

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write fixture");
    path
}

const LABJS_FILE: &str = concat!(
    r#"[{"labjs_version":"20.2.4","meta":{"user_agent":"test"}},{"sender":"welcome","duration":812}]"#,
    "\n",
    r#"{"sender":"reading","duration":4310,"response":"space"}"#,
    "\n",
);

#[test]
fn labjs_rows_drop_metadata_row_by_default_flag() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_file(dir.path(), "labjs.txt", LABJS_FILE);

    let table = parse_labjs_data(&path, true).expect("parse");

    assert_eq!(table.len(), 2);
    assert_eq!(table.cell(0, "sender"), Some(&json!("welcome")));
    assert_eq!(table.cell(1, "response"), Some(&json!("space")));
    // Metadata columns stay in the union even after the row is removed.
    assert!(table.has_column("labjs_version"));
}

#[test]
fn labjs_metadata_row_can_be_kept() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_file(dir.path(), "labjs.txt", LABJS_FILE);

    let table = parse_labjs_data(&path, false).expect("parse");

    assert_eq!(table.len(), 3);
    assert_eq!(table.cell(0, "labjs_version"), Some(&json!("20.2.4")));
    assert_eq!(
        table.columns().collect::<Vec<_>>(),
        vec!["labjs_version", "meta", "sender", "duration", "response"]
    );
}

#[test]
fn non_labjs_file_is_rejected_by_labjs_parser() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_file(dir.path(), "other.txt", "{\"sender\":\"x\"}\n");

    let err = parse_labjs_data(&path, true).expect_err("missing marker");
    assert!(matches!(
        err,
        JatosError::UnrecognizedFormat {
            expected: "lab.js",
            ..
        }
    ));
}

#[test]
fn malformed_line_reports_its_line_number() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_file(dir.path(), "broken.txt", "{\"a\":1}\n{\"a\":\n");

    let err = parse_jatos_data(&path).expect_err("malformed json");
    match err {
        JatosError::Json { line, path: at, .. } => {
            assert_eq!(line, 2);
            assert_eq!(at, path);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn jatos_rows_union_columns_and_skip_blank_lines() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_file(
        dir.path(),
        "jatos.txt",
        "{\"trial\":1,\"rt\":530}\n\n{\"trial\":2,\"correct\":true}\n",
    );

    let table = parse_jatos_data(&path).expect("parse");

    assert_eq!(table.len(), 2);
    assert_eq!(
        table.columns().collect::<Vec<_>>(),
        vec!["trial", "rt", "correct"]
    );
    let dense = table.dense_records();
    assert_eq!(dense[0]["correct"], Value::Null);
    assert_eq!(dense[1]["rt"], Value::Null);
}

#[test]
fn jatos_parser_rejects_non_object_lines() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_file(dir.path(), "array.txt", "[{\"a\":1}]\n");

    let err = parse_jatos_data(&path).expect_err("array line");
    assert!(matches!(err, JatosError::InvalidData(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().expect("tempdir");
    let err = parse_jatos_data(dir.path().join("absent.txt")).expect_err("missing");
    assert!(matches!(err, JatosError::Io { .. }));
}

#[test]
fn trial_file_detects_single_array_layout() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_file(
        dir.path(),
        "6138_2.txt",
        r#"[{"trial_type":"instructions"},{"trial_type":"reading","text_content":"the cat"}]"#,
    );

    let (format, table) = parse_trial_file(&path).expect("parse");

    assert_eq!(format, TrialFileFormat::SingleArray);
    assert_eq!(table.len(), 2);
    assert_eq!(table.rows_where("trial_type", "reading").count(), 1);
}

#[test]
fn trial_file_falls_back_to_object_per_line() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_file(
        dir.path(),
        "6138_3.txt",
        "{\"trial_type\":\"reading\"}\n{\"trial_type\":\"survey\"}\n",
    );

    let (format, table) = parse_trial_file(&path).expect("parse");

    assert_eq!(format, TrialFileFormat::ObjectPerLine);
    assert_eq!(table.len(), 2);
}

#[test]
fn json_export_is_dense_and_ordered() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_file(dir.path(), "jatos.txt", "{\"b\":1}\n{\"a\":2}\n");

    let table = parse_jatos_data(&path).expect("parse");
    let exported: Value =
        serde_json::from_str(&table.to_json_records_pretty().expect("json")).expect("reparse");

    assert_eq!(exported, json!([{"b": 1, "a": null}, {"b": null, "a": 2}]));
}
