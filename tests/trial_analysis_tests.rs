use std::fs;
use std::path::{Path, PathBuf};

use jatos_tools::api::{
    AnalysisOptions, ReadingTrial, TRIAL_ANALYSIS_JSON_SCHEMA_V1, TrialAnalysisJsonContractV1,
    analyze_file, reading_trials,
};
use jatos_tools::core::{Canvas, PointerSample};
use jatos_tools::data::parse_trial_file;
use jatos_tools::font::FixedAdvanceMeasurer;
use jatos_tools::render::heatmap_file_name;
use jatos_tools::{JatosError, analyze_trial, build_trials};
use serde_json::json;
use tempfile::TempDir;

fn write_trial_file(dir: &Path, name: &str, rows: serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string(&rows).expect("serialize")).expect("write");
    path
}

fn study_rows() -> serde_json::Value {
    json!([
        {"trial_type": "instructions", "text_content": "Read carefully"},
        {
            "trial_type": "reading",
            "text_content": "the cat sat",
            "canvas_width": 200,
            "canvas_height": 100,
            "mouse_tracking_data": [
                {"x": 20.0, "y": 25.0, "timestamp": 0.0},
                {"x": 20.0, "y": 25.0, "timestamp": 500.0}
            ]
        },
        {
            "trial_type": "reading",
            "text_content": "hello",
            "canvas_width": 200.4,
            "canvas_height": 100,
            "mouse_tracking_data": null
        }
    ])
}

fn ten_px() -> FixedAdvanceMeasurer {
    FixedAdvanceMeasurer::new(10.0)
}

fn durations(analysis: &jatos_tools::TrialAnalysis) -> Vec<f64> {
    analysis
        .word_durations
        .iter()
        .map(|word| word.duration_ms)
        .collect()
}

#[test]
fn file_analysis_uses_each_trials_own_pointer_stream() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_trial_file(dir.path(), "6138_2.txt", study_rows());

    let trials = analyze_file(&path, &ten_px(), AnalysisOptions::default()).expect("analyze");

    assert_eq!(trials.len(), 2);
    assert_eq!(trials[0].participant_id, "6138");
    assert_eq!(trials[0].trial_num, 0);
    assert_eq!(durations(&trials[0]), vec![500.0, 0.0, 0.0]);
    assert_eq!(trials[0].mouse_data.len(), 2);

    assert_eq!(trials[1].trial_num, 1);
    assert_eq!(trials[1].canvas_width, 200);
    assert!(trials[1].mouse_data.is_empty());
    assert_eq!(durations(&trials[1]), vec![0.0]);
}

#[test]
fn build_trials_concatenates_files_in_order() {
    let dir = TempDir::new().expect("tempdir");
    let first = write_trial_file(dir.path(), "6138_2.txt", study_rows());
    let second = write_trial_file(
        dir.path(),
        "7001_1.txt",
        json!([{
            "trial_type": "reading",
            "text_content": "dog",
            "canvas_width": 300,
            "canvas_height": 120
        }]),
    );

    let trials = build_trials(&[first, second], &ten_px(), AnalysisOptions::default())
        .expect("build");

    let keys: Vec<(&str, usize)> = trials
        .iter()
        .map(|trial| (trial.participant_id.as_str(), trial.trial_num))
        .collect();
    assert_eq!(keys, vec![("6138", 0), ("6138", 1), ("7001", 0)]);
}

#[test]
fn components_of_one_participant_keep_distinct_sources() {
    let dir = TempDir::new().expect("tempdir");
    let first = write_trial_file(dir.path(), "6138_1.txt", study_rows());
    let second = write_trial_file(dir.path(), "6138_2.txt", study_rows());

    let trials = build_trials(&[first, second], &ten_px(), AnalysisOptions::default())
        .expect("build");

    let sources: Vec<&str> = trials.iter().map(|trial| trial.source.as_str()).collect();
    assert_eq!(sources, vec!["6138_1", "6138_1", "6138_2", "6138_2"]);
    assert!(trials.iter().all(|trial| trial.participant_id == "6138"));

    let mut names: Vec<String> = trials.iter().map(heatmap_file_name).collect();
    assert_eq!(names[0], "6138_1_trial0.png");
    assert_eq!(names[2], "6138_2_trial0.png");
    names.sort();
    names.dedup();
    assert_eq!(names.len(), trials.len());
}

#[test]
fn build_trials_stops_on_first_failing_file() {
    let dir = TempDir::new().expect("tempdir");
    let good = write_trial_file(dir.path(), "6138_2.txt", study_rows());
    let missing = dir.path().join("absent.txt");

    let err = build_trials(&[good, missing], &ten_px(), AnalysisOptions::default())
        .expect_err("missing file");
    assert!(matches!(err, JatosError::Io { .. }));
}

#[test]
fn reading_trial_without_canvas_width_is_invalid() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_trial_file(
        dir.path(),
        "1_1.txt",
        json!([{"trial_type": "reading", "text_content": "x", "canvas_height": 50}]),
    );
    let (_, table) = parse_trial_file(&path).expect("parse");

    let err = reading_trials(&table).expect_err("missing width");
    assert!(matches!(err, JatosError::InvalidData(_)));
}

#[test]
fn malformed_pointer_stream_is_invalid() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_trial_file(
        dir.path(),
        "1_1.txt",
        json!([{
            "trial_type": "reading",
            "text_content": "x",
            "canvas_width": 100,
            "canvas_height": 50,
            "mouse_tracking_data": [{"x": 1.0}]
        }]),
    );

    let err = analyze_file(&path, &ten_px(), AnalysisOptions::default()).expect_err("bad stream");
    assert!(matches!(err, JatosError::InvalidData(_)));
}

#[test]
fn empty_pointer_cell_counts_as_no_samples() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_trial_file(
        dir.path(),
        "1_1.txt",
        json!([{
            "trial_type": "reading",
            "text_content": "x",
            "canvas_width": 100,
            "canvas_height": 50,
            "mouse_tracking_data": ""
        }]),
    );

    let trials = analyze_file(&path, &ten_px(), AnalysisOptions::default()).expect("analyze");

    assert_eq!(trials.len(), 1);
    assert!(trials[0].mouse_data.is_empty());
    assert_eq!(durations(&trials[0]), vec![0.0]);
}

#[test]
fn empty_text_and_zero_width_are_rejected() {
    let empty_text = ReadingTrial {
        trial_num: 0,
        text_content: String::new(),
        canvas: Canvas::new(200, 100),
        mouse_data: Vec::new(),
    };
    let err = analyze_trial("1", empty_text, &ten_px(), AnalysisOptions::default())
        .expect_err("empty text");
    assert!(matches!(err, JatosError::InvalidArgument(_)));

    let zero_width = ReadingTrial {
        trial_num: 3,
        text_content: "word".to_owned(),
        canvas: Canvas::new(0, 100),
        mouse_data: vec![PointerSample::new(0.0, 0.0, 0.0)],
    };
    let err = analyze_trial("1", zero_width, &ten_px(), AnalysisOptions::default())
        .expect_err("zero width");
    assert!(matches!(err, JatosError::InvalidArgument(_)));
}

#[test]
fn contract_round_trips_and_accepts_bare_arrays() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_trial_file(dir.path(), "6138_2.txt", study_rows());
    let trials = analyze_file(&path, &ten_px(), AnalysisOptions::default()).expect("analyze");

    let contract = TrialAnalysisJsonContractV1::new(trials.clone());
    let json = contract.to_json_pretty().expect("serialize");
    let value: serde_json::Value = serde_json::from_str(&json).expect("json");
    assert_eq!(value["schema_version"], TRIAL_ANALYSIS_JSON_SCHEMA_V1);
    assert_eq!(value["trials"][0]["word_durations"][0]["word_number"], 0);
    assert_eq!(value["trials"][0]["source"], "6138_2");

    let parsed = TrialAnalysisJsonContractV1::from_json_compat_str(&json).expect("parse");
    assert_eq!(parsed, contract);

    let bare = serde_json::to_string(&trials).expect("bare array");
    let parsed = TrialAnalysisJsonContractV1::from_json_compat_str(&bare).expect("parse bare");
    assert_eq!(parsed.trials, trials);
}

#[test]
fn contract_rejects_unknown_schema_version() {
    let payload = json!({"schema_version": 2, "trials": []}).to_string();
    let err = TrialAnalysisJsonContractV1::from_json_compat_str(&payload).expect_err("v2");
    assert!(matches!(err, JatosError::InvalidData(_)));
}
