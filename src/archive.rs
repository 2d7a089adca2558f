//! Flattening of a JATOS results archive.
//!
//! An exported archive nests each participant's data as
//! `study_result_<id>/comp-result_<n>/data.txt`. Collection renames every
//! `data.txt` to `<participant>_<component>.txt`, moves the files into a flat
//! `raw_data/` folder and prunes the folders left empty.
//!
//! Component numbers follow the sorted folder order, so all participants are
//! assumed to have completed the components in the same order.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{JatosError, JatosResult};

pub const STUDY_RESULT_PREFIX: &str = "study_result_";
pub const COMPONENT_RESULT_PREFIX: &str = "comp-result_";
pub const RAW_DATA_DIR: &str = "raw_data";
const DATA_FILE_NAME: &str = "data.txt";

/// Outcome of [`collect_data_files`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectReport {
    pub raw_data_dir: PathBuf,
    pub renamed: usize,
    /// Component folders that had no `data.txt`.
    pub missing: Vec<PathBuf>,
    pub moved: usize,
    pub folders_removed: usize,
}

/// Reorganizes the archive rooted at `data_dir` into `data_dir/raw_data`.
pub fn collect_data_files(data_dir: impl AsRef<Path>) -> JatosResult<CollectReport> {
    let root = data_dir.as_ref();
    let raw_data_dir = root.join(RAW_DATA_DIR);
    let mut report = CollectReport {
        raw_data_dir: raw_data_dir.clone(),
        ..CollectReport::default()
    };

    let study_folders = child_dirs(root, STUDY_RESULT_PREFIX)?;
    debug!(root = %root.display(), studies = study_folders.len(), "collecting data files");

    let plan = plan_moves(&study_folders, &raw_data_dir, &mut report.missing)?;
    check_destinations(&plan)?;

    for planned in &plan {
        if let Some(renamed) = &planned.renamed {
            fs::rename(&planned.source, renamed)
                .map_err(|err| JatosError::io(&planned.source, err))?;
            info!(from = %planned.source.display(), to = %renamed.display(), "renamed");
            report.renamed += 1;
        }
    }

    fs::create_dir_all(&raw_data_dir).map_err(|err| JatosError::io(&raw_data_dir, err))?;

    for planned in &plan {
        let file = planned.renamed.as_ref().unwrap_or(&planned.source);
        fs::rename(file, &planned.destination).map_err(|err| JatosError::io(file, err))?;
        info!(from = %file.display(), to = %planned.destination.display(), "moved");
        report.moved += 1;
    }

    for study_folder in &study_folders {
        for comp_folder in component_dirs(study_folder)? {
            if remove_if_empty(&comp_folder)? {
                report.folders_removed += 1;
            }
        }
        if remove_if_empty(study_folder)? {
            report.folders_removed += 1;
        }
    }

    info!(
        renamed = report.renamed,
        missing = report.missing.len(),
        moved = report.moved,
        folders_removed = report.folders_removed,
        "collected data files"
    );
    Ok(report)
}

/// One file headed for `raw_data/`, optionally renamed inside its component folder first.
#[derive(Debug)]
struct PlannedMove {
    source: PathBuf,
    renamed: Option<PathBuf>,
    destination: PathBuf,
}

/// Lists every rename and move up front so collisions surface before the archive changes.
fn plan_moves(
    study_folders: &[PathBuf],
    raw_data_dir: &Path,
    missing: &mut Vec<PathBuf>,
) -> JatosResult<Vec<PlannedMove>> {
    let mut plan = Vec::new();
    for study_folder in study_folders {
        let participant_id = participant_from_study_folder(study_folder)?;
        for (index, comp_folder) in component_dirs(study_folder)?.iter().enumerate() {
            let data_file = comp_folder.join(DATA_FILE_NAME);
            if data_file.is_file() {
                let name = format!("{participant_id}_{}.txt", index + 1);
                plan.push(PlannedMove {
                    source: data_file,
                    renamed: Some(comp_folder.join(&name)),
                    destination: raw_data_dir.join(name),
                });
            } else {
                warn!(path = %data_file.display(), "data file not found");
                missing.push(comp_folder.clone());
            }

            // Text files left over from an earlier, interrupted collection move as they are.
            for file in txt_files(comp_folder)? {
                let Some(name) = file.file_name() else {
                    continue;
                };
                if name == DATA_FILE_NAME {
                    continue;
                }
                plan.push(PlannedMove {
                    destination: raw_data_dir.join(name),
                    source: file,
                    renamed: None,
                });
            }
        }
    }
    Ok(plan)
}

fn check_destinations(plan: &[PlannedMove]) -> JatosResult<()> {
    let mut seen = HashSet::with_capacity(plan.len());
    for planned in plan {
        if planned.destination.exists() {
            return Err(JatosError::InvalidData(format!(
                "refusing to overwrite existing `{}`",
                planned.destination.display()
            )));
        }
        let renamed_over_existing = planned
            .renamed
            .as_ref()
            .is_some_and(|renamed| renamed.exists());
        if renamed_over_existing || !seen.insert(planned.destination.as_path()) {
            return Err(JatosError::InvalidData(format!(
                "two archive files would both become `{}`",
                planned.destination.display()
            )));
        }
    }
    Ok(())
}

/// Participant id encoded in a `study_result_<id>` folder name.
pub fn participant_from_study_folder(folder: &Path) -> JatosResult<String> {
    folder
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.split('_').nth(2))
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| {
            JatosError::InvalidData(format!(
                "cannot read participant id from `{}`",
                folder.display()
            ))
        })
}

/// Component folders ordered by their numeric suffix (`comp-result_2` before `comp-result_10`).
fn component_dirs(study_folder: &Path) -> JatosResult<Vec<PathBuf>> {
    let mut folders = child_dirs(study_folder, COMPONENT_RESULT_PREFIX)?;
    folders.sort_by_key(|folder| {
        let name = folder
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_owned();
        let number = name
            .strip_prefix(COMPONENT_RESULT_PREFIX)
            .and_then(|suffix| suffix.parse::<u64>().ok())
            .unwrap_or(u64::MAX);
        (number, name)
    });
    Ok(folders)
}

fn child_dirs(dir: &Path, prefix: &str) -> JatosResult<Vec<PathBuf>> {
    Ok(children(dir)?
        .into_iter()
        .filter(|(path, is_dir)| *is_dir && has_name_prefix(path, prefix))
        .map(|(path, _)| path)
        .collect())
}

fn txt_files(dir: &Path) -> JatosResult<Vec<PathBuf>> {
    Ok(children(dir)?
        .into_iter()
        .filter(|(path, is_dir)| {
            !*is_dir && path.extension().and_then(|ext| ext.to_str()) == Some("txt")
        })
        .map(|(path, _)| path)
        .collect())
}

/// Direct children of `dir` sorted by file name, paired with an is-directory flag.
fn children(dir: &Path) -> JatosResult<Vec<(PathBuf, bool)>> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| {
            entry
                .map(|entry| {
                    let is_dir = entry.file_type().is_dir();
                    (entry.into_path(), is_dir)
                })
                .map_err(|err| JatosError::io(dir, err.into()))
        })
        .collect()
}

fn has_name_prefix(path: &Path, prefix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(prefix))
}

fn remove_if_empty(dir: &Path) -> JatosResult<bool> {
    if !dir.is_dir() {
        return Ok(false);
    }
    let mut entries = fs::read_dir(dir).map_err(|err| JatosError::io(dir, err))?;
    if entries.next().is_some() {
        return Ok(false);
    }
    fs::remove_dir(dir).map_err(|err| JatosError::io(dir, err))?;
    info!(path = %dir.display(), "removed empty folder");
    Ok(true)
}
