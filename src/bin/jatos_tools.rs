use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use jatos_tools::AppConfig;
use jatos_tools::api::{TrialAnalysis, TrialAnalysisJsonContractV1, build_trials};
use jatos_tools::archive::collect_data_files;
use jatos_tools::data::{DataTable, parse_jatos_data, parse_labjs_data, parse_trial_file};
use jatos_tools::telemetry::init_default_tracing;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(
    name = "jatos-tools",
    about = "Post-process JATOS exports of mouse-tracking reading studies"
)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, overrides `[logging] level`
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Flatten a results archive into `<DATA_DIR>/raw_data`
    Collect {
        data_dir: PathBuf,
    },
    /// Parse one raw result file into a JSON table
    Parse {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = ParseFormat::Auto)]
        format: ParseFormat,
        /// Keep the lab.js metadata row
        #[arg(long)]
        keep_meta: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compute word layouts and dwell times for every reading trial
    Analyze {
        /// Raw result files, or directories of `.txt` files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render one PNG heatmap per reading trial
    Heatmap {
        /// Raw result files, or directories of `.txt` files
        inputs: Vec<PathBuf>,
        /// Previously written `analyze` output instead of raw files
        #[arg(long, conflicts_with = "inputs")]
        from_analysis: Option<PathBuf>,
        #[arg(long, default_value = "heatmaps")]
        out_dir: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ParseFormat {
    /// Detect a single-array file or one object per line
    Auto,
    Labjs,
    Jatos,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(cli.config.as_deref())
        .with_context(|| format!("failed to load config from {:?}", cli.config))?;
    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    let _ = init_default_tracing(level);

    match cli.command {
        Command::Collect { data_dir } => {
            let report = collect_data_files(&data_dir)
                .with_context(|| format!("failed to collect {}", data_dir.display()))?;
            println!(
                "moved {} files into {} ({} renamed, {} missing, {} folders removed)",
                report.moved,
                report.raw_data_dir.display(),
                report.renamed,
                report.missing.len(),
                report.folders_removed
            );
        }
        Command::Parse {
            file,
            format,
            keep_meta,
            output,
        } => {
            let table = parse_table(&file, format, keep_meta)?;
            write_output(output.as_deref(), &table.to_json_records_pretty()?)?;
        }
        Command::Analyze { inputs, output } => {
            let trials = analyze_inputs(&config, &inputs)?;
            let json = TrialAnalysisJsonContractV1::new(trials).to_json_pretty()?;
            write_output(output.as_deref(), &json)?;
        }
        Command::Heatmap {
            inputs,
            from_analysis,
            out_dir,
        } => {
            let trials = match from_analysis {
                Some(path) => {
                    let raw = fs::read_to_string(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    TrialAnalysisJsonContractV1::from_json_compat_str(&raw)?.trials
                }
                None if inputs.is_empty() => bail!("no inputs given"),
                None => analyze_inputs(&config, &inputs)?,
            };
            render_heatmaps(&config, &trials, &out_dir)?;
        }
    }

    Ok(())
}

fn parse_table(file: &Path, format: ParseFormat, keep_meta: bool) -> Result<DataTable> {
    let table = match format {
        ParseFormat::Auto => parse_trial_file(file).map(|(_, table)| table),
        ParseFormat::Labjs => parse_labjs_data(file, !keep_meta),
        ParseFormat::Jatos => parse_jatos_data(file),
    };
    table.with_context(|| format!("failed to parse {}", file.display()))
}

fn analyze_inputs(config: &AppConfig, inputs: &[PathBuf]) -> Result<Vec<TrialAnalysis>> {
    let files = expand_inputs(inputs)?;
    if files.is_empty() {
        bail!("no .txt files found in the given inputs");
    }
    let font = config.load_font();
    let trials = build_trials(&files, &font, config.analysis_options())?;
    tracing::info!(
        files = files.len(),
        trials = trials.len(),
        "analyzed reading trials"
    );
    Ok(trials)
}

/// Files are taken as given; directories contribute their `.txt` files in name order.
fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        for entry in WalkDir::new(input)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.with_context(|| format!("failed to list {}", input.display()))?;
            let path = entry.path();
            if entry.file_type().is_file()
                && path.extension().and_then(|ext| ext.to_str()) == Some("txt")
            {
                files.push(entry.into_path());
            }
        }
    }
    Ok(files)
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            println!("{content}");
            Ok(())
        }
    }
}

#[cfg(feature = "cairo-backend")]
fn render_heatmaps(config: &AppConfig, trials: &[TrialAnalysis], out_dir: &Path) -> Result<()> {
    use jatos_tools::render::{CairoRenderer, heatmap_canvas, heatmap_file_name, render_heatmap};

    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    for trial in trials {
        let mut renderer = CairoRenderer::new(heatmap_canvas(trial, &config.heatmap))?
            .with_font_family(config.heatmap.font_family.as_str());
        render_heatmap(&mut renderer, trial, &config.heatmap).with_context(|| {
            format!(
                "failed to render participant {} trial {}",
                trial.participant_id, trial.trial_num
            )
        })?;
        renderer.write_png(out_dir.join(heatmap_file_name(trial)))?;
    }
    println!("wrote {} heatmaps to {}", trials.len(), out_dir.display());
    Ok(())
}

#[cfg(not(feature = "cairo-backend"))]
fn render_heatmaps(config: &AppConfig, trials: &[TrialAnalysis], _out_dir: &Path) -> Result<()> {
    use jatos_tools::render::{NullRenderer, render_heatmap};

    let mut renderer = NullRenderer::default();
    for trial in trials {
        render_heatmap(&mut renderer, trial, &config.heatmap)?;
    }
    bail!(
        "validated {} heatmap frames, but PNG output needs the `cairo-backend` feature",
        renderer.frames_rendered
    )
}
