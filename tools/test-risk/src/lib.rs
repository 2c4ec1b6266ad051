pub mod blocking;
pub mod config;
pub mod errors;
pub mod failure_analysis;
pub mod failure_risk;
pub mod keywords;
pub mod logging;
pub mod narrative;
pub mod output_envelope;
pub mod prioritization;
pub mod related;
pub mod report;
pub mod risk_model;
pub mod runtime;
pub mod timeline;
pub mod types;

use chrono::{DateTime, Utc};
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use config::{load_config, CliOverrides, OutputFormat};
use errors::RiskEngineError;
use failure_analysis::analyze_failure_by_id;
use logging::{append_run_log, install_run_log, JsonlLogger};
use output_envelope::{build_envelope, input_fingerprint, ReportKind};
use prioritization::prioritize;
use report::{render_failure_analysis_markdown, render_prioritization_markdown};
use runtime::{FileSystem, ProductionRuntime};
use serde_json::json;
use std::path::{Path, PathBuf};
use types::TestCase;

#[derive(Debug, Clone, Parser)]
#[command(name = "test-risk")]
#[command(about = "Rank test cases by predicted failure risk and analyze observed failures")]
pub struct Cli {
    /// JSON array of test case records.
    #[arg(long)]
    pub cases: PathBuf,
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Reference time (RFC 3339 or YYYY-MM-DD); defaults to the system clock.
    #[arg(long)]
    pub now: Option<String>,
    #[arg(long, value_enum)]
    pub format: Option<CliFormat>,
    #[arg(long)]
    pub run_log: Option<PathBuf>,
    #[arg(long = "analyze-failure", value_name = "TEST_ID")]
    pub analyze_failure: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliFormat {
    Json,
    Markdown,
}

impl From<CliFormat> for OutputFormat {
    fn from(value: CliFormat) -> Self {
        match value {
            CliFormat::Json => OutputFormat::Json,
            CliFormat::Markdown => OutputFormat::Markdown,
        }
    }
}

pub fn run() -> Result<i32, RiskEngineError> {
    let args = std::env::args_os().collect::<Vec<_>>();
    let runtime = ProductionRuntime::new();
    run_with_runtime(&args, &runtime)
}

pub fn run_with_runtime(
    args: &[std::ffi::OsString],
    runtime: &ProductionRuntime,
) -> Result<i32, RiskEngineError> {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                runtime.terminal.write_line(error.to_string().trim_end())?;
                return Ok(0);
            }
            _ => return Err(RiskEngineError::Cli(error.to_string())),
        },
    };

    if cli.analyze_failure.is_some() && cli.description.is_none() {
        return Err(RiskEngineError::Cli(
            "--analyze-failure requires --description".to_string(),
        ));
    }

    let overrides = CliOverrides {
        config_path: cli.config.clone(),
        format: cli.format.map(Into::into),
        run_log: cli.run_log.clone(),
    };
    let cfg = load_config(&overrides, runtime.file_system.as_ref())?;

    if let Some(path) = &cfg.logging.path {
        install_run_log(JsonlLogger {
            path: path.clone(),
            max_payload_bytes: cfg.logging.max_payload_bytes,
            min_level: cfg.logging.level,
        });
    }

    let now = resolve_now(cli.now.as_deref(), runtime)?;
    let test_cases = load_test_cases(runtime.file_system.as_ref(), &cli.cases)?;
    let mode = if cli.analyze_failure.is_some() {
        "failure_analysis"
    } else {
        "prioritization"
    };
    append_run_log(
        "info",
        "cli.inputs.loaded",
        json!({
            "cases_path": cli.cases.display().to_string(),
            "test_case_count": test_cases.len(),
            "now": now.to_rfc3339(),
            "mode": mode,
        }),
    );

    let rendered = match (&cli.analyze_failure, &cli.description) {
        (Some(failed_id), Some(description)) => {
            let analysis =
                analyze_failure_by_id(failed_id, description, &test_cases, &cfg.engine)?;
            match cfg.output.format {
                OutputFormat::Markdown => render_failure_analysis_markdown(&analysis),
                OutputFormat::Json => {
                    let fingerprint = input_fingerprint(&json!({
                        "test_cases": test_cases,
                        "engine": cfg.engine,
                        "failed_id": failed_id,
                        "description": description,
                    }))?;
                    render_json(ReportKind::FailureAnalysis, fingerprint, &analysis)?
                }
            }
        }
        _ => {
            let result = prioritize(&test_cases, &cfg.engine, now)?;
            match cfg.output.format {
                OutputFormat::Markdown => render_prioritization_markdown(&result),
                OutputFormat::Json => {
                    let fingerprint = input_fingerprint(&json!({
                        "test_cases": test_cases,
                        "engine": cfg.engine,
                        "now": now.to_rfc3339(),
                    }))?;
                    render_json(ReportKind::Prioritization, fingerprint, &result)?
                }
            }
        }
    };

    match &cli.output {
        Some(path) => {
            write_report(runtime.file_system.as_ref(), path, &rendered)?;
            runtime
                .terminal
                .write_line(&format!("report written: {}", path.display()))?;
        }
        None => runtime.terminal.write_line(rendered.trim_end())?,
    }
    Ok(0)
}

fn resolve_now(
    raw: Option<&str>,
    runtime: &ProductionRuntime,
) -> Result<DateTime<Utc>, RiskEngineError> {
    match raw {
        Some(value) => timeline::parse_timestamp(value).ok_or_else(|| {
            RiskEngineError::Cli(format!("--now must be RFC 3339 or YYYY-MM-DD, got {value}"))
        }),
        None => Ok(DateTime::<Utc>::from(runtime.clock.now())),
    }
}

pub fn load_test_cases(fs: &dyn FileSystem, path: &Path) -> Result<Vec<TestCase>, RiskEngineError> {
    let raw = fs.read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|e| {
        RiskEngineError::InvalidInput(format!("{} is not a test case list: {e}", path.display()))
    })
}

fn render_json<T: serde::Serialize>(
    kind: ReportKind,
    fingerprint: String,
    payload: &T,
) -> Result<String, RiskEngineError> {
    let envelope = build_envelope(kind, fingerprint, payload)?;
    serde_json::to_string_pretty(&envelope)
        .map_err(|e| RiskEngineError::Serialization(e.to_string()))
}

fn write_report(fs: &dyn FileSystem, path: &Path, contents: &str) -> Result<(), RiskEngineError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs.create_dir_all(parent)?;
        }
    }
    let mut text = contents.to_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    fs.write_string(path, &text)
}

pub fn render_help() -> String {
    Cli::command().render_long_help().to_string()
}
