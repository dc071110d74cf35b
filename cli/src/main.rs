//! CLI entrypoint for Filing Quorum
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use filing_application::{
    DocumentSource, NoProgress, PipelineConfig, PipelineProgress, RunBatchUseCase,
};
use filing_domain::OutputFormat;
use filing_infrastructure::{
    ConfigIssue, ConfigLoader, FileConfig, JsonDirectorySource, JsonlOutcomeSink, OpenAiOracle,
    Severity,
};
use filing_presentation::{Cli, ConsoleFormatter, ProgressReporter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_AUDIT_PATH: &str = "filing-quorum.audit.jsonl";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    info!("Starting Filing Quorum");

    // === Configuration ===
    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    let mut config = pipeline_config(&file_config)?;
    if let Some(concurrency) = cli.concurrency {
        config = config.with_concurrency(concurrency);
    }
    ConsoleFormatter::set_color(file_config.output.color);

    // === Documents ===
    let Some(documents_dir) = cli.documents_dir.as_deref() else {
        bail!("DOCUMENTS_DIR is required");
    };
    let documents = JsonDirectorySource::new(documents_dir)
        .load()
        .with_context(|| format!("Failed to load documents from {}", documents_dir.display()))?;
    if documents.is_empty() {
        warn!("No *.json documents in {}", documents_dir.display());
    }

    // === Dependency Injection ===
    let oracle = Arc::new(OpenAiOracle::new(file_config.oracle.clone())?);
    let audit_path = cli
        .audit
        .clone()
        .or_else(|| file_config.output.audit_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_AUDIT_PATH));
    let Some(sink) = JsonlOutcomeSink::new(&audit_path) else {
        bail!("Cannot write audit file {}", audit_path.display());
    };
    info!("Recording outcomes to {}", sink.path().display());

    let use_case = RunBatchUseCase::new(oracle, config, Arc::new(sink));

    // Ctrl-C stops scheduling and abandons unfinished documents
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling batch");
                cancel.cancel();
            }
        });
    }

    let progress: Arc<dyn PipelineProgress> = if cli.quiet {
        Arc::new(NoProgress)
    } else {
        Arc::new(ProgressReporter::new())
    };
    let output = use_case
        .execute_with_progress(documents, cancel, progress)
        .await;

    // === Output ===
    let format = cli
        .output
        .map(OutputFormat::from)
        .or(file_config.output.format)
        .unwrap_or_default();
    let text = match format {
        OutputFormat::Summary => ConsoleFormatter::format(&output),
        OutputFormat::Json => ConsoleFormatter::format_json(&output),
    };
    println!("{}", text);

    if output.summary.cancelled {
        bail!(
            "Batch cancelled after {} of {} documents",
            output.summary.completed,
            output.summary.documents
        );
    }
    Ok(())
}

/// Initialize logging based on verbosity level; `RUST_LOG` takes precedence.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .with_context(|| format!("Invalid log file path {}", path.display()))?;
            let dir = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Convert the file configuration, logging warnings and failing on errors.
fn pipeline_config(file_config: &FileConfig) -> Result<PipelineConfig> {
    let (config, issues) = file_config.to_pipeline_config();
    for issue in &issues {
        match issue.severity {
            Severity::Warning => warn!("{}", issue.message),
            Severity::Error => error!("{}", issue.message),
        }
    }
    if ConfigIssue::has_errors(&issues) {
        bail!(
            "Invalid configuration: {}",
            issues
                .iter()
                .filter(|i| i.severity == Severity::Error)
                .map(|i| i.message.as_str())
                .collect::<Vec<_>>()
                .join("; ")
        );
    }
    Ok(config)
}
