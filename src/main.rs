use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use ios_backup_extract::config::AppConfig;
use ios_backup_extract::logging::{init_logging, OperationTimer};
use ios_backup_extract::metrics::MetricsCollector;
use ios_backup_extract::ExtractionService;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Backup root (overrides configuration)
    #[arg(short, long, global = true)]
    backup_dir: Option<PathBuf>,

    /// Output directory (overrides configuration)
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Extra configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also write JSON logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy artifacts, write transcripts and export contacts (default)
    All,
    /// Copy camera roll media and message attachments
    Files,
    /// Write one transcript per conversation
    Messages,
    /// Export the address book as a flat table
    Contacts,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.backup_dir {
        config.backup.root = dir.to_string_lossy().into_owned();
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.to_string_lossy().into_owned();
    }

    // Initialize logging
    let level = cli.log_level.clone().unwrap_or_else(|| config.get_log_level());
    let log_file = cli
        .log_file
        .clone()
        .or_else(|| config.logging.file_path.as_ref().map(PathBuf::from));
    let _guard = init_logging(Some(&level), &config.logging.format, log_file.as_deref())?;

    info!(
        backup = %config.backup.root,
        output = %config.output.directory,
        "Starting extraction"
    );

    let service = Arc::new(ExtractionService::new(config).context("Cannot use backup")?);
    let timer = OperationTimer::new("extraction");

    let ok = match cli.command.unwrap_or(Commands::All) {
        Commands::All => {
            let report = Arc::clone(&service).run_all().await?;
            report.metrics.log_summary();
            report.is_success()
        }
        Commands::Files => run_single(&service, |s, m| s.run_artifacts(m).map(|summary| summary.is_complete())).await?,
        Commands::Messages => run_single(&service, |s, m| s.run_correlation(m).map(|_| true)).await?,
        Commands::Contacts => run_single(&service, |s, m| s.run_contacts_export(m).map(|_| true)).await?,
    };

    timer.finish();

    if ok {
        info!("Extraction complete");
        Ok(ExitCode::SUCCESS)
    } else {
        warn!("Extraction finished with errors; partial output was left in place");
        Ok(ExitCode::FAILURE)
    }
}

/// Run one pipeline on a blocking thread and log its metrics
async fn run_single<F>(service: &Arc<ExtractionService>, job: F) -> Result<bool>
where
    F: FnOnce(&ExtractionService, &mut MetricsCollector) -> ios_backup_extract::Result<bool> + Send + 'static,
{
    let service = Arc::clone(service);
    let (outcome, metrics) = tokio::task::spawn_blocking(move || {
        let mut metrics = MetricsCollector::new();
        let outcome = job(&service, &mut metrics);
        (outcome, metrics)
    })
    .await
    .context("Pipeline panicked")?;

    metrics.log_summary();
    match outcome {
        Ok(complete) => Ok(complete),
        Err(e) => {
            error!(error = %e, kind = e.kind(), "Pipeline failed");
            Ok(false)
        }
    }
}
