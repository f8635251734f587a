use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::artifacts::{ArtifactPipeline, ArtifactSummary, ExtractionOptions};
use crate::config::AppConfig;
use crate::contacts::export_contacts;
use crate::correlator::{ConversationCorrelator, CorrelationOptions, CorrelationSummary};
use crate::db::BackupDatabases;
use crate::error::ExtractError;
use crate::filters::{build_filters, FilterSpec};
use crate::identity::{build_phone_index, PhoneDialect, PhoneIndex};
use crate::logging::OperationTimer;
use crate::metrics::MetricsCollector;
use crate::models::OutputFormat;
use crate::validation::InputValidator;

/// Results of a full run. Each part fails independently.
#[derive(Debug)]
pub struct RunReport {
    /// Artifact pipeline outcome
    pub artifacts: std::result::Result<ArtifactSummary, ExtractError>,
    /// Correlation pipeline outcome
    pub correlation: std::result::Result<CorrelationSummary, ExtractError>,
    /// Contact export outcome (rows written)
    pub contacts: std::result::Result<usize, ExtractError>,
    /// Counters from every part
    pub metrics: MetricsCollector,
}

impl RunReport {
    /// True if every part completed without error
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.artifacts.as_ref().is_ok_and(ArtifactSummary::is_complete)
            && self.correlation.is_ok()
            && self.contacts.is_ok()
    }
}

/// Entry point for every extraction over one backup
pub struct ExtractionService {
    config: AppConfig,
    databases: BackupDatabases,
    filters: Vec<FilterSpec>,
}

impl ExtractionService {
    /// Check the backup root and build the filters from `config`
    pub fn new(config: AppConfig) -> Result<Self> {
        InputValidator::validate_backup_root(&config.backup_root())?;
        let filters = build_filters(&config.extraction.filters).context("Invalid filter configuration")?;
        let databases = BackupDatabases::new(&config.backup);

        Ok(Self {
            config,
            databases,
            filters,
        })
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Copy every filtered artifact out of the backup
    pub fn run_artifacts(&self, metrics: &mut MetricsCollector) -> std::result::Result<ArtifactSummary, ExtractError> {
        let _timer = OperationTimer::new("artifact pipeline");
        let pipeline = ArtifactPipeline::new(
            &self.databases,
            &self.filters,
            self.config.output_dir(),
            ExtractionOptions::from(&self.config.extraction),
        );
        pipeline.run(metrics).inspect_err(|e| metrics.record_error(e.kind()))
    }

    /// Build the phone → name lookup from the address book
    pub fn build_identity_directory(&self) -> std::result::Result<PhoneIndex, ExtractError> {
        let conn = self.databases.open_contacts()?;
        build_phone_index(&conn, PhoneDialect::AddressBookV1)
    }

    /// Write one transcript per conversation into the output directory
    ///
    /// An unusable address book is logged and counted, and every sender is
    /// then left unresolved. Only message store failures abort the pass.
    pub fn run_correlation(&self, metrics: &mut MetricsCollector) -> std::result::Result<CorrelationSummary, ExtractError> {
        let _timer = OperationTimer::new("correlation pipeline");
        let index = self.build_identity_directory().unwrap_or_else(|e| {
            warn!(error = %e, "Address book unavailable; senders will not be resolved");
            metrics.record_error(e.kind());
            PhoneIndex::default()
        });

        let outcome = self.databases.open_messages().and_then(|conn| {
            let options = CorrelationOptions::from_config(&self.config.correlation, self.config.output.transcript_format);
            ConversationCorrelator::new(&conn, &index, options).run(&self.config.output_dir(), metrics)
        });
        outcome.inspect_err(|e| metrics.record_error(e.kind()))
    }

    /// Write the flat contact table
    pub fn run_contacts_export(&self, metrics: &mut MetricsCollector) -> std::result::Result<usize, ExtractError> {
        let _timer = OperationTimer::new("contact export");
        let path = self.contacts_export_path();
        let format = contacts_format(&path);

        let outcome = self
            .databases
            .open_contacts()
            .and_then(|conn| export_contacts(&conn, &path, format));
        match outcome {
            Ok(count) => {
                metrics.record_contacts_exported(count);
                Ok(count)
            }
            Err(e) => {
                metrics.record_error(e.kind());
                Err(e)
            }
        }
    }

    /// Path the contact export is written to
    #[must_use]
    pub fn contacts_export_path(&self) -> PathBuf {
        self.config.contacts_export_path()
    }

    /// Run both pipelines concurrently, then export contacts
    ///
    /// The pipelines share nothing but this service; each opens its own
    /// read-only connection on a blocking thread.
    pub async fn run_all(self: Arc<Self>) -> Result<RunReport> {
        let artifacts_service = Arc::clone(&self);
        let artifacts_task = tokio::task::spawn_blocking(move || {
            let mut metrics = MetricsCollector::new();
            let outcome = artifacts_service.run_artifacts(&mut metrics);
            (outcome, metrics)
        });

        let correlation_service = Arc::clone(&self);
        let correlation_task = tokio::task::spawn_blocking(move || {
            let mut metrics = MetricsCollector::new();
            let outcome = correlation_service.run_correlation(&mut metrics);
            (outcome, metrics)
        });

        let (artifacts_join, correlation_join) = tokio::join!(artifacts_task, correlation_task);
        let (artifacts, artifact_metrics) = artifacts_join.context("Artifact pipeline panicked")?;
        let (correlation, correlation_metrics) = correlation_join.context("Correlation pipeline panicked")?;

        let contacts_service = Arc::clone(&self);
        let (contacts, contact_metrics) = tokio::task::spawn_blocking(move || {
            let mut metrics = MetricsCollector::new();
            let outcome = contacts_service.run_contacts_export(&mut metrics);
            (outcome, metrics)
        })
        .await
        .context("Contact export panicked")?;

        let mut metrics = artifact_metrics;
        metrics.merge(&correlation_metrics);
        metrics.merge(&contact_metrics);

        if let Err(e) = &artifacts {
            error!(error = %e, "Artifact pipeline failed");
        }
        if let Err(e) = &correlation {
            error!(error = %e, "Correlation pipeline failed");
        }
        if let Err(e) = &contacts {
            error!(error = %e, "Contact export failed");
        }
        info!("Run finished");

        Ok(RunReport {
            artifacts,
            correlation,
            contacts,
            metrics,
        })
    }
}

/// Format implied by the export file's extension; CSV when unknown
fn contacts_format(path: &std::path::Path) -> OutputFormat {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| ext.parse().ok())
        .unwrap_or_default()
}
