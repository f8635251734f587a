//! The artifact pipeline: filter → catalog query → shard resolution → copy.

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::{error, info, warn};

use crate::catalog::query_domain;
use crate::config::ExtractionConfig;
use crate::copier::CollisionSafeCopier;
use crate::db::BackupDatabases;
use crate::error::{ExtractError, Result};
use crate::filters::FilterSpec;
use crate::logging::OperationTimer;
use crate::metrics::MetricsCollector;
use crate::resolver::ShardResolver;

/// How the pipeline reacts to failures and reports progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionOptions {
    /// Move on to the next filter after one fails
    pub continue_on_domain_error: bool,
    /// Log progress every this many files (0 disables)
    pub progress_interval: usize,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            continue_on_domain_error: true,
            progress_interval: 100,
        }
    }
}

impl From<&ExtractionConfig> for ExtractionOptions {
    fn from(config: &ExtractionConfig) -> Self {
        Self {
            continue_on_domain_error: config.continue_on_domain_error,
            progress_interval: config.progress_interval,
        }
    }
}

/// What one filter produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainReport {
    /// Domain the filter matched
    pub domain: String,
    /// Folder the files went to
    pub destination: PathBuf,
    /// Files copied
    pub copied: usize,
    /// Of those, files written under a disambiguated name
    pub renamed: usize,
}

/// A filter that did not complete
#[derive(Debug)]
pub struct DomainFailure {
    /// Domain the filter matched
    pub domain: String,
    /// Folder the files were going to
    pub destination: PathBuf,
    /// Why it stopped
    pub error: ExtractError,
}

/// Outcome of a whole artifact pass
#[derive(Debug, Default)]
pub struct ArtifactSummary {
    /// Completed filters, in filter order
    pub reports: Vec<DomainReport>,
    /// Failed filters, in filter order
    pub failures: Vec<DomainFailure>,
}

impl ArtifactSummary {
    /// Files copied across all completed filters
    #[must_use]
    pub fn files_copied(&self) -> usize {
        self.reports.iter().map(|r| r.copied).sum()
    }

    /// True if every filter completed
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Copy every file matching `spec` into `output_dir/<destination>`
///
/// Stops at the first record that cannot be copied; files already copied
/// stay where they are.
pub fn extract_domain(
    conn: &Connection,
    resolver: &ShardResolver,
    spec: &FilterSpec,
    output_dir: &Path,
    progress_interval: usize,
    metrics: &mut MetricsCollector,
) -> Result<DomainReport> {
    let domain = spec.origin_domain();
    let records = query_domain(conn, spec)?;
    info!(domain, matched = records.len(), "Copying files");

    let mut copier = CollisionSafeCopier::new(resolver, output_dir.join(spec.destination_folder()))?;
    let mut report = DomainReport {
        domain: domain.to_string(),
        destination: copier.destination().to_path_buf(),
        copied: 0,
        renamed: 0,
    };

    for record in &records {
        let result = copier.copy(record)?;
        metrics.record_file_copied(domain, result.renamed);

        report.copied += 1;
        if result.renamed {
            report.renamed += 1;
        }
        if progress_interval > 0 && report.copied % progress_interval == 0 {
            info!(domain, copied = report.copied, total = records.len(), "Copy progress");
        }
    }

    Ok(report)
}

/// Runs every filter against one backup
pub struct ArtifactPipeline<'a> {
    databases: &'a BackupDatabases,
    filters: &'a [FilterSpec],
    output_dir: PathBuf,
    options: ExtractionOptions,
}

impl<'a> ArtifactPipeline<'a> {
    /// Create a pipeline writing under `output_dir`
    pub fn new(
        databases: &'a BackupDatabases,
        filters: &'a [FilterSpec],
        output_dir: impl Into<PathBuf>,
        options: ExtractionOptions,
    ) -> Self {
        Self {
            databases,
            filters,
            output_dir: output_dir.into(),
            options,
        }
    }

    /// Run all filters in order
    ///
    /// Failing to open the manifest fails the whole pass. A failing filter
    /// is recorded in the summary; later filters still run unless
    /// `continue_on_domain_error` is off.
    pub fn run(&self, metrics: &mut MetricsCollector) -> Result<ArtifactSummary> {
        let conn = self.databases.open_manifest()?;
        let mut summary = ArtifactSummary::default();

        for spec in self.filters {
            let timer = OperationTimer::new(&format!("extract {}", spec.origin_domain()));
            let outcome = extract_domain(
                &conn,
                self.databases.resolver(),
                spec,
                &self.output_dir,
                self.options.progress_interval,
                metrics,
            );
            let elapsed = timer.finish();

            match outcome {
                Ok(report) => {
                    metrics.record_domain(&report.domain, elapsed, true);
                    info!(
                        domain = %report.domain,
                        copied = report.copied,
                        renamed = report.renamed,
                        "Domain extracted"
                    );
                    summary.reports.push(report);
                }
                Err(err) => {
                    metrics.record_domain(spec.origin_domain(), elapsed, false);
                    metrics.record_error(err.kind());
                    error!(domain = spec.origin_domain(), error = %err, "Domain extraction failed");

                    summary.failures.push(DomainFailure {
                        domain: spec.origin_domain().to_string(),
                        destination: self.output_dir.join(spec.destination_folder()),
                        error: err,
                    });
                    if !self.options.continue_on_domain_error {
                        warn!("Stopping artifact extraction after domain failure");
                        break;
                    }
                }
            }
        }

        Ok(summary)
    }
}
