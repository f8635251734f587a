use metrics::{counter, histogram};
use std::time::Duration;
use tracing::info;

/// Metric names published through the `metrics` facade
pub mod names {
    /// Files copied out of the backup
    pub const FILES_COPIED_TOTAL: &str = "ios_backup_files_copied_total";
    /// Files written under a disambiguated name
    pub const FILES_RENAMED_TOTAL: &str = "ios_backup_files_renamed_total";
    /// Domains fully extracted
    pub const DOMAINS_COMPLETED_TOTAL: &str = "ios_backup_domains_completed_total";
    /// Domains aborted by an error
    pub const DOMAINS_FAILED_TOTAL: &str = "ios_backup_domains_failed_total";
    /// Domain extraction time
    pub const DOMAIN_DURATION: &str = "ios_backup_domain_duration_seconds";
    /// Conversation transcripts written
    pub const TRANSCRIPTS_WRITTEN_TOTAL: &str = "ios_backup_transcripts_written_total";
    /// Messages correlated into transcripts
    pub const MESSAGES_CORRELATED_TOTAL: &str = "ios_backup_messages_correlated_total";
    /// Messages whose sender had no contact entry
    pub const UNRESOLVED_SENDERS_TOTAL: &str = "ios_backup_unresolved_senders_total";
    /// Contacts written to the flat export
    pub const CONTACTS_EXPORTED_TOTAL: &str = "ios_backup_contacts_exported_total";
    /// Errors by kind
    pub const ERRORS_TOTAL: &str = "ios_backup_errors_total";
}

/// Run-level counters
///
/// Every update is mirrored to the global `metrics` recorder (a no-op until
/// one is installed) and kept locally so a summary can be logged at the end
/// of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MetricsCollector {
    /// Files copied
    pub files_copied: u64,
    /// Files renamed to avoid a collision
    pub files_renamed: u64,
    /// Domains completed
    pub domains_completed: u64,
    /// Domains aborted
    pub domains_failed: u64,
    /// Transcripts written
    pub transcripts_written: u64,
    /// Messages correlated
    pub messages_correlated: u64,
    /// Messages with an unresolved sender
    pub unresolved_senders: u64,
    /// Contacts exported
    pub contacts_exported: u64,
    /// Errors of any kind
    pub errors: u64,
}

impl MetricsCollector {
    /// Create an empty collector
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one copied file
    pub fn record_file_copied(&mut self, domain: &str, renamed: bool) {
        self.files_copied += 1;
        counter!(names::FILES_COPIED_TOTAL, "domain" => domain.to_string()).increment(1);

        if renamed {
            self.files_renamed += 1;
            counter!(names::FILES_RENAMED_TOTAL, "domain" => domain.to_string()).increment(1);
        }
    }

    /// Record the end of one domain's extraction
    pub fn record_domain(&mut self, domain: &str, duration: Duration, success: bool) {
        histogram!(names::DOMAIN_DURATION, "domain" => domain.to_string())
            .record(duration.as_secs_f64());

        if success {
            self.domains_completed += 1;
            counter!(names::DOMAINS_COMPLETED_TOTAL).increment(1);
        } else {
            self.domains_failed += 1;
            counter!(names::DOMAINS_FAILED_TOTAL).increment(1);
        }
    }

    /// Record one written transcript
    pub fn record_transcript(&mut self, messages: usize, unresolved: usize) {
        self.transcripts_written += 1;
        self.messages_correlated += messages as u64;
        self.unresolved_senders += unresolved as u64;

        counter!(names::TRANSCRIPTS_WRITTEN_TOTAL).increment(1);
        counter!(names::MESSAGES_CORRELATED_TOTAL).increment(messages as u64);
        counter!(names::UNRESOLVED_SENDERS_TOTAL).increment(unresolved as u64);
    }

    /// Record the contact export
    pub fn record_contacts_exported(&mut self, count: usize) {
        self.contacts_exported += count as u64;
        counter!(names::CONTACTS_EXPORTED_TOTAL).increment(count as u64);
    }

    /// Record an error by kind
    pub fn record_error(&mut self, kind: &'static str) {
        self.errors += 1;
        counter!(names::ERRORS_TOTAL, "type" => kind).increment(1);
    }

    /// Fold another collector's counts into this one
    pub fn merge(&mut self, other: &Self) {
        self.files_copied += other.files_copied;
        self.files_renamed += other.files_renamed;
        self.domains_completed += other.domains_completed;
        self.domains_failed += other.domains_failed;
        self.transcripts_written += other.transcripts_written;
        self.messages_correlated += other.messages_correlated;
        self.unresolved_senders += other.unresolved_senders;
        self.contacts_exported += other.contacts_exported;
        self.errors += other.errors;
    }

    /// Log the counters
    pub fn log_summary(&self) {
        info!(
            files_copied = self.files_copied,
            files_renamed = self.files_renamed,
            domains_completed = self.domains_completed,
            domains_failed = self.domains_failed,
            transcripts_written = self.transcripts_written,
            messages_correlated = self.messages_correlated,
            unresolved_senders = self.unresolved_senders,
            contacts_exported = self.contacts_exported,
            errors = self.errors,
            "Run summary"
        );
    }
}
