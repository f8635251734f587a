//! Error types for the ios-backup-extract library.
//!
//! Every failure the engine can report is a variant of [`ExtractError`]. The
//! variants carry enough context (domain, record, conversation) for the
//! caller to decide whether to keep going with independent work.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::FileRecord;

/// Errors that can occur while extracting a backup.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// A relational store could not be opened or queried.
    #[error("Catalog unavailable ({database}): {source}")]
    CatalogUnavailable {
        /// Friendly name or path of the store
        database: String,
        /// Underlying SQLite error
        #[source]
        source: rusqlite::Error,
    },

    /// A file identifier too short to name a shard directory.
    #[error("Invalid file ID: {file_id:?}")]
    InvalidFileId {
        /// The offending identifier
        file_id: String,
    },

    /// Copying one record out of the backup failed.
    #[error("Failed to copy {domain}/{path} ({file_id}) to {destination}: {cause}", domain = .record.origin_domain, path = .record.relative_path, file_id = .record.file_id, destination = .destination.display())]
    CopyFailed {
        /// The record being copied
        record: FileRecord,
        /// Where it was going
        destination: PathBuf,
        /// Underlying I/O error
        #[source]
        cause: std::io::Error,
    },

    /// A query failed while correlating conversations.
    #[error("Correlation query failed (conversation {conversation}): {source}", conversation = conversation_label(.conversation_id))]
    CorrelationQueryFailed {
        /// Conversation being processed, if any
        conversation_id: Option<i64>,
        /// Underlying SQLite error
        #[source]
        source: rusqlite::Error,
    },

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ExtractError {
    /// Short machine-friendly name, used as a metrics label.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CatalogUnavailable { .. } => "catalog_unavailable",
            Self::InvalidFileId { .. } => "invalid_file_id",
            Self::CopyFailed { .. } => "copy_failed",
            Self::CorrelationQueryFailed { .. } => "correlation_query_failed",
            Self::Io(_) => "io",
            Self::Csv(_) => "csv",
            Self::Serialization(_) => "serialization",
        }
    }

    pub(crate) fn catalog(database: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::CatalogUnavailable {
            database: database.into(),
            source,
        }
    }

    pub(crate) const fn correlation(conversation_id: Option<i64>, source: rusqlite::Error) -> Self {
        Self::CorrelationQueryFailed {
            conversation_id,
            source,
        }
    }
}

fn conversation_label(conversation_id: &Option<i64>) -> String {
    conversation_id.map_or_else(|| "-".to_string(), |id| id.to_string())
}

/// Convenience type alias for Result with ExtractError
pub type Result<T> = std::result::Result<T, ExtractError>;
