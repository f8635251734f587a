//! Data models for backup extraction
//!
//! This module contains the records read out of the backup's relational
//! stores and the rows the engine produces from them. Query results are
//! never mutated; every transformation builds a new value.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A file record from the manifest catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Content-derived identifier; also the on-disk file name
    pub file_id: String,
    /// Application domain the file belongs to (e.g. `CameraRollDomain`)
    pub origin_domain: String,
    /// Path of the file on the device, relative to its domain
    pub relative_path: String,
}

impl FileRecord {
    /// Final path segment of `relative_path`, i.e. the original file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }
}

/// Outcome of copying one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyResult {
    /// Obfuscated path inside the backup
    pub source_path: PathBuf,
    /// Path the bytes were written to
    pub destination_path: PathBuf,
    /// True if the file name was disambiguated
    pub renamed: bool,
}

/// A cell value that may be absent in the source table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NullableField<T> {
    /// The column held a value
    Value(T),
    /// The column was NULL
    #[default]
    Null,
}

impl<T> NullableField<T> {
    /// Convert to a plain `Option`
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Null => None,
        }
    }

    /// Borrow as an `Option`
    pub const fn as_option(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Null => None,
        }
    }

    /// True if the column was NULL
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl<T> From<Option<T>> for NullableField<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Value)
    }
}

impl NullableField<String> {
    /// Cell text for export; NULL renders as an empty string.
    #[must_use]
    pub fn to_cell(&self) -> String {
        self.as_option().cloned().unwrap_or_default()
    }
}

/// A row of the address book's full-text search table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactRecord {
    /// First name
    pub first: NullableField<String>,
    /// Last name
    pub last: NullableField<String>,
    /// Middle name
    pub middle: NullableField<String>,
    /// Organization
    pub organization: NullableField<String>,
    /// Space separated phone spellings, as stored by the address book
    pub phone_raw: NullableField<String>,
    /// E-mail addresses
    pub email: NullableField<String>,
    /// Postal address
    pub address: NullableField<String>,
}

/// First and last name of a resolved identity
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FirstLast {
    /// First name
    pub first: String,
    /// Last name (may be empty)
    pub last: String,
}

/// A message row joined with its handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    /// `message.ROWID`
    pub message_id: i64,
    /// Raw `message.date`, relative to 2001-01-01T00:00:00
    pub raw_timestamp: i64,
    /// Sent by the device owner
    pub is_from_self: bool,
    /// Message body; empty when NULL
    pub text: String,
    /// `handle.id` (phone number or account); empty when unresolved
    pub handle_id: String,
    /// `message.cache_has_attachments`
    pub has_attachment: bool,
}

/// An attachment resolved for a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// `attachment.ROWID`
    pub attachment_id: i64,
    /// Path of the attachment on the device
    pub filename: String,
}

/// One line of a conversation transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptRow {
    /// Calendar timestamp, `YYYY-MM-DD HH:MM:SS`
    pub date: String,
    /// Sender handle
    pub handle_id: String,
    /// Sender first name
    pub first: String,
    /// Sender last name
    pub last: String,
    /// Message body
    pub message: String,
    /// Attachment path on the device
    pub attachment: String,
}

impl TranscriptRow {
    /// Transcript header, in column order
    pub const HEADER: [&'static str; 6] = [
        "Date",
        "Handle ID",
        "First",
        "Last",
        "Message",
        "Attachment file path",
    ];

    /// Cells in header order
    #[must_use]
    pub fn into_cells(self) -> Vec<String> {
        vec![
            self.date,
            self.handle_id,
            self.first,
            self.last,
            self.message,
            self.attachment,
        ]
    }
}

/// Output format for exported tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Comma-separated values format
    #[default]
    Csv,
    /// Plain text format
    Txt,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Get the file extension for this format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Txt => "txt",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "txt" => Ok(Self::Txt),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
