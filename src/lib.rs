//! iOS Backup Extract - artifacts and transcripts from device backups
//!
//! A Rust library for pulling user data out of an unencrypted iOS backup,
//! where every file is stored under a hash-derived name and described by a
//! SQLite manifest.
//!
//! # Features
//!
//! - Copy camera roll media and message attachments into readable folders
//! - Collision-safe renaming of same-named files
//! - One transcript per conversation, with senders resolved from contacts
//! - Flat contact export
//! - Export to multiple formats (CSV, TXT, JSON)

/// Artifact pipeline
pub mod artifacts;
/// Manifest catalog queries
pub mod catalog;
/// Configuration management
pub mod config;
/// Address book access and export
pub mod contacts;
/// Collision-safe copying
pub mod copier;
/// Conversation transcripts
pub mod correlator;
/// Locations of the backup's databases
pub mod db;
/// Error types
pub mod error;
/// Table writers
pub mod file_writer;
/// Filter specifications
pub mod filters;
/// Phone number to contact lookup
pub mod identity;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Shard path resolution
pub mod resolver;
/// Database schema definitions
pub mod schema;
/// High level entry points
pub mod service;
/// Input validation and sanitization
pub mod validation;

// Re-export key components for easier access
pub use error::{ExtractError, Result};
pub use filters::FilterSpec;
pub use identity::{PhoneDialect, PhoneIndex};
pub use models::{ContactRecord, CopyResult, FileRecord, OutputFormat, TranscriptRow};
pub use service::{ExtractionService, RunReport};
