use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::filters::{build_filters, default_filter_configs, FilterConfig};
use crate::models::OutputFormat;
use crate::validation::InputValidator;

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Where the backup lives and which stores to read
    pub backup: BackupConfig,
    /// Where results go
    pub output: OutputConfig,
    /// Artifact copy settings
    pub extraction: ExtractionConfig,
    /// Transcript settings
    pub correlation: CorrelationConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Backup container settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackupConfig {
    /// Backup root (the folder iTunes/Finder created)
    pub root: String,
    /// Manifest catalog file name, relative to the root
    pub manifest_file: String,
    /// File ID of the address book database
    pub contacts_file_id: String,
    /// File ID of the SMS/iMessage database
    pub messages_file_id: String,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    /// Output root
    pub directory: String,
    /// Transcript format
    pub transcript_format: OutputFormat,
    /// Contact export file name, under the output root
    pub contacts_file_name: String,
}

/// Artifact copy settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractionConfig {
    /// Keep going with the next domain after one fails
    pub continue_on_domain_error: bool,
    /// Log progress every this many files
    pub progress_interval: usize,
    /// Which files to copy and where
    pub filters: Vec<FilterConfig>,
}

/// Transcript settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CorrelationConfig {
    /// Message IDs per batched query
    pub batch_size: usize,
    /// Render timestamps in the local timezone instead of the device reference
    pub local_time: bool,
    /// First name used for messages sent by the device owner
    pub self_label: String,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Level filter when `RUST_LOG` is unset
    pub level: String,
    /// Optional log file
    pub file_path: Option<String>,
    /// "json" or "text"
    pub format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backup: BackupConfig {
                root: ".".to_string(),
                manifest_file: "Manifest.db".to_string(),
                contacts_file_id: "31bb7ba8914766d4ba40d6dfb6113c8b614be442".to_string(),
                messages_file_id: "3d0d7e5fb2ce288813306e4d4636395e047a3d28".to_string(),
            },
            output: OutputConfig {
                directory: "files".to_string(),
                transcript_format: OutputFormat::Csv,
                contacts_file_name: "Contacts.csv".to_string(),
            },
            extraction: ExtractionConfig {
                continue_on_domain_error: true,
                progress_interval: 100,
                filters: default_filter_configs(),
            },
            correlation: CorrelationConfig {
                batch_size: 500,
                local_time: false,
                self_label: "Me".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                format: "text".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence
    ///
    /// Defaults, then `config/default.*`, `config/local.*`, the explicit
    /// file if any, and finally `IOS_BACKUP__SECTION__KEY` variables.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let defaults = Config::try_from(&Self::default())
            .map_err(|e| anyhow::anyhow!("Failed to encode default configuration: {}", e))?;

        let mut builder = Config::builder()
            // Start with default values
            .add_source(defaults)
            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            // Add environment variables with prefix
            .add_source(
                Environment::with_prefix("IOS_BACKUP")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize configuration: {}", e))?;

        // Validate configuration
        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        // Validate backup config
        if self.backup.manifest_file.trim().is_empty() {
            return Err(anyhow::anyhow!("manifest_file cannot be empty"));
        }
        InputValidator::validate_file_id(&self.backup.contacts_file_id)?;
        InputValidator::validate_file_id(&self.backup.messages_file_id)?;

        // Validate output config
        if self.output.directory.trim().is_empty() {
            return Err(anyhow::anyhow!("output directory cannot be empty"));
        }
        InputValidator::validate_destination_folder(Path::new(&self.output.contacts_file_name))?;

        // Validate extraction config
        if self.extraction.progress_interval == 0 {
            return Err(anyhow::anyhow!("progress_interval must be greater than 0"));
        }
        if self.extraction.filters.is_empty() {
            return Err(anyhow::anyhow!("at least one filter must be configured"));
        }
        build_filters(&self.extraction.filters)?;

        // Validate correlation config
        InputValidator::validate_batch_size(self.correlation.batch_size)?;
        if self.correlation.self_label.trim().is_empty() {
            return Err(anyhow::anyhow!("self_label cannot be empty"));
        }

        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            ));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            ));
        }

        Ok(())
    }

    /// Backup root as a path
    #[must_use]
    pub fn backup_root(&self) -> PathBuf {
        PathBuf::from(&self.backup.root)
    }

    /// Output root as a path
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.output.directory)
    }

    /// Path of the flat contact export
    #[must_use]
    pub fn contacts_export_path(&self) -> PathBuf {
        self.output_dir().join(&self.output.contacts_file_name)
    }

    /// Get log level from environment or config
    #[must_use]
    pub fn get_log_level(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| self.logging.level.clone())
    }
}
