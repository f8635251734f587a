use anyhow::{anyhow, Result};
use regex::Regex;
use std::path::{Component, Path};
use std::sync::OnceLock;

fn extension_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9]{1,16}$").expect("valid extension regex"))
}

fn file_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9A-Fa-f]{2,}$").expect("valid file id regex"))
}

/// Validation utilities for configuration and input sanitization
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate an origin domain name
    pub fn validate_domain(domain: &str) -> Result<()> {
        if domain.trim().is_empty() {
            return Err(anyhow!("Domain cannot be empty"));
        }

        if domain.contains(['\0', '\r', '\n']) {
            return Err(anyhow!("Domain contains invalid characters"));
        }

        Ok(())
    }

    /// Validate a path condition (a SQL LIKE pattern)
    pub fn validate_path_condition(condition: &str) -> Result<()> {
        if condition.trim().is_empty() {
            return Err(anyhow!("Path condition cannot be empty"));
        }

        if condition.contains('\0') {
            return Err(anyhow!("Path condition contains invalid characters"));
        }

        Ok(())
    }

    /// Validate a file extension (without the leading dot)
    pub fn validate_extension(extension: &str) -> Result<()> {
        if !extension_pattern().is_match(extension) {
            return Err(anyhow!(
                "Invalid extension {extension:?}: expected 1-16 ASCII letters or digits"
            ));
        }

        Ok(())
    }

    /// Validate a destination folder, which must stay inside the output directory
    pub fn validate_destination_folder(path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            return Err(anyhow!("Destination folder cannot be empty"));
        }

        for component in path.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                Component::ParentDir => {
                    return Err(anyhow!("Destination folder may not contain '..': {path:?}"));
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(anyhow!("Destination folder must be relative: {path:?}"));
                }
            }
        }

        Ok(())
    }

    /// Validate a backup file identifier
    pub fn validate_file_id(file_id: &str) -> Result<()> {
        if !file_id_pattern().is_match(file_id) {
            return Err(anyhow!(
                "Invalid file ID {file_id:?}: expected at least two hex characters"
            ));
        }

        Ok(())
    }

    /// Validate the backup root directory
    pub fn validate_backup_root(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(anyhow!("Backup directory does not exist: {path:?}"));
        }

        if !path.is_dir() {
            return Err(anyhow!("Backup path is not a directory: {path:?}"));
        }

        Ok(())
    }

    /// Validate batch size for correlation queries
    pub fn validate_batch_size(batch_size: usize) -> Result<()> {
        if batch_size == 0 {
            return Err(anyhow!("Batch size must be greater than 0"));
        }

        // SQLite's historical bound on host parameters per statement
        if batch_size > 999 {
            return Err(anyhow!("Batch size too large (max 999)"));
        }

        Ok(())
    }

    /// Sanitize text input
    #[must_use]
    pub fn sanitize_text(text: &str) -> String {
        text.chars()
            .filter(|c| !c.is_control() || matches!(c, '\n' | '\t' | '\r'))
            .collect()
    }
}
