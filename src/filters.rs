//! Filter specifications: which files to pull out of which domain, and where
//! to put them.

use std::collections::{BTreeSet, HashSet};
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::validation::InputValidator;

/// Serializable form of a filter, as it appears in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Apple-defined domain, e.g. `CameraRollDomain`
    pub domain: String,
    /// SQL LIKE pattern matched against `relativePath`
    pub condition: String,
    /// Folder under the output directory
    pub destination: String,
    /// Extensions to keep, without the dot
    pub extensions: Vec<String>,
}

/// An immutable, validated filter
///
/// The extension set always holds both case variants of every entry, so a
/// path ending in `.JPG` is matched by a filter configured with `jpg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    origin_domain: String,
    path_condition: String,
    destination_folder: PathBuf,
    allowed_extensions: BTreeSet<String>,
}

impl FilterSpec {
    /// Build a filter, validating every field and normalizing extension case.
    pub fn new<I, S>(
        origin_domain: &str,
        path_condition: &str,
        destination_folder: impl Into<PathBuf>,
        extensions: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        InputValidator::validate_domain(origin_domain)?;
        InputValidator::validate_path_condition(path_condition)?;
        let destination_folder = destination_folder.into();
        InputValidator::validate_destination_folder(&destination_folder)?;

        let mut allowed_extensions = BTreeSet::new();
        for ext in extensions {
            let ext = ext.as_ref();
            InputValidator::validate_extension(ext)
                .with_context(|| format!("in filter for {origin_domain}"))?;
            allowed_extensions.insert(ext.to_lowercase());
            allowed_extensions.insert(ext.to_uppercase());
        }

        Ok(Self {
            origin_domain: origin_domain.to_string(),
            path_condition: path_condition.to_string(),
            destination_folder,
            allowed_extensions,
        })
    }

    /// Build a filter from its configuration form
    pub fn from_config(config: &FilterConfig) -> Result<Self> {
        Self::new(
            &config.domain,
            &config.condition,
            &config.destination,
            &config.extensions,
        )
    }

    /// Domain the filter applies to
    #[must_use]
    pub fn origin_domain(&self) -> &str {
        &self.origin_domain
    }

    /// LIKE pattern on `relativePath`
    #[must_use]
    pub fn path_condition(&self) -> &str {
        &self.path_condition
    }

    /// Folder, relative to the output directory
    #[must_use]
    pub fn destination_folder(&self) -> &Path {
        &self.destination_folder
    }

    /// Allowed extensions, both cases
    #[must_use]
    pub const fn allowed_extensions(&self) -> &BTreeSet<String> {
        &self.allowed_extensions
    }
}

/// The filters used when configuration does not override them: camera roll
/// photos and videos, and SMS/iMessage attachments.
#[must_use]
pub fn default_filter_configs() -> Vec<FilterConfig> {
    fn owned(exts: &[&str]) -> Vec<String> {
        exts.iter().map(ToString::to_string).collect()
    }

    vec![
        FilterConfig {
            domain: "CameraRollDomain".to_string(),
            condition: "Media/DCIM%".to_string(),
            destination: "camera".to_string(),
            extensions: owned(&["jpg", "mov"]),
        },
        FilterConfig {
            domain: "MediaDomain".to_string(),
            condition: "Library/SMS/Attachments%".to_string(),
            destination: "sms".to_string(),
            extensions: owned(&[
                "jpg", "jpeg", "gif", "png", "mov", "mp4", "mpg", "mpeg", "ogg", "mp3", "m4v",
                "webm", "ogv", "avi", "pdf",
            ]),
        },
    ]
}

/// Validate and build every configured filter
///
/// Each filter needs its own destination folder. Folders are compared the
/// way collisions are, ignoring case and `.` components.
pub fn build_filters(configs: &[FilterConfig]) -> Result<Vec<FilterSpec>> {
    let mut folders = HashSet::new();
    let mut filters = Vec::with_capacity(configs.len());

    for config in configs {
        let spec = FilterSpec::from_config(config)?;
        if !folders.insert(folder_key(spec.destination_folder())) {
            bail!(
                "destination '{}' of {} is already used by another filter",
                config.destination,
                config.domain
            );
        }
        filters.push(spec);
    }

    Ok(filters)
}

fn folder_key(folder: &Path) -> String {
    folder
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_uppercase()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
