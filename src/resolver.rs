//! Mapping from file identifiers to their sharded location in the backup.
//!
//! A backup stores every file as `<root>/<first two chars of id>/<id>`.

use std::path::{Path, PathBuf};

use crate::error::{ExtractError, Result};

/// Length of the shard directory prefix
pub const SHARD_PREFIX_LEN: usize = 2;

/// Path of `file_id` relative to the backup root. Pure; no I/O.
pub fn resolve(file_id: &str) -> Result<PathBuf> {
    let shard = file_id
        .get(..SHARD_PREFIX_LEN)
        .ok_or_else(|| ExtractError::InvalidFileId {
            file_id: file_id.to_string(),
        })?;
    Ok(Path::new(shard).join(file_id))
}

/// Resolves identifiers against a concrete backup root
#[derive(Debug, Clone)]
pub struct ShardResolver {
    root: PathBuf,
}

impl ShardResolver {
    /// Create a resolver for the backup at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The backup root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of `file_id` on disk
    pub fn physical_path(&self, file_id: &str) -> Result<PathBuf> {
        Ok(self.root.join(resolve(file_id)?))
    }
}
