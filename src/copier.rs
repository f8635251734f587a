//! Copying resolved files out of the backup without clobbering same-named
//! files.
//!
//! Many devices reuse names like `IMG_0001.JPG` across DCIM folders, and
//! attachments from different conversations routinely share a name. All of
//! them land in one flat destination folder, so a per-folder
//! [`CollisionTable`] hands out `name-1.ext`, `name-2.ext`, ... as names
//! repeat. Names are compared case-insensitively because the common
//! destination filesystems (APFS, NTFS) are.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ExtractError, Result};
use crate::models::{CopyResult, FileRecord};
use crate::resolver::ShardResolver;

/// Insert `-n` before the extension of `file_name`
///
/// A name without an extension (or a dotfile) gets the suffix at the end.
#[must_use]
pub fn disambiguate(file_name: &str, n: u32) -> String {
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}-{n}{}", &file_name[..dot], &file_name[dot..]),
        _ => format!("{file_name}-{n}"),
    }
}

/// Names handed out in one destination folder during one run
#[derive(Debug, Default, Clone)]
pub struct CollisionTable {
    /// Next suffix per original name (uppercased)
    counters: HashMap<String, u32>,
    /// Every destination name already used (uppercased)
    taken: HashSet<String>,
}

impl CollisionTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a destination name for a file originally called `file_name`.
    ///
    /// Returns the name to write and whether it differs from the original.
    /// The n-th repeat of a name gets suffix `-n`; a candidate that is
    /// already taken (a file literally named `a-1.jpg` arriving after `a.jpg`
    /// was renamed to it) bumps the counter again.
    pub fn assign(&mut self, file_name: &str) -> (String, bool) {
        let key = file_name.to_uppercase();

        if !self.counters.contains_key(&key) && self.taken.insert(key.clone()) {
            self.counters.insert(key, 1);
            return (file_name.to_string(), false);
        }

        let counter = self.counters.entry(key).or_insert(1);
        loop {
            let candidate = disambiguate(file_name, *counter);
            *counter += 1;
            if self.taken.insert(candidate.to_uppercase()) {
                return (candidate, true);
            }
        }
    }

    /// Number of names reserved so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.taken.len()
    }

    /// True if nothing has been reserved
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }
}

/// Copies records into a single destination folder
#[derive(Debug)]
pub struct CollisionSafeCopier<'a> {
    resolver: &'a ShardResolver,
    destination: PathBuf,
    table: CollisionTable,
}

impl<'a> CollisionSafeCopier<'a> {
    /// Create a copier writing into `destination`, creating it if needed
    pub fn new(resolver: &'a ShardResolver, destination: impl Into<PathBuf>) -> Result<Self> {
        let destination = destination.into();
        fs::create_dir_all(&destination)?;
        Ok(Self {
            resolver,
            destination,
            table: CollisionTable::new(),
        })
    }

    /// Folder being written to
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Copy one record, renaming it if its name was already used here
    pub fn copy(&mut self, record: &FileRecord) -> Result<CopyResult> {
        let source_path = self.resolver.physical_path(&record.file_id)?;
        let (name, renamed) = self.table.assign(record.file_name());
        let destination_path = self.destination.join(&name);

        if renamed {
            info!(
                original = record.file_name(),
                renamed = %name,
                "Duplicate filename encountered, renaming"
            );
        }

        let bytes = copy_file(&source_path, &destination_path).map_err(|cause| {
            ExtractError::CopyFailed {
                record: record.clone(),
                destination: destination_path.clone(),
                cause,
            }
        })?;
        debug!(file_id = %record.file_id, bytes, dest = %destination_path.display(), "Copied file");

        Ok(CopyResult {
            source_path,
            destination_path,
            renamed,
        })
    }
}

/// Copy `src` to `dest` and sync the result to disk
///
/// Creates or truncates `dest`. The copy only counts as complete once
/// `sync_all` has returned.
pub fn copy_file(src: &Path, dest: &Path) -> io::Result<u64> {
    let mut reader = BufReader::new(File::open(src)?);
    let mut writer = BufWriter::new(File::create(dest)?);

    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;

    Ok(bytes)
}
