use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::config::BackupConfig;
use crate::error::{ExtractError, Result};
use crate::resolver::ShardResolver;

/// Locations of the SQLite stores inside one backup
///
/// Connections are not cached: each pipeline opens its own read-only
/// connection and drops it when the pipeline returns.
#[derive(Debug, Clone)]
pub struct BackupDatabases {
    resolver: ShardResolver,
    manifest_file: String,
    contacts_file_id: String,
    messages_file_id: String,
}

impl BackupDatabases {
    /// Describe the stores of the backup at `config.root`
    #[must_use]
    pub fn new(config: &BackupConfig) -> Self {
        Self {
            resolver: ShardResolver::new(&config.root),
            manifest_file: config.manifest_file.clone(),
            contacts_file_id: config.contacts_file_id.clone(),
            messages_file_id: config.messages_file_id.clone(),
        }
    }

    /// Resolver for the same backup root
    #[must_use]
    pub const fn resolver(&self) -> &ShardResolver {
        &self.resolver
    }

    /// Path of the manifest catalog
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.resolver.root().join(&self.manifest_file)
    }

    /// Path of the address book store
    pub fn contacts_path(&self) -> Result<PathBuf> {
        self.resolver.physical_path(&self.contacts_file_id)
    }

    /// Path of the SMS/iMessage store
    pub fn messages_path(&self) -> Result<PathBuf> {
        self.resolver.physical_path(&self.messages_file_id)
    }

    /// Open the manifest catalog
    pub fn open_manifest(&self) -> Result<Connection> {
        open_read_only(&self.manifest_path(), "manifest")
    }

    /// Open the address book store
    pub fn open_contacts(&self) -> Result<Connection> {
        open_read_only(&self.contacts_path()?, "contacts")
    }

    /// Open the SMS/iMessage store
    pub fn open_messages(&self) -> Result<Connection> {
        open_read_only(&self.messages_path()?, "messages")
    }
}

/// Open a SQLite file read-only
///
/// A missing file fails here; a file that is not a database fails on the
/// first query. Both surface as `CatalogUnavailable`.
pub fn open_read_only(path: &Path, name: &str) -> Result<Connection> {
    debug!(database = name, path = %path.display(), "Opening database");
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| ExtractError::catalog(format!("{name} at {}", path.display()), e))
}
