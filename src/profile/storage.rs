//! Persistence backends for profile records
//!
//! The store treats storage as a key-value service keyed by app id. Writes are
//! synchronous and expected to be fast local I/O.

use super::{AppId, ProfileRecord};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse profile {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize profile: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub trait ProfileStorage {
    /// `Ok(None)` when nothing was ever stored for `app_id`
    fn read(&self, app_id: AppId) -> Result<Option<ProfileRecord>, StorageError>;

    fn write(&mut self, app_id: AppId, record: &ProfileRecord) -> Result<(), StorageError>;
}

/// One `<app_id>.toml` file per scope in a directory
#[derive(Debug, Clone)]
pub struct TomlDirStorage {
    dir: PathBuf,
}

impl TomlDirStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<config dir>/padmapper/profiles`
    pub fn default_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| {
                warn!("Could not determine config directory, using current directory");
                PathBuf::from(".")
            })
            .join("padmapper")
            .join("profiles")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, app_id: AppId) -> PathBuf {
        self.dir.join(format!("{}.toml", app_id))
    }
}

impl ProfileStorage for TomlDirStorage {
    fn read(&self, app_id: AppId) -> Result<Option<ProfileRecord>, StorageError> {
        let path = self.path_for(app_id);
        if !path.exists() {
            debug!("No profile file at {:?}", path);
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        let record = toml::from_str(&content).map_err(|source| StorageError::Parse {
            path: path.clone(),
            source,
        })?;

        debug!("Read profile {} from {:?}", app_id, path);
        Ok(Some(record))
    }

    fn write(&mut self, app_id: AppId, record: &ProfileRecord) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path_for(app_id);
        let content = toml::to_string_pretty(record)?;
        fs::write(&path, content).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;

        info!("Saved profile {} to {:?}", app_id, path);
        Ok(())
    }
}

/// In-memory storage for headless use and tests
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    records: HashMap<AppId, ProfileRecord>,
    writes: usize,
    fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, app_id: AppId, record: ProfileRecord) -> Self {
        self.records.insert(app_id, record);
        self
    }

    pub fn record(&self, app_id: AppId) -> Option<&ProfileRecord> {
        self.records.get(&app_id)
    }

    /// Number of successful writes so far
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Makes every following write fail until switched off again
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl ProfileStorage for MemoryStorage {
    fn read(&self, app_id: AppId) -> Result<Option<ProfileRecord>, StorageError> {
        Ok(self.records.get(&app_id).cloned())
    }

    fn write(&mut self, app_id: AppId, record: &ProfileRecord) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Unavailable(format!(
                "write of profile {} refused",
                app_id
            )));
        }
        self.records.insert(app_id, record.clone());
        self.writes += 1;
        Ok(())
    }
}
