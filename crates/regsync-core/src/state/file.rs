// # File State Store
//
// File-based implementation of StateStore with crash recovery.
//
// ## Crash Recovery
//
// - Atomic writes: write-then-rename
// - Automatic backup: the previous file is kept as `.backup`
// - Corruption detection: JSON is validated on load
// - Recovery: falls back to the backup, then to an empty store
//
// Losing the file never loses anything at the registrar. Tracked resources
// can be adopted again with `import`.
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "records": {
//     "zone_domain:example.com": {
//       "kind": "zone_domain",
//       "id": "example.com",
//       "attributes": { "name": "example.com", "autorenew": true },
//       "last_refreshed": "2026-01-09T12:00:00Z"
//     }
//   }
// }
// ```

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::state_store::{StateKey, StateRecord, StateStore};

/// State file format version
const STATE_FILE_VERSION: &str = "1.0";

/// File-based state store with crash recovery
///
/// Every mutation is written through to disk before the call returns.
///
/// # Example
///
/// ```rust,no_run
/// use regsync_core::state::FileStateStore;
/// use regsync_core::{ResourceKind, StateRecord, StateStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileStateStore::new("/var/lib/regsync/state.json").await?;
///
///     let record = StateRecord::new(
///         ResourceKind::Dnssec,
///         "example.com",
///         serde_json::json!({"enabled": false, "keys": []}),
///     );
///     store.set_record(&record).await?;
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileStateStore {
    path: PathBuf,
    state: Arc<RwLock<FileState>>,
}

#[derive(Debug)]
struct FileState {
    records: BTreeMap<StateKey, StateRecord>,
    dirty: bool,
}

/// Serializable state file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct StateFileFormat {
    version: String,
    records: BTreeMap<String, StateRecord>,
}

/// Why a state file could not be loaded
enum LoadError {
    /// The file exists but is not a valid state document
    Corrupted(Error),
    /// The file could not be read at all
    Unreadable(Error),
}

impl FileStateStore {
    /// Create or load a file state store
    ///
    /// This will:
    /// 1. Create parent directories if needed
    /// 2. Load the existing state file, if any
    /// 3. On corruption, load the backup and restore it over the main file
    /// 4. If the backup is unusable too, start empty
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| Error::config(io_failure("create state directory", parent, e)))?;
            }
        }

        let records = Self::load_state_with_recovery(&path).await?;

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(FileState {
                records,
                dirty: false,
            })),
        })
    }

    /// Path of the main state file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load_state_with_recovery(
        path: &Path,
    ) -> Result<BTreeMap<StateKey, StateRecord>, Error> {
        let corruption = match Self::load_state(path).await {
            Ok(records) => {
                tracing::debug!("Loaded state from file: {} records", records.len());
                return Ok(records);
            }
            Err(LoadError::Unreadable(e)) => return Err(e),
            Err(LoadError::Corrupted(e)) => e,
        };

        tracing::warn!(
            "State file appears corrupted: {}. Attempting recovery from backup.",
            corruption
        );

        let backup_path = Self::backup_path(path);
        if !backup_path.exists() {
            tracing::warn!("No backup file found. Starting with empty state.");
            return Ok(BTreeMap::new());
        }

        match Self::load_state(&backup_path).await {
            Ok(records) => {
                tracing::info!("Recovered state from backup: {} records", records.len());
                if let Err(restore_err) = Self::restore_from_backup(path, &backup_path).await {
                    tracing::error!("Failed to restore state file from backup: {}", restore_err);
                }
                Ok(records)
            }
            Err(LoadError::Corrupted(e)) | Err(LoadError::Unreadable(e)) => {
                tracing::error!("Backup also unusable: {}. Starting with empty state.", e);
                Ok(BTreeMap::new())
            }
        }
    }

    async fn load_state(path: &Path) -> Result<BTreeMap<StateKey, StateRecord>, LoadError> {
        if !path.exists() {
            tracing::debug!("State file does not exist: {}", path.display());
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            LoadError::Unreadable(Error::state_store(io_failure("read state file", path, e)))
        })?;

        let state_file: StateFileFormat = serde_json::from_str(&content).map_err(|e| {
            LoadError::Corrupted(Error::state_store(format!(
                "Failed to parse state file {}: {}",
                path.display(),
                e
            )))
        })?;

        if state_file.version != STATE_FILE_VERSION {
            tracing::warn!(
                "State file version mismatch: expected {}, got {}. Attempting to load anyway.",
                STATE_FILE_VERSION,
                state_file.version
            );
        }

        // The record carries its own key; the map key is informational.
        Ok(state_file
            .records
            .into_values()
            .map(|record| (record.key(), record))
            .collect())
    }

    async fn write_state(&self) -> Result<(), Error> {
        let json = {
            let state_guard = self.state.read().await;
            let state_file = StateFileFormat {
                version: STATE_FILE_VERSION.to_string(),
                records: state_guard
                    .records
                    .iter()
                    .map(|(key, record)| (key.to_string(), record.clone()))
                    .collect(),
            };
            serde_json::to_string_pretty(&state_file)
                .map_err(|e| Error::state_store(format!("Failed to serialize state: {}", e)))?
        };

        let temp_path = self.temp_path();
        let temp_failure = |action: &str, e| Error::state_store(io_failure(action, &temp_path, e));
        {
            let mut file = fs::File::create(&temp_path)
                .await
                .map_err(|e| temp_failure("create temp file", e))?;
            file.write_all(json.as_bytes())
                .await
                .map_err(|e| temp_failure("write temp file", e))?;
            file.sync_all()
                .await
                .map_err(|e| temp_failure("sync temp file", e))?;
        }

        if self.path.exists() {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("Failed to create backup: {}", e);
            }
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        self.state.write().await.dirty = false;

        tracing::trace!("State written to file: {}", self.path.display());
        Ok(())
    }

    async fn restore_from_backup(path: &Path, backup_path: &Path) -> Result<(), Error> {
        fs::copy(backup_path, path)
            .await
            .map_err(|e| Error::state_store(io_failure("restore state file", path, e)))?;

        tracing::info!("Restored {} from {}", path.display(), backup_path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }

    fn backup_path(path: &Path) -> PathBuf {
        path.with_extension("backup")
    }
}

fn io_failure(action: &str, path: &Path, e: std::io::Error) -> String {
    format!("Failed to {} {}: {}", action, path.display(), e)
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn get_record(&self, key: &StateKey) -> Result<Option<StateRecord>, Error> {
        let state_guard = self.state.read().await;
        Ok(state_guard.records.get(key).cloned())
    }

    async fn set_record(&self, record: &StateRecord) -> Result<(), Error> {
        {
            let mut state_guard = self.state.write().await;
            state_guard.records.insert(record.key(), record.clone());
            state_guard.dirty = true;
        }

        self.write_state().await
    }

    async fn delete_record(&self, key: &StateKey) -> Result<(), Error> {
        {
            let mut state_guard = self.state.write().await;
            if state_guard.records.remove(key).is_none() {
                return Ok(());
            }
            state_guard.dirty = true;
        }

        self.write_state().await
    }

    async fn list_records(&self) -> Result<Vec<StateKey>, Error> {
        let state_guard = self.state.read().await;
        Ok(state_guard.records.keys().cloned().collect())
    }

    async fn flush(&self) -> Result<(), Error> {
        let dirty = self.state.read().await.dirty;
        if dirty {
            self.write_state().await
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResourceKind;
    use serde_json::json;
    use tempfile::tempdir;

    fn domain_record(autorenew: bool) -> StateRecord {
        StateRecord::new(
            ResourceKind::Domain,
            "example.com",
            json!({"name": "example.com", "autorenew": autorenew}),
        )
    }

    fn domain_key() -> StateKey {
        StateKey::new(ResourceKind::Domain, "example.com")
    }

    #[tokio::test]
    async fn test_file_store_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = FileStateStore::new(&path).await.unwrap();
        assert!(store.list_records().await.unwrap().is_empty());

        store.set_record(&domain_record(true)).await.unwrap();
        assert!(path.exists());

        let store2 = FileStateStore::new(&path).await.unwrap();
        let record = store2.get_record(&domain_key()).await.unwrap().unwrap();
        assert_eq!(record.attributes["autorenew"], json!(true));

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"zone_domain:example.com\""));
    }

    #[tokio::test]
    async fn test_file_store_corruption_recovery() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = FileStateStore::new(&path).await.unwrap();
        store.set_record(&domain_record(true)).await.unwrap();
        // Second write leaves the first in the backup
        store.set_record(&domain_record(false)).await.unwrap();

        let backup_path = FileStateStore::backup_path(&path);
        assert!(backup_path.exists(), "Backup file should exist after write");

        fs::write(&path, b"corrupted json data").await.unwrap();

        let store2 = FileStateStore::new(&path).await.unwrap();
        let recovered = store2.get_record(&domain_key()).await.unwrap().unwrap();
        assert_eq!(
            recovered.attributes["autorenew"],
            json!(true),
            "Backup should contain previous state, not latest"
        );
    }

    #[tokio::test]
    async fn test_file_store_corruption_without_backup_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, b"{not json").await.unwrap();

        let store = FileStateStore::new(&path).await.unwrap();
        assert!(store.list_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_store_delete_and_flush() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let store = FileStateStore::new(&path).await.unwrap();
        store.set_record(&domain_record(true)).await.unwrap();
        store.delete_record(&domain_key()).await.unwrap();
        store.flush().await.unwrap();

        let store2 = FileStateStore::new(&path).await.unwrap();
        assert!(store2.get_record(&domain_key()).await.unwrap().is_none());
    }
}
