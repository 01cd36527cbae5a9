// # State Store Trait
//
// Defines the interface for the local record of tracked resources.
//
// ## Purpose
//
// The state store remembers, per `(kind, id)`:
// - The attributes observed by the last lifecycle hook
// - When that observation was made
//
// It is bookkeeping only. Reconciliation never trusts it: every plan is
// computed from a fresh read of the registrar.
//
// ## Implementations
//
// - In-memory: `MemoryStateStore`
// - File-based: `FileStateStore` (JSON, atomic writes)
//
// ## Usage
//
// ```rust,ignore
// use regsync_core::{ResourceKind, StateKey, StateStore};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let store = /* StateStore implementation */;
//
//     let key = StateKey::new(ResourceKind::Domain, "example.com");
//     if let Some(record) = store.get_record(&key).await? {
//         println!("last seen {}", record.last_refreshed);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ResourceKind;

/// Key of a tracked resource instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey {
    /// Resource kind identifier
    pub kind: String,
    /// Instance identifier, as returned by `create`
    pub id: String,
}

impl StateKey {
    /// Create a key
    pub fn new(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            id: id.into(),
        }
    }

    /// Parse the `kind:id` form used as the persisted map key
    pub fn parse(raw: &str) -> Option<Self> {
        let (kind, id) = raw.split_once(':')?;
        Some(Self {
            kind: kind.to_string(),
            id: id.to_string(),
        })
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Last observation of a tracked resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    /// Resource kind identifier
    pub kind: String,
    /// Instance identifier
    pub id: String,
    /// Observed attributes as JSON
    pub attributes: serde_json::Value,
    /// When the attributes were read from the registrar
    pub last_refreshed: DateTime<Utc>,
}

impl StateRecord {
    /// Create a record observed now
    pub fn new(kind: ResourceKind, id: impl Into<String>, attributes: serde_json::Value) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            id: id.into(),
            attributes,
            last_refreshed: Utc::now(),
        }
    }

    /// Key under which this record is stored
    pub fn key(&self) -> StateKey {
        StateKey {
            kind: self.kind.clone(),
            id: self.id.clone(),
        }
    }
}

/// Trait for state store implementations
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Trust Level: Trusted (Core Component)
///
/// ## Allowed Capabilities
/// - ✅ Perform I/O for persistent storage
/// - ✅ Implement locking for thread safety
/// - ✅ Cache state in memory (with explicit flush)
///
/// ## Forbidden Capabilities
/// - ❌ Contact the registrar (owned by `RegistryClient`)
/// - ❌ Decide what to change (owned by the reconciler)
/// - ❌ Spawn background tasks
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the record stored under `key`
    ///
    /// # Returns
    ///
    /// - `Ok(Some(StateRecord))`: The stored record
    /// - `Ok(None)`: Nothing tracked under this key
    /// - `Err(Error)`: Storage error
    async fn get_record(&self, key: &StateKey) -> Result<Option<StateRecord>, crate::Error>;

    /// Create or replace a record
    async fn set_record(&self, record: &StateRecord) -> Result<(), crate::Error>;

    /// Forget a record (no error if it did not exist)
    async fn delete_record(&self, key: &StateKey) -> Result<(), crate::Error>;

    /// List every tracked key, sorted
    async fn list_records(&self) -> Result<Vec<StateKey>, crate::Error>;

    /// Persist any pending changes
    async fn flush(&self) -> Result<(), crate::Error>;
}
