// # Memory State Store
//
// In-memory implementation of StateStore.
//
// ## Crash Behavior
//
// - All tracked records are lost on restart
// - Nothing is lost at the registrar: the next `create` or `import`
//   re-reads remote state and tracks it again
//
// ## When to Use
//
// - Tests
// - One-shot invocations where nothing needs to be remembered

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::state_store::{StateKey, StateRecord, StateStore};

/// In-memory state store implementation
///
/// Records live in an ordered map behind a RwLock, so `list_records`
/// comes back sorted without extra work.
///
/// # Example
///
/// ```rust,no_run
/// use regsync_core::state::MemoryStateStore;
/// use regsync_core::{ResourceKind, StateKey, StateRecord, StateStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryStateStore::new();
///
///     let record = StateRecord::new(
///         ResourceKind::Domain,
///         "example.com",
///         serde_json::json!({"autorenew": true}),
///     );
///     store.set_record(&record).await?;
///
///     let key = StateKey::new(ResourceKind::Domain, "example.com");
///     assert!(store.get_record(&key).await?.is_some());
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<BTreeMap<StateKey, StateRecord>>>,
}

impl MemoryStateStore {
    /// Create a new empty memory state store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of records in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Clear all records from the store
    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get_record(&self, key: &StateKey) -> Result<Option<StateRecord>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(key).cloned())
    }

    async fn set_record(&self, record: &StateRecord) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.insert(record.key(), record.clone());
        Ok(())
    }

    async fn delete_record(&self, key: &StateKey) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.remove(key);
        Ok(())
    }

    async fn list_records(&self) -> Result<Vec<StateKey>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.keys().cloned().collect())
    }

    async fn flush(&self) -> Result<(), Error> {
        // Nothing buffered
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResourceKind;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStateStore::new();
        assert!(store.is_empty().await);

        let record = StateRecord::new(ResourceKind::Domain, "example.com", json!({"autorenew": true}));
        store.set_record(&record).await.unwrap();
        assert_eq!(store.len().await, 1);

        let key = StateKey::new(ResourceKind::Domain, "example.com");
        let retrieved = store.get_record(&key).await.unwrap().unwrap();
        assert_eq!(retrieved.attributes, json!({"autorenew": true}));

        store.delete_record(&key).await.unwrap();
        assert!(store.is_empty().await);

        // Deleting twice is fine
        store.delete_record(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_store_list_is_sorted() {
        let store = MemoryStateStore::new();

        for (kind, id) in [
            (ResourceKind::Dnssec, "example.com"),
            (ResourceKind::Domain, "example.org"),
            (ResourceKind::Domain, "example.com"),
        ] {
            store
                .set_record(&StateRecord::new(kind, id, json!({})))
                .await
                .unwrap();
        }

        let keys: Vec<String> = store
            .list_records()
            .await
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            keys,
            vec![
                "zone_domain:example.com",
                "zone_domain:example.org",
                "zone_domain_dnssec:example.com",
            ]
        );
    }
}
