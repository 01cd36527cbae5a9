// # State Store Implementations
//
// Implementations of the StateStore trait, selected by
// `REGSYNC_STATE_STORE_TYPE`.

pub mod file;
pub mod memory;

pub use file::FileStateStore;
pub use memory::MemoryStateStore;

use crate::config::StateStoreConfig;
use crate::error::Result;
use crate::traits::StateStore;

/// Build the state store described by `config`
pub async fn open(config: &StateStoreConfig) -> Result<Box<dyn StateStore>> {
    match config {
        StateStoreConfig::Memory => Ok(Box::new(MemoryStateStore::new())),
        StateStoreConfig::File { path } => Ok(Box::new(FileStateStore::new(path).await?)),
    }
}
