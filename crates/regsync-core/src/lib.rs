// # regsync-core
//
// Core library for synchronizing registrar domain settings.
//
// ## Architecture Overview
//
// - **RegistryClient**: Trait for the registrar's REST API
// - **Reconciler**: Pure planning from desired + observed state
// - **OperationExecutor**: Sequential plan execution, stop on first failure
// - **ResourceManager**: Per-kind lifecycle hooks (create/read/update/delete)
// - **ManagerRegistry**: Resource-kind identifiers → managers
// - **SyncEngine**: Runs hooks and records results in a StateStore
//
// ## Design Principles
//
// 1. **Fresh reads**: Remote state is read on every pass, never cached
// 2. **No hidden retries**: Failures surface; the next pass converges
// 3. **Library-First**: The binary is a thin layer over this crate
// 4. **Stateless managers**: Local tracking lives in the StateStore only

pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod managers;
pub mod model;
pub mod reconciler;
pub mod registry;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::{ClientConfig, EngineConfig, RegsyncConfig, StateStoreConfig};
pub use engine::{EngineEvent, SyncEngine};
pub use error::{Error, Result};
pub use executor::{ExecutionReport, OperationExecutor, OperationFailure};
pub use managers::{DnssecManager, DomainManager, NameserverManager, NameserverSetManager};
pub use model::{
    Convergence, DnsZoneRecord, DnssecKey, DnssecSpec, DnssecState, DomainRecord, DomainSpec,
    DomainState, DomainUpdate, NameserverId, NameserverRecord, NameserverSetSpec,
    NameserverSetState, NameserverSpec, ResourceKind, ResourceState,
};
pub use reconciler::{NameserverPolicy, Operation, OperationKind, Plan, Reconciler, Target};
pub use registry::{Declaration, Hook, HookOutcome, ManagerRegistry, Observation};
pub use state::{FileStateStore, MemoryStateStore};
pub use traits::{RegistryClient, ResourceManager, StateKey, StateRecord, StateStore};
