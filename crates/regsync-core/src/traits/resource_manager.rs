// # Resource Manager Trait
//
// Lifecycle hooks for one resource kind.
//
// ## Implementations
//
// - `zone_domain`: `DomainManager`
// - `zone_domain_nameservers`: `NameserverSetManager`
// - `zone_domain_nameserver`: `NameserverManager`
// - `zone_domain_dnssec`: `DnssecManager`
//
// Every hook reads fresh remote state; nothing is cached between calls.

use async_trait::async_trait;

use crate::model::{ResourceKind, ResourceState};
use crate::reconciler::Plan;

/// Trait for resource manager implementations
///
/// # Trust Level: Trusted (Core Component)
///
/// ## Allowed Capabilities
/// - ✅ Validate declarations before any request is issued
/// - ✅ Read remote state through the injected client
/// - ✅ Ask the reconciler for a plan and hand it to the executor
///
/// ## Forbidden Capabilities
/// - ❌ Build HTTP requests directly (owned by `RegistryClient`)
/// - ❌ Persist tracked state (owned by `StateStore`)
/// - ❌ Retry failed operations
#[async_trait]
pub trait ResourceManager: Send + Sync {
    /// Identity of a tracked instance
    type Id: Send + Sync;
    /// Declared state
    type Desired: Send + Sync;
    /// Observed state
    type Observed: Send + Sync;

    /// Kind handled by this manager
    fn kind(&self) -> ResourceKind;

    /// Parse an identifier as produced by `create` (used by import)
    fn parse_id(&self, id: &str) -> Result<Self::Id, crate::Error>;

    /// Converge remote state to `desired` and return what was observed afterwards
    async fn create(
        &self,
        desired: &Self::Desired,
    ) -> Result<ResourceState<Self::Observed>, crate::Error>;

    /// Read current remote state
    async fn read(&self, id: &Self::Id) -> Result<ResourceState<Self::Observed>, crate::Error>;

    /// Converge an existing instance to `desired`
    async fn update(
        &self,
        id: &Self::Id,
        desired: &Self::Desired,
    ) -> Result<ResourceState<Self::Observed>, crate::Error>;

    /// Remove the instance
    async fn delete(&self, id: &Self::Id) -> Result<(), crate::Error>;

    /// Compute the operations needed to converge, without applying them
    async fn plan(&self, desired: &Self::Desired) -> Result<Plan, crate::Error>;

    /// Adopt an instance that already exists at the registrar
    async fn import(&self, id: &str) -> Result<ResourceState<Self::Observed>, crate::Error> {
        let id = self.parse_id(id)?;
        self.read(&id).await
    }
}
