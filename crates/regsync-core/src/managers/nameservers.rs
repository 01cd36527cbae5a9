//! `zone_domain_nameservers` and `zone_domain_nameserver`
//!
//! [`NameserverSetManager`] converges the whole nameserver set of a domain.
//! Under the default full-replace policy every current nameserver is deleted
//! before the desired list is created, so the domain is left with **no
//! nameservers** if the create call fails. The next `replace` starts from the
//! empty set and only creates.
//!
//! [`NameserverManager`] handles one nameserver addressed by
//! `domain/hostname`, for declarations that manage entries individually.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{ensure_same_domain, first};
use crate::error::Result;
use crate::executor::OperationExecutor;
use crate::model::{
    NameserverId, NameserverRecord, NameserverSetSpec, NameserverSetState, NameserverSpec,
    ResourceKind, ResourceState, validate_domain_name,
};
use crate::reconciler::{NameserverPolicy, Operation, Plan, Reconciler};
use crate::traits::{RegistryClient, ResourceManager};

/// Manages the nameserver set of a domain
#[derive(Debug, Clone)]
pub struct NameserverSetManager {
    client: Arc<dyn RegistryClient>,
    executor: OperationExecutor,
    reconciler: Reconciler,
}

impl NameserverSetManager {
    /// Create a manager using the full-replace policy
    pub fn new(client: Arc<dyn RegistryClient>) -> Self {
        Self {
            executor: OperationExecutor::new(client.clone()),
            client,
            reconciler: Reconciler::default(),
        }
    }

    /// Choose how sets are converged
    pub fn with_policy(mut self, policy: NameserverPolicy) -> Self {
        self.reconciler = Reconciler::new(policy);
        self
    }

    /// Log operations instead of sending them
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.executor = self.executor.with_dry_run(dry_run);
        self
    }

    /// Active nameserver policy
    pub fn policy(&self) -> NameserverPolicy {
        self.reconciler.nameserver_policy()
    }

    /// Converge the nameserver set of `desired.domain` to `desired.nameservers`
    ///
    /// On failure the error reports how many operations were applied;
    /// nothing is rolled back.
    pub async fn replace(&self, desired: &NameserverSetSpec) -> Result<NameserverSetState> {
        desired.validate()?;

        let current = self.client.list_nameservers(&desired.domain).await?;
        let plan = self.reconciler.plan_nameserver_set(desired, &current);
        debug!("Plan for nameservers of {}: {}", desired.domain, plan);

        if self.policy() == NameserverPolicy::FullReplace && !current.is_empty() {
            warn!(
                "Replacing all {} nameserver(s) of {}; the domain has no nameservers until the create call succeeds",
                current.len(),
                desired.domain
            );
        }

        self.executor.execute(&plan).await.into_result()?;
        self.observe(&desired.domain).await
    }

    /// Current nameserver set as listed by the registrar
    pub async fn observe(&self, domain: &str) -> Result<NameserverSetState> {
        let nameservers = self.client.list_nameservers(domain).await?;
        Ok(NameserverSetState {
            domain: domain.to_string(),
            nameservers,
        })
    }

    /// Remove every nameserver of `domain`
    pub async fn remove_all(&self, domain: &str) -> Result<()> {
        let current = self.client.list_nameservers(domain).await?;
        if current.is_empty() {
            debug!("Domain {} has no nameservers to remove", domain);
            return Ok(());
        }

        let plan = self.reconciler.plan_nameserver_removal(domain, &current);
        warn!("Removing all {} nameserver(s) of {}", plan.len(), domain);
        self.executor.execute(&plan).await.into_result()?;
        Ok(())
    }

    /// Converge one nameserver, creating it if it does not exist
    pub async fn create_one(&self, desired: &NameserverSpec) -> Result<ResourceState<NameserverRecord>> {
        desired.validate()?;

        let id = desired.id();
        let current = self.fetch_one(&id).await?;
        let plan = self.reconciler.plan_nameserver(desired, current.as_ref());
        debug!("Plan for nameserver {}: {}", id, plan);
        self.executor.execute(&plan).await.into_result()?;

        self.read_one(&id).await
    }

    /// Read one nameserver
    pub async fn read_one(&self, id: &NameserverId) -> Result<ResourceState<NameserverRecord>> {
        match self.fetch_one(id).await? {
            Some(record) => Ok(ResourceState::Present(record)),
            None => {
                debug!("Registrar reports no nameserver {}", id);
                Ok(ResourceState::Absent)
            }
        }
    }

    /// Converge the nameserver tracked as `id` to `desired`
    ///
    /// A different hostname replaces the tracked entry; a glue change updates it.
    pub async fn update_one(
        &self,
        id: &NameserverId,
        desired: &NameserverSpec,
    ) -> Result<ResourceState<NameserverRecord>> {
        desired.validate()?;
        ensure_same_domain(&id.domain, &desired.domain)?;

        let current = self.fetch_one(id).await?;
        let plan = self.reconciler.plan_nameserver(desired, current.as_ref());
        debug!("Plan for nameserver {}: {}", id, plan);
        self.executor.execute(&plan).await.into_result()?;

        self.read_one(&desired.id()).await
    }

    /// Delete one nameserver; a missing entry is not an error
    pub async fn delete_one(&self, id: &NameserverId) -> Result<()> {
        let Some(current) = self.fetch_one(id).await? else {
            debug!("Nameserver {} already absent", id);
            return Ok(());
        };

        let plan = Plan::from(vec![Operation::DeleteNameserver {
            domain: id.domain.clone(),
            hostname: current.hostname,
        }]);
        self.executor.execute(&plan).await.into_result()?;
        Ok(())
    }

    /// Plan for one nameserver without applying it
    pub async fn plan_one(&self, desired: &NameserverSpec) -> Result<Plan> {
        desired.validate()?;
        let current = self.fetch_one(&desired.id()).await?;
        Ok(self.reconciler.plan_nameserver(desired, current.as_ref()))
    }

    async fn fetch_one(&self, id: &NameserverId) -> Result<Option<NameserverRecord>> {
        Ok(first(self.client.get_nameserver(&id.domain, &id.hostname).await?))
    }
}

#[async_trait]
impl ResourceManager for NameserverSetManager {
    type Id = String;
    type Desired = NameserverSetSpec;
    type Observed = NameserverSetState;

    fn kind(&self) -> ResourceKind {
        ResourceKind::NameserverSet
    }

    fn parse_id(&self, id: &str) -> Result<String> {
        validate_domain_name(id)?;
        Ok(id.to_string())
    }

    async fn create(&self, desired: &NameserverSetSpec) -> Result<ResourceState<NameserverSetState>> {
        info!("Setting nameservers of {}: {}", desired.domain, desired.hostnames().join(", "));
        self.replace(desired).await.map(ResourceState::Present)
    }

    /// The set always exists, possibly empty
    async fn read(&self, id: &String) -> Result<ResourceState<NameserverSetState>> {
        self.observe(id).await.map(ResourceState::Present)
    }

    async fn update(
        &self,
        id: &String,
        desired: &NameserverSetSpec,
    ) -> Result<ResourceState<NameserverSetState>> {
        ensure_same_domain(id, &desired.domain)?;
        self.replace(desired).await.map(ResourceState::Present)
    }

    async fn delete(&self, id: &String) -> Result<()> {
        self.remove_all(id).await
    }

    async fn plan(&self, desired: &NameserverSetSpec) -> Result<Plan> {
        desired.validate()?;
        let current = self.client.list_nameservers(&desired.domain).await?;
        Ok(self.reconciler.plan_nameserver_set(desired, &current))
    }
}

/// Manages a single nameserver through a [`NameserverSetManager`]
#[derive(Debug, Clone)]
pub struct NameserverManager {
    sets: NameserverSetManager,
}

impl NameserverManager {
    /// Wrap a set manager
    pub fn new(sets: NameserverSetManager) -> Self {
        Self { sets }
    }
}

#[async_trait]
impl ResourceManager for NameserverManager {
    type Id = NameserverId;
    type Desired = NameserverSpec;
    type Observed = NameserverRecord;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Nameserver
    }

    fn parse_id(&self, id: &str) -> Result<NameserverId> {
        let id = NameserverId::parse(id)?;
        validate_domain_name(&id.domain)?;
        validate_domain_name(&id.hostname)?;
        Ok(id)
    }

    async fn create(&self, desired: &NameserverSpec) -> Result<ResourceState<NameserverRecord>> {
        self.sets.create_one(desired).await
    }

    async fn read(&self, id: &NameserverId) -> Result<ResourceState<NameserverRecord>> {
        self.sets.read_one(id).await
    }

    async fn update(
        &self,
        id: &NameserverId,
        desired: &NameserverSpec,
    ) -> Result<ResourceState<NameserverRecord>> {
        self.sets.update_one(id, desired).await
    }

    async fn delete(&self, id: &NameserverId) -> Result<()> {
        self.sets.delete_one(id).await
    }

    async fn plan(&self, desired: &NameserverSpec) -> Result<Plan> {
        self.sets.plan_one(desired).await
    }
}
