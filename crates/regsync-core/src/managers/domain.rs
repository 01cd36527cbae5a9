//! `zone_domain`: the registered domain itself
//!
//! Lifecycle: `Absent → Present(Divergent) → Present(Converged)`.
//!
//! Registration is out of scope, so `create` only starts tracking a domain
//! that already exists at the registrar, and `delete` only stops tracking
//! it. The one mutable field is `autorenew`.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{ensure_same_domain, first};
use crate::error::Result;
use crate::executor::OperationExecutor;
use crate::model::{
    DomainRecord, DomainSpec, DomainState, ResourceKind, ResourceState, validate_domain_name,
};
use crate::reconciler::{Plan, Reconciler};
use crate::traits::{RegistryClient, ResourceManager};

/// Manages the domain record
#[derive(Debug, Clone)]
pub struct DomainManager {
    client: Arc<dyn RegistryClient>,
    executor: OperationExecutor,
    reconciler: Reconciler,
}

impl DomainManager {
    /// Create a manager around a registrar client
    pub fn new(client: Arc<dyn RegistryClient>) -> Self {
        Self {
            executor: OperationExecutor::new(client.clone()),
            client,
            reconciler: Reconciler::default(),
        }
    }

    /// Log operations instead of sending them
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.executor = self.executor.with_dry_run(dry_run);
        self
    }

    async fn fetch(&self, name: &str) -> Result<Option<DomainRecord>> {
        Ok(first(self.client.get_domain(name).await?))
    }
}

#[async_trait]
impl ResourceManager for DomainManager {
    type Id = String;
    type Desired = DomainSpec;
    type Observed = DomainState;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Domain
    }

    fn parse_id(&self, id: &str) -> Result<String> {
        validate_domain_name(id)?;
        Ok(id.to_string())
    }

    async fn create(&self, desired: &DomainSpec) -> Result<ResourceState<DomainState>> {
        desired.validate()?;
        info!(
            "Tracking domain {} (registration is not performed; reading current state)",
            desired.name
        );
        self.read(&desired.name).await
    }

    async fn read(&self, id: &String) -> Result<ResourceState<DomainState>> {
        match self.fetch(id).await? {
            Some(record) => Ok(ResourceState::Present(record.into())),
            None => {
                debug!("Registrar reports no domain {}", id);
                Ok(ResourceState::Absent)
            }
        }
    }

    async fn update(
        &self,
        id: &String,
        desired: &DomainSpec,
    ) -> Result<ResourceState<DomainState>> {
        desired.validate()?;
        ensure_same_domain(id, &desired.name)?;

        let Some(current) = self.fetch(id).await? else {
            warn!("Domain {} no longer exists at the registrar; nothing to update", id);
            return Ok(ResourceState::Absent);
        };

        let plan = self.reconciler.plan_domain(desired, &current);
        debug!("Plan for domain {}: {}", id, plan);
        self.executor.execute(&plan).await.into_result()?;

        self.read(id).await
    }

    async fn delete(&self, id: &String) -> Result<()> {
        warn!(
            "Domain {} is only removed from local tracking; it stays registered and a later read will find it again",
            id
        );
        Ok(())
    }

    async fn plan(&self, desired: &DomainSpec) -> Result<Plan> {
        desired.validate()?;
        match self.fetch(&desired.name).await? {
            Some(current) => Ok(self.reconciler.plan_domain(desired, &current)),
            None => {
                warn!(
                    "Domain {} is not registered; there is nothing regsync can plan for it",
                    desired.name
                );
                Ok(Plan::new())
            }
        }
    }
}
