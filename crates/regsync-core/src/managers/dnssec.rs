//! `zone_domain_dnssec`: DNSSEC configuration of a domain's zone
//!
//! The registrar replaces the whole `(has_dnssec, dnssec_keys)` pair on every
//! update, so there is no per-key diffing. Disabling sends an empty key set.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use super::{ensure_same_domain, first};
use crate::error::Result;
use crate::executor::OperationExecutor;
use crate::model::{
    DnsZoneRecord, DnssecSpec, DnssecState, ResourceKind, ResourceState, validate_domain_name,
};
use crate::reconciler::{Plan, Reconciler};
use crate::traits::{RegistryClient, ResourceManager};

/// Manages the DNSSEC settings of a zone
#[derive(Debug, Clone)]
pub struct DnssecManager {
    client: Arc<dyn RegistryClient>,
    executor: OperationExecutor,
    reconciler: Reconciler,
}

impl DnssecManager {
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

    /// Send the desired `(enabled, keys)` state in one whole-state update
    ///
    /// Keys are validated before anything is read or written. Nothing is sent
    /// when the zone already matches.
    pub async fn apply(&self, desired: &DnssecSpec) -> Result<ResourceState<DnssecState>> {
        desired.validate()?;

        let current = self.fetch(&desired.domain).await?;
        let plan = self.reconciler.plan_dnssec(desired, current.as_ref());
        debug!("Plan for DNSSEC of {}: {}", desired.domain, plan);

        if !plan.is_empty() {
            info!(
                "Setting DNSSEC of {}: enabled={}, {} key(s)",
                desired.domain,
                desired.enabled,
                desired.effective_keys().len()
            );
        }
        self.executor.execute(&plan).await.into_result()?;

        self.read(&desired.domain).await
    }

    async fn fetch(&self, domain: &str) -> Result<Option<DnsZoneRecord>> {
        Ok(first(self.client.get_dns_zone(domain).await?))
    }
}

#[async_trait]
impl ResourceManager for DnssecManager {
    type Id = String;
    type Desired = DnssecSpec;
    type Observed = DnssecState;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Dnssec
    }

    fn parse_id(&self, id: &str) -> Result<String> {
        validate_domain_name(id)?;
        Ok(id.to_string())
    }

    async fn create(&self, desired: &DnssecSpec) -> Result<ResourceState<DnssecState>> {
        self.apply(desired).await
    }

    async fn read(&self, id: &String) -> Result<ResourceState<DnssecState>> {
        match self.fetch(id).await? {
            Some(zone) => Ok(ResourceState::Present(zone.into())),
            None => {
                debug!("Registrar reports no DNS zone {}", id);
                Ok(ResourceState::Absent)
            }
        }
    }

    async fn update(&self, id: &String, desired: &DnssecSpec) -> Result<ResourceState<DnssecState>> {
        ensure_same_domain(id, &desired.domain)?;
        self.apply(desired).await
    }

    /// Disables signing and clears every key
    async fn delete(&self, id: &String) -> Result<()> {
        self.apply(&DnssecSpec::disabled(id.as_str())).await?;
        Ok(())
    }

    async fn plan(&self, desired: &DnssecSpec) -> Result<Plan> {
        desired.validate()?;
        let current = self.fetch(&desired.domain).await?;
        Ok(self.reconciler.plan_dnssec(desired, current.as_ref()))
    }
}
