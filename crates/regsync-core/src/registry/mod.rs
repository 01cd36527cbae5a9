//! Resource-kind registry
//!
//! Maps the resource-kind identifiers used in declarations to the concrete
//! managers, so callers never branch on kind names themselves.
//!
//! | Identifier | Manager |
//! |------------|---------|
//! | `zone_domain` | [`DomainManager`] |
//! | `zone_domain_nameservers` | [`NameserverSetManager`] |
//! | `zone_domain_nameserver` | [`NameserverManager`] |
//! | `zone_domain_dnssec` | [`DnssecManager`] |
//!
//! Dispatch is static: a [`Declaration`] carries its typed desired state and
//! is routed to the matching manager with a `match`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use regsync_core::registry::{Declaration, Hook, ManagerRegistry};
//! use regsync_core::config::EngineConfig;
//!
//! let registry = ManagerRegistry::new(client, &EngineConfig::default());
//! let declaration: Declaration = serde_json::from_str(
//!     r#"{"kind": "zone_domain_dnssec", "domain": "example.com", "enabled": false}"#,
//! )?;
//! let outcome = registry.dispatch(Hook::Create, &declaration).await?;
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::managers::{DnssecManager, DomainManager, NameserverManager, NameserverSetManager};
use crate::model::{
    DnssecSpec, DnssecState, DomainSpec, DomainState, NameserverRecord, NameserverSetSpec,
    NameserverSetState, NameserverSpec, ResourceKind, ResourceState,
};
use crate::reconciler::Plan;
use crate::traits::{RegistryClient, ResourceManager};

/// Desired state of one resource instance, tagged with its kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Declaration {
    /// `zone_domain`
    #[serde(rename = "zone_domain")]
    Domain(DomainSpec),
    /// `zone_domain_nameservers`
    #[serde(rename = "zone_domain_nameservers")]
    NameserverSet(NameserverSetSpec),
    /// `zone_domain_nameserver`
    #[serde(rename = "zone_domain_nameserver")]
    Nameserver(NameserverSpec),
    /// `zone_domain_dnssec`
    #[serde(rename = "zone_domain_dnssec")]
    Dnssec(DnssecSpec),
}

impl Declaration {
    /// Resource kind of this declaration
    pub fn kind(&self) -> ResourceKind {
        match self {
            Declaration::Domain(_) => ResourceKind::Domain,
            Declaration::NameserverSet(_) => ResourceKind::NameserverSet,
            Declaration::Nameserver(_) => ResourceKind::Nameserver,
            Declaration::Dnssec(_) => ResourceKind::Dnssec,
        }
    }

    /// Identifier the instance is tracked under
    pub fn id(&self) -> String {
        match self {
            Declaration::Domain(spec) => spec.name.clone(),
            Declaration::NameserverSet(spec) => spec.domain.clone(),
            Declaration::Nameserver(spec) => spec.id().to_string(),
            Declaration::Dnssec(spec) => spec.domain.clone(),
        }
    }
}

/// Observed state returned by a hook, tagged with its kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// `zone_domain`
    Domain(ResourceState<DomainState>),
    /// `zone_domain_nameservers`
    NameserverSet(ResourceState<NameserverSetState>),
    /// `zone_domain_nameserver`
    Nameserver(ResourceState<NameserverRecord>),
    /// `zone_domain_dnssec`
    Dnssec(ResourceState<DnssecState>),
}

impl Observation {
    /// Resource kind of this observation
    pub fn kind(&self) -> ResourceKind {
        match self {
            Observation::Domain(_) => ResourceKind::Domain,
            Observation::NameserverSet(_) => ResourceKind::NameserverSet,
            Observation::Nameserver(_) => ResourceKind::Nameserver,
            Observation::Dnssec(_) => ResourceKind::Dnssec,
        }
    }

    /// Whether the registrar reported the resource as gone
    pub fn is_absent(&self) -> bool {
        match self {
            Observation::Domain(state) => state.is_absent(),
            Observation::NameserverSet(state) => state.is_absent(),
            Observation::Nameserver(state) => state.is_absent(),
            Observation::Dnssec(state) => state.is_absent(),
        }
    }

    /// Observed attributes as JSON, `None` when absent
    pub fn attributes(&self) -> serde_json::Result<Option<serde_json::Value>> {
        fn encode<T: Serialize>(state: &ResourceState<T>) -> serde_json::Result<Option<serde_json::Value>> {
            state.present().map(serde_json::to_value).transpose()
        }

        match self {
            Observation::Domain(state) => encode(state),
            Observation::NameserverSet(state) => encode(state),
            Observation::Nameserver(state) => encode(state),
            Observation::Dnssec(state) => encode(state),
        }
    }
}

/// Lifecycle hook invoked by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    /// Converge a new instance and start tracking it
    Create,
    /// Observe current remote state
    Read,
    /// Converge a tracked instance
    Update,
    /// Remove a tracked instance
    Delete,
    /// Compute the plan without applying it
    Plan,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Hook::Create => "create",
            Hook::Read => "read",
            Hook::Update => "update",
            Hook::Delete => "delete",
            Hook::Plan => "plan",
        };
        f.write_str(name)
    }
}

impl FromStr for Hook {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "create" => Ok(Hook::Create),
            "read" => Ok(Hook::Read),
            "update" => Ok(Hook::Update),
            "delete" => Ok(Hook::Delete),
            "plan" => Ok(Hook::Plan),
            other => Err(Error::validation(format!(
                "Unknown hook '{}'. Valid: create, read, update, delete, plan",
                other
            ))),
        }
    }
}

/// Result of dispatching a hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    /// Remote state observed after the hook ran
    Observed(Observation),
    /// The instance is no longer tracked
    Deleted,
    /// Operations that would converge the instance
    Planned(Plan),
}

/// Kind-agnostic outcome of one manager call
enum Outcome<T> {
    Observed(ResourceState<T>),
    Deleted,
    Planned(Plan),
}

impl<T> Outcome<T> {
    fn into_hook_outcome(self, wrap: fn(ResourceState<T>) -> Observation) -> HookOutcome {
        match self {
            Outcome::Observed(state) => HookOutcome::Observed(wrap(state)),
            Outcome::Deleted => HookOutcome::Deleted,
            Outcome::Planned(plan) => HookOutcome::Planned(plan),
        }
    }
}

async fn run_hook<M: ResourceManager>(
    manager: &M,
    hook: Hook,
    id: &M::Id,
    desired: &M::Desired,
) -> Result<Outcome<M::Observed>> {
    let outcome = match hook {
        Hook::Create => Outcome::Observed(manager.create(desired).await?),
        Hook::Read => Outcome::Observed(manager.read(id).await?),
        Hook::Update => Outcome::Observed(manager.update(id, desired).await?),
        Hook::Delete => {
            manager.delete(id).await?;
            Outcome::Deleted
        }
        Hook::Plan => Outcome::Planned(manager.plan(desired).await?),
    };
    Ok(outcome)
}

/// Registry of resource managers
///
/// All managers share one registrar client.
#[derive(Debug, Clone)]
pub struct ManagerRegistry {
    domain: DomainManager,
    nameserver_sets: NameserverSetManager,
    nameservers: NameserverManager,
    dnssec: DnssecManager,
}

impl ManagerRegistry {
    /// Build every manager around `client`
    pub fn new(client: Arc<dyn RegistryClient>, config: &EngineConfig) -> Self {
        let nameserver_sets = NameserverSetManager::new(client.clone())
            .with_policy(config.nameserver_policy)
            .with_dry_run(config.dry_run);

        Self {
            domain: DomainManager::new(client.clone()).with_dry_run(config.dry_run),
            nameservers: NameserverManager::new(nameserver_sets.clone()),
            nameserver_sets,
            dnssec: DnssecManager::new(client).with_dry_run(config.dry_run),
        }
    }

    /// Resolve a resource-kind identifier
    pub fn resolve(&self, kind: &str) -> Result<ResourceKind> {
        kind.parse()
    }

    /// Every registered resource-kind identifier
    pub fn kinds(&self) -> Vec<&'static str> {
        ResourceKind::ALL.iter().map(ResourceKind::as_str).collect()
    }

    /// The `zone_domain` manager
    pub fn domain(&self) -> &DomainManager {
        &self.domain
    }

    /// The `zone_domain_nameservers` manager
    pub fn nameserver_sets(&self) -> &NameserverSetManager {
        &self.nameserver_sets
    }

    /// The `zone_domain_nameserver` manager
    pub fn nameservers(&self) -> &NameserverManager {
        &self.nameservers
    }

    /// The `zone_domain_dnssec` manager
    pub fn dnssec(&self) -> &DnssecManager {
        &self.dnssec
    }

    /// Run `hook` for the instance identified by the declaration itself
    pub async fn dispatch(&self, hook: Hook, declaration: &Declaration) -> Result<HookOutcome> {
        self.dispatch_tracked(hook, declaration, None).await
    }

    /// Update the instance tracked as `previous_id` towards `declaration`
    ///
    /// The previous identifier matters for single nameservers, whose
    /// hostname may change between declarations.
    pub async fn dispatch_update(
        &self,
        declaration: &Declaration,
        previous_id: Option<&str>,
    ) -> Result<HookOutcome> {
        self.dispatch_tracked(Hook::Update, declaration, previous_id)
            .await
    }

    async fn dispatch_tracked(
        &self,
        hook: Hook,
        declaration: &Declaration,
        tracked_id: Option<&str>,
    ) -> Result<HookOutcome> {
        let tracked_id = tracked_id.map(str::to_string).unwrap_or_else(|| declaration.id());

        match declaration {
            Declaration::Domain(spec) => {
                let id = self.domain.parse_id(&tracked_id)?;
                Ok(run_hook(&self.domain, hook, &id, spec)
                    .await?
                    .into_hook_outcome(Observation::Domain))
            }
            Declaration::NameserverSet(spec) => {
                let id = self.nameserver_sets.parse_id(&tracked_id)?;
                Ok(run_hook(&self.nameserver_sets, hook, &id, spec)
                    .await?
                    .into_hook_outcome(Observation::NameserverSet))
            }
            Declaration::Nameserver(spec) => {
                let id = self.nameservers.parse_id(&tracked_id)?;
                Ok(run_hook(&self.nameservers, hook, &id, spec)
                    .await?
                    .into_hook_outcome(Observation::Nameserver))
            }
            Declaration::Dnssec(spec) => {
                let id = self.dnssec.parse_id(&tracked_id)?;
                Ok(run_hook(&self.dnssec, hook, &id, spec)
                    .await?
                    .into_hook_outcome(Observation::Dnssec))
            }
        }
    }

    /// Read an existing instance by kind and identifier
    pub async fn import(&self, kind: ResourceKind, id: &str) -> Result<Observation> {
        let observation = match kind {
            ResourceKind::Domain => Observation::Domain(self.domain.import(id).await?),
            ResourceKind::NameserverSet => {
                Observation::NameserverSet(self.nameserver_sets.import(id).await?)
            }
            ResourceKind::Nameserver => Observation::Nameserver(self.nameservers.import(id).await?),
            ResourceKind::Dnssec => Observation::Dnssec(self.dnssec.import(id).await?),
        };
        Ok(observation)
    }
}
