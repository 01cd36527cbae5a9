//! Sync engine
//!
//! The SyncEngine is the host-side glue around the manager registry:
//! - Running one lifecycle hook for a declaration
//! - Recording what was observed in the StateStore
//! - Forgetting instances that are deleted or gone upstream
//! - Emitting events for monitoring/logging
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐
//! │ Declaration │─── hook ───┐
//! └─────────────┘            │
//!                            ▼
//!                   ┌──────────────┐
//!                   │  SyncEngine  │
//!                   └──────────────┘
//!                            │
//!         ┌──────────────────┼──────────────────┐
//!         │                  │                  │
//!         ▼                  ▼                  ▼
//! ┌───────────────┐  ┌──────────────┐  ┌─────────────┐
//! │ManagerRegistry│  │  StateStore  │  │   Events    │
//! │  (converge)   │  │  (record)    │  │  (notify)   │
//! └───────────────┘  └──────────────┘  └─────────────┘
//! ```
//!
//! The state store is bookkeeping only. Managers never consult it; every
//! plan is computed from a fresh read of the registrar.

use crate::config::{EngineConfig, RegsyncConfig};
use crate::error::Result;
use crate::model::ResourceKind;
use crate::reconciler::Plan;
use crate::registry::{Declaration, Hook, HookOutcome, ManagerRegistry, Observation};
use crate::traits::{RegistryClient, StateKey, StateRecord, StateStore};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Events emitted by the SyncEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A hook started
    HookStarted {
        hook: Hook,
        kind: ResourceKind,
        id: String,
    },

    /// The resource was observed and recorded
    ResourceObserved { kind: ResourceKind, id: String },

    /// The registrar no longer reports the resource; it was forgotten
    ResourceAbsent { kind: ResourceKind, id: String },

    /// The resource was deleted and forgotten
    ResourceForgotten { kind: ResourceKind, id: String },

    /// A plan was computed without being applied
    PlanComputed {
        kind: ResourceKind,
        id: String,
        operations: usize,
    },

    /// A hook failed
    HookFailed {
        hook: Hook,
        kind: ResourceKind,
        id: String,
        error: String,
    },
}

/// Core sync engine
///
/// ## Lifecycle
///
/// 1. Create with [`SyncEngine::new()`]
/// 2. Call [`SyncEngine::run()`] once per user-issued command
/// 3. Drop to cleanup
///
/// ## Load Resistance
///
/// Events go through a bounded channel. When it is full, events are dropped
/// with a warning rather than blocking the hook.
pub struct SyncEngine {
    /// Managers for every resource kind
    registry: ManagerRegistry,

    /// Tracked resources
    state_store: Box<dyn StateStore>,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl SyncEngine {
    /// Create a new sync engine
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        client: Arc<dyn RegistryClient>,
        state_store: Box<dyn StateStore>,
        config: &EngineConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let engine = Self {
            registry: ManagerRegistry::new(client, config),
            state_store,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Create an engine from a full configuration
    pub fn from_config(
        client: Arc<dyn RegistryClient>,
        state_store: Box<dyn StateStore>,
        config: &RegsyncConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;
        Self::new(client, state_store, &config.engine)
    }

    /// The manager registry
    pub fn registry(&self) -> &ManagerRegistry {
        &self.registry
    }

    /// The state store
    pub fn state_store(&self) -> &dyn StateStore {
        self.state_store.as_ref()
    }

    /// Run one hook for `declaration` and record the outcome
    pub async fn run(&self, hook: Hook, declaration: &Declaration) -> Result<HookOutcome> {
        let kind = declaration.kind();
        let id = declaration.id();
        self.run_tracked(hook, kind, id, self.registry.dispatch(hook, declaration))
            .await
    }

    /// Update the instance tracked as `previous_id` towards `declaration`
    ///
    /// When the identifier changes (a renamed single nameserver), the old
    /// entry is forgotten and the new one recorded.
    pub async fn update_from(
        &self,
        declaration: &Declaration,
        previous_id: &str,
    ) -> Result<HookOutcome> {
        let kind = declaration.kind();
        let id = declaration.id();
        let outcome = self
            .run_tracked(
                Hook::Update,
                kind,
                id.clone(),
                self.registry.dispatch_update(declaration, Some(previous_id)),
            )
            .await?;

        if previous_id != id {
            self.state_store
                .delete_record(&StateKey::new(kind, previous_id))
                .await?;
            self.state_store.flush().await?;
        }

        Ok(outcome)
    }

    /// Adopt an existing instance and start tracking it
    pub async fn import(&self, kind: ResourceKind, id: &str) -> Result<Observation> {
        self.emit_event(EngineEvent::HookStarted {
            hook: Hook::Read,
            kind,
            id: id.to_string(),
        });

        let observation = self.registry.import(kind, id).await?;
        self.record(kind, id, &observation).await?;
        self.state_store.flush().await?;
        Ok(observation)
    }

    /// Re-read every tracked resource
    ///
    /// Stops at the first error. Resources reported absent are forgotten.
    pub async fn refresh(&self) -> Result<Vec<(StateKey, Observation)>> {
        let keys = self.state_store.list_records().await?;
        info!("Refreshing {} tracked resource(s)", keys.len());

        let mut observations = Vec::with_capacity(keys.len());
        for key in keys {
            let kind: ResourceKind = key.kind.parse()?;
            debug!("Refreshing {}", key);

            let observation = match self.registry.import(kind, &key.id).await {
                Ok(observation) => observation,
                Err(e) => {
                    error!("Failed to refresh {}: {}", key, e);
                    self.emit_event(EngineEvent::HookFailed {
                        hook: Hook::Read,
                        kind,
                        id: key.id.clone(),
                        error: e.to_string(),
                    });
                    return Err(e);
                }
            };

            self.record(kind, &key.id, &observation).await?;
            observations.push((key, observation));
        }

        self.state_store.flush().await?;
        Ok(observations)
    }

    async fn run_tracked(
        &self,
        hook: Hook,
        kind: ResourceKind,
        id: String,
        work: impl std::future::Future<Output = Result<HookOutcome>>,
    ) -> Result<HookOutcome> {
        debug!("Running {} for {} {}", hook, kind, id);
        self.emit_event(EngineEvent::HookStarted {
            hook,
            kind,
            id: id.clone(),
        });

        let outcome = match work.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("{} of {} {} failed: {}", hook, kind, id, e);
                self.emit_event(EngineEvent::HookFailed {
                    hook,
                    kind,
                    id,
                    error: e.to_string(),
                });
                return Err(e);
            }
        };

        match &outcome {
            HookOutcome::Observed(observation) => self.record(kind, &id, observation).await?,
            HookOutcome::Deleted => {
                self.state_store
                    .delete_record(&StateKey::new(kind, id.as_str()))
                    .await?;
                info!("Stopped tracking {} {}", kind, id);
                self.emit_event(EngineEvent::ResourceForgotten { kind, id });
            }
            HookOutcome::Planned(plan) => self.report_plan(kind, id, plan),
        }

        self.state_store.flush().await?;
        Ok(outcome)
    }

    async fn record(&self, kind: ResourceKind, id: &str, observation: &Observation) -> Result<()> {
        match observation.attributes()? {
            Some(attributes) => {
                let record = StateRecord::new(kind, id, attributes);
                self.state_store.set_record(&record).await?;
                self.emit_event(EngineEvent::ResourceObserved {
                    kind,
                    id: id.to_string(),
                });
            }
            None => {
                warn!("{} {} is absent at the registrar; forgetting it", kind, id);
                self.state_store
                    .delete_record(&StateKey::new(kind, id))
                    .await?;
                self.emit_event(EngineEvent::ResourceAbsent {
                    kind,
                    id: id.to_string(),
                });
            }
        }
        Ok(())
    }

    fn report_plan(&self, kind: ResourceKind, id: String, plan: &Plan) {
        info!("Plan for {} {}: {}", kind, id, plan);
        self.emit_event(EngineEvent::PlanComputed {
            kind,
            id,
            operations: plan.len(),
        });
    }

    fn emit_event(&self, event: EngineEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}
