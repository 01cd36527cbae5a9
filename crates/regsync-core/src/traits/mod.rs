//! Core traits for the regsync system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`RegistryClient`]: Talk to the registrar's REST API
//! - [`ResourceManager`]: Lifecycle hooks for one resource kind
//! - [`StateStore`]: Local record of tracked resource instances

pub mod registry_client;
pub mod resource_manager;
pub mod state_store;

pub use registry_client::RegistryClient;
pub use resource_manager::ResourceManager;
pub use state_store::{StateKey, StateRecord, StateStore};
