//! Contract Test: Domain Lifecycle
//!
//! Constraints verified:
//! - An empty read is `Absent`, not an error
//! - Delete is local-only: the domain is still found afterwards
//! - Update carries `autorenew` only, and nothing when converged
//! - Create never registers anything
//! - The domain name cannot change in place
//!
//! If this test fails, the domain lifecycle started touching the registrar
//! in ways it must not.

mod common;

use common::*;
use regsync_core::{
    DomainManager, DomainSpec, DomainUpdate, ResourceManager, ResourceState,
};

#[tokio::test]
async fn empty_read_is_absent() {
    let fake = FakeRegistrar::new();
    let manager = DomainManager::new(fake.client());

    let state = manager.read(&"example.com".to_string()).await.unwrap();

    assert_eq!(state, ResourceState::Absent);
}

#[tokio::test]
async fn delete_is_local_only() {
    let fake = FakeRegistrar::new().with_domain("example.com", true);
    let manager = DomainManager::new(fake.client());
    let id = "example.com".to_string();

    manager.delete(&id).await.unwrap();
    assert!(fake.calls().is_empty(), "Delete must not contact the registrar");

    let state = manager.read(&id).await.unwrap();
    let domain = state.into_present().expect("domain still registered");
    assert_eq!(domain.name, "example.com");
}

#[tokio::test]
async fn update_sends_autorenew_only_when_different() {
    let fake = FakeRegistrar::new().with_domain("example.com", true);
    let manager = DomainManager::new(fake.client());
    let id = "example.com".to_string();
    let desired = DomainSpec::new("example.com").with_autorenew(false);

    let state = manager.update(&id, &desired).await.unwrap();

    assert_eq!(
        fake.writes(),
        vec![Call::UpdateDomain(
            "example.com".into(),
            DomainUpdate { autorenew: false }
        )]
    );
    assert!(!state.into_present().unwrap().autorenew);

    fake.clear_calls();
    manager.update(&id, &desired).await.unwrap();
    assert!(fake.writes().is_empty(), "Converged domain needs no update");
}

#[tokio::test]
async fn create_only_reads() {
    let fake = FakeRegistrar::new().with_domain("example.com", true);
    let manager = DomainManager::new(fake.client());

    let state = manager
        .create(&DomainSpec::new("example.com").with_autorenew(false))
        .await
        .unwrap();

    assert!(fake.writes().is_empty());
    assert!(state.into_present().unwrap().autorenew);
}

#[tokio::test]
async fn create_of_unregistered_domain_reports_absent() {
    let fake = FakeRegistrar::new();
    let manager = DomainManager::new(fake.client());

    let state = manager.create(&DomainSpec::new("example.com")).await.unwrap();

    assert!(state.is_absent());
    assert_eq!(fake.calls(), vec![Call::GetDomain("example.com".into())]);
}

#[tokio::test]
async fn rename_is_rejected() {
    let fake = FakeRegistrar::new().with_domain("example.com", true);
    let manager = DomainManager::new(fake.client());

    let err = manager
        .update(&"example.com".to_string(), &DomainSpec::new("example.org"))
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn import_reads_by_name() {
    let fake = FakeRegistrar::new().with_domain("example.com", false);
    let manager = DomainManager::new(fake.client());

    let state = manager.import("example.com").await.unwrap();
    assert!(!state.into_present().unwrap().autorenew);

    assert!(manager.import("not a domain").await.unwrap_err().is_validation());
}
