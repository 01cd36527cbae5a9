//! Test doubles and common utilities for contract tests
//!
//! `FakeRegistrar` is an in-memory registrar implementing `RegistryClient`.
//! It records every call in order and can be told to fail calls of a given
//! kind with an API error.

#![allow(dead_code)]

use regsync_core::error::{Error, Result};
use regsync_core::model::{
    DnsZoneRecord, DnssecKey, DomainRecord, DomainUpdate, NameserverRecord,
};
use regsync_core::traits::RegistryClient;
use regsync_core::{EngineConfig, ManagerRegistry};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A call received by the fake registrar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetDomain(String),
    UpdateDomain(String, DomainUpdate),
    ListNameservers(String),
    GetNameserver(String, String),
    CreateNameservers(String, Vec<NameserverRecord>),
    UpdateNameserver(String, NameserverRecord),
    DeleteNameserver(String, String),
    GetDnsZone(String),
    UpdateDnsZone(String, DnsZoneRecord),
}

/// Call category, used to target failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    GetDomain,
    UpdateDomain,
    ListNameservers,
    GetNameserver,
    CreateNameservers,
    UpdateNameserver,
    DeleteNameserver,
    GetDnsZone,
    UpdateDnsZone,
}

impl Call {
    pub fn kind(&self) -> CallKind {
        match self {
            Call::GetDomain(_) => CallKind::GetDomain,
            Call::UpdateDomain(..) => CallKind::UpdateDomain,
            Call::ListNameservers(_) => CallKind::ListNameservers,
            Call::GetNameserver(..) => CallKind::GetNameserver,
            Call::CreateNameservers(..) => CallKind::CreateNameservers,
            Call::UpdateNameserver(..) => CallKind::UpdateNameserver,
            Call::DeleteNameserver(..) => CallKind::DeleteNameserver,
            Call::GetDnsZone(_) => CallKind::GetDnsZone,
            Call::UpdateDnsZone(..) => CallKind::UpdateDnsZone,
        }
    }

    /// Whether the call changes remote state
    pub fn is_write(&self) -> bool {
        matches!(
            self.kind(),
            CallKind::UpdateDomain
                | CallKind::CreateNameservers
                | CallKind::UpdateNameserver
                | CallKind::DeleteNameserver
                | CallKind::UpdateDnsZone
        )
    }
}

#[derive(Debug, Default)]
struct Remote {
    domains: HashMap<String, DomainRecord>,
    nameservers: HashMap<String, Vec<NameserverRecord>>,
    zones: HashMap<String, DnsZoneRecord>,
}

/// In-memory registrar
#[derive(Debug, Clone, Default)]
pub struct FakeRegistrar {
    remote: Arc<Mutex<Remote>>,
    calls: Arc<Mutex<Vec<Call>>>,
    failures: Arc<Mutex<HashMap<CallKind, (u16, String)>>>,
}

impl FakeRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// The same fake, as the trait object managers expect
    pub fn client(&self) -> Arc<dyn RegistryClient> {
        Arc::new(self.clone())
    }

    /// A registry over this fake with the given engine settings
    pub fn registry(&self, config: &EngineConfig) -> ManagerRegistry {
        ManagerRegistry::new(self.client(), config)
    }

    // -- seeding ------------------------------------------------------------

    pub fn with_domain(self, name: &str, autorenew: bool) -> Self {
        self.remote.lock().unwrap().domains.insert(
            name.to_string(),
            DomainRecord {
                name: name.to_string(),
                expires: None,
                autorenew,
                is_renewable: true,
                is_delegated: true,
                status: "active".to_string(),
            },
        );
        self
    }

    pub fn with_nameservers(self, domain: &str, hostnames: &[&str]) -> Self {
        let records = hostnames.iter().map(|h| NameserverRecord::new(*h)).collect();
        self.with_nameserver_records(domain, records)
    }

    pub fn with_nameserver_records(self, domain: &str, records: Vec<NameserverRecord>) -> Self {
        self.remote
            .lock()
            .unwrap()
            .nameservers
            .insert(domain.to_string(), records);
        self
    }

    pub fn with_zone(self, domain: &str, has_dnssec: bool, keys: Vec<DnssecKey>) -> Self {
        self.remote.lock().unwrap().zones.insert(
            domain.to_string(),
            DnsZoneRecord {
                name: domain.to_string(),
                has_dnssec,
                dnssec_keys: keys,
            },
        );
        self
    }

    // -- failure injection --------------------------------------------------

    /// Make every call of `kind` fail with `status` and `body` until cleared
    pub fn fail_on(&self, kind: CallKind, status: u16, body: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(kind, (status, body.to_string()));
    }

    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    // -- inspection ---------------------------------------------------------

    pub fn domain(&self, name: &str) -> Option<DomainRecord> {
        self.remote.lock().unwrap().domains.get(name).cloned()
    }

    pub fn nameservers(&self, domain: &str) -> Vec<NameserverRecord> {
        self.remote
            .lock()
            .unwrap()
            .nameservers
            .get(domain)
            .cloned()
            .unwrap_or_default()
    }

    pub fn hostnames(&self, domain: &str) -> Vec<String> {
        self.nameservers(domain)
            .into_iter()
            .map(|ns| ns.hostname)
            .collect()
    }

    pub fn zone(&self, domain: &str) -> Option<DnsZoneRecord> {
        self.remote.lock().unwrap().zones.get(domain).cloned()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Only the calls that change remote state
    pub fn writes(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_write).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: Call) -> Result<()> {
        let kind = call.kind();
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().get(&kind) {
            Some((status, body)) => Err(Error::api(*status, body.clone())),
            None => Ok(()),
        }
    }
}

fn not_found(what: &str) -> Error {
    Error::api(404, format!(r#"{{"message":"{} not found"}}"#, what))
}

#[async_trait::async_trait]
impl RegistryClient for FakeRegistrar {
    async fn get_domain(&self, domain: &str) -> Result<Vec<DomainRecord>> {
        self.record(Call::GetDomain(domain.to_string()))?;
        Ok(self.domain(domain).into_iter().collect())
    }

    async fn update_domain(&self, domain: &str, update: &DomainUpdate) -> Result<()> {
        self.record(Call::UpdateDomain(domain.to_string(), *update))?;
        let mut remote = self.remote.lock().unwrap();
        let record = remote
            .domains
            .get_mut(domain)
            .ok_or_else(|| not_found("domain"))?;
        record.autorenew = update.autorenew;
        Ok(())
    }

    async fn list_nameservers(&self, domain: &str) -> Result<Vec<NameserverRecord>> {
        self.record(Call::ListNameservers(domain.to_string()))?;
        Ok(self.nameservers(domain))
    }

    async fn get_nameserver(&self, domain: &str, hostname: &str) -> Result<Vec<NameserverRecord>> {
        self.record(Call::GetNameserver(domain.to_string(), hostname.to_string()))?;
        Ok(self
            .nameservers(domain)
            .into_iter()
            .filter(|ns| ns.hostname.eq_ignore_ascii_case(hostname))
            .collect())
    }

    async fn create_nameservers(&self, domain: &str, nameservers: &[NameserverRecord]) -> Result<()> {
        self.record(Call::CreateNameservers(domain.to_string(), nameservers.to_vec()))?;
        let mut remote = self.remote.lock().unwrap();
        let existing = remote.nameservers.entry(domain.to_string()).or_default();
        for ns in nameservers {
            if existing
                .iter()
                .any(|e| e.hostname.eq_ignore_ascii_case(&ns.hostname))
            {
                return Err(Error::api(
                    409,
                    format!(r#"{{"message":"nameserver {} already exists"}}"#, ns.hostname),
                ));
            }
        }
        existing.extend(nameservers.iter().cloned());
        Ok(())
    }

    async fn update_nameserver(
        &self,
        domain: &str,
        hostname: &str,
        nameserver: &NameserverRecord,
    ) -> Result<()> {
        self.record(Call::UpdateNameserver(domain.to_string(), nameserver.clone()))?;
        let mut remote = self.remote.lock().unwrap();
        let existing = remote
            .nameservers
            .get_mut(domain)
            .and_then(|list| {
                list.iter_mut()
                    .find(|ns| ns.hostname.eq_ignore_ascii_case(hostname))
            })
            .ok_or_else(|| not_found("nameserver"))?;
        *existing = nameserver.clone();
        Ok(())
    }

    async fn delete_nameserver(&self, domain: &str, hostname: &str) -> Result<()> {
        self.record(Call::DeleteNameserver(domain.to_string(), hostname.to_string()))?;
        let mut remote = self.remote.lock().unwrap();
        let list = remote
            .nameservers
            .get_mut(domain)
            .ok_or_else(|| not_found("nameserver"))?;
        let before = list.len();
        list.retain(|ns| !ns.hostname.eq_ignore_ascii_case(hostname));
        if list.len() == before {
            return Err(not_found("nameserver"));
        }
        Ok(())
    }

    async fn get_dns_zone(&self, domain: &str) -> Result<Vec<DnsZoneRecord>> {
        self.record(Call::GetDnsZone(domain.to_string()))?;
        Ok(self.zone(domain).into_iter().collect())
    }

    async fn update_dns_zone(&self, domain: &str, zone: &DnsZoneRecord) -> Result<()> {
        self.record(Call::UpdateDnsZone(domain.to_string(), zone.clone()))?;
        self.remote
            .lock()
            .unwrap()
            .zones
            .insert(domain.to_string(), zone.clone());
        Ok(())
    }

    fn client_name(&self) -> &'static str {
        "fake"
    }
}

/// Engine settings for tests
pub fn test_engine_config() -> EngineConfig {
    EngineConfig {
        event_channel_capacity: 100,
        ..EngineConfig::default()
    }
}

pub fn ksk() -> DnssecKey {
    DnssecKey::ksk(13, "AwEAAcKSKtestkeymaterial")
}

pub fn zsk() -> DnssecKey {
    DnssecKey::zsk(13, "AwEAAcZSKtestkeymaterial")
}
