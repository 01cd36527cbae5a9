// # Registry Client Trait
//
// Defines the interface to the registrar's REST API.
//
// ## Implementations
//
// - zone.eu: `regsync-client-zone` crate
// - Tests: in-memory fake registrar (`tests/common`)
//
// ## Usage
//
// ```rust,ignore
// use regsync_core::RegistryClient;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let client = /* RegistryClient implementation */;
//
//     let nameservers = client.list_nameservers("example.com").await?;
//     for ns in nameservers {
//         println!("{}", ns.hostname);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::model::{DnsZoneRecord, DomainRecord, DomainUpdate, NameserverRecord};

/// Trait for registrar client implementations
///
/// One method per registrar endpoint. Read methods return the decoded
/// array exactly as the registrar sent it; callers treat an empty array as
/// "absent" and otherwise use the first element.
///
/// # Trust Level: Untrusted
///
/// Clients are **untrusted** components with strict limitations:
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to the registrar endpoint only
/// - ✅ Attach authentication to every request
/// - ✅ Decode responses, or surface status >= 400 with the raw body
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off (failures are recovered by the next reconciliation pass)
/// - ❌ Cache responses (remote state is read fresh on every pass)
/// - ❌ Decide which operations are needed (owned by the reconciler)
/// - ❌ Spawn tasks or threads
///
/// Every method issues exactly one request.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// `GET /domain/{name}`
    async fn get_domain(&self, domain: &str) -> Result<Vec<DomainRecord>, crate::Error>;

    /// `PUT /domain/{name}` with `{autorenew}`
    async fn update_domain(&self, domain: &str, update: &DomainUpdate) -> Result<(), crate::Error>;

    /// `GET /domain/{name}/nameserver`
    async fn list_nameservers(&self, domain: &str)
    -> Result<Vec<NameserverRecord>, crate::Error>;

    /// `GET /domain/{name}/nameserver/{hostname}`
    async fn get_nameserver(
        &self,
        domain: &str,
        hostname: &str,
    ) -> Result<Vec<NameserverRecord>, crate::Error>;

    /// `POST /domain/{name}/nameserver` with an array body
    async fn create_nameservers(
        &self,
        domain: &str,
        nameservers: &[NameserverRecord],
    ) -> Result<(), crate::Error>;

    /// `PUT /domain/{name}/nameserver/{hostname}`
    async fn update_nameserver(
        &self,
        domain: &str,
        hostname: &str,
        nameserver: &NameserverRecord,
    ) -> Result<(), crate::Error>;

    /// `DELETE /domain/{name}/nameserver/{hostname}`
    async fn delete_nameserver(&self, domain: &str, hostname: &str) -> Result<(), crate::Error>;

    /// `GET /dns/{name}`
    async fn get_dns_zone(&self, domain: &str) -> Result<Vec<DnsZoneRecord>, crate::Error>;

    /// `PUT /dns/{name}`: whole-state replacement of the zone's DNSSEC settings
    async fn update_dns_zone(&self, domain: &str, zone: &DnsZoneRecord)
    -> Result<(), crate::Error>;

    /// Get the client name (for logging/debugging)
    fn client_name(&self) -> &'static str;
}

impl std::fmt::Debug for dyn RegistryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RegistryClient({})", self.client_name())
    }
}
