// # zone.eu Registrar Client
//
// This crate provides the zone.eu implementation of `RegistryClient`.
//
// ## Behavior
//
// - One HTTP request per trait call
// - HTTP Basic auth with the account username and API key on every request
// - `Content-Type: application/json` and `Accept: application/json` on every request
// - Per-call timeout from `ClientConfig::timeout_secs`
// - Status >= 400 is surfaced as `Error::Api` with the raw response body
// - Network failures are surfaced as `Error::Transport`
// - ❌ NO retry logic (a failed pass is recovered by the next reconciliation pass)
// - ❌ NO caching (remote state is read fresh on every pass)
// - ❌ NO dry-run handling (owned by the OperationExecutor)
//
// ## Security Requirements
//
// - API key NEVER appears in logs or `Debug` output
// - Construction fails fast if username or API key is empty
//
// ## API Reference
//
// - Domain: `GET|PUT /domain/{name}`
// - Nameservers: `GET|POST /domain/{name}/nameserver`
// - One nameserver: `GET|PUT|DELETE /domain/{name}/nameserver/{hostname}`
// - DNS zone: `GET|PUT /dns/{name}`

use async_trait::async_trait;
use regsync_core::config::ClientConfig;
use regsync_core::model::{DnsZoneRecord, DomainRecord, DomainUpdate, NameserverRecord};
use regsync_core::traits::RegistryClient;
use regsync_core::{Error, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

const JSON: &str = "application/json";

/// zone.eu registrar client
///
/// # Trust Level: Untrusted
///
/// The client is stateless and single-shot. Deciding which calls to make,
/// in which order, and what to do on failure is owned by the managers.
///
/// # Security
///
/// The Debug implementation does NOT expose the API key.
#[derive(Clone)]
pub struct ZoneClient {
    /// Base API URL without trailing slash
    base_url: String,

    /// Account username
    username: String,

    /// API key
    /// ⚠️ NEVER log this value
    api_key: String,

    /// HTTP client with default headers and timeout applied
    http: reqwest::Client,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for ZoneClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoneClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("api_key", &"<REDACTED>")
            .finish()
    }
}

impl ZoneClient {
    /// Create a client from a validated configuration
    ///
    /// # Errors
    ///
    /// - `Error::Config` if the configuration is incomplete
    /// - `Error::Transport` if the HTTP client cannot be built
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
        headers.insert(ACCEPT, HeaderValue::from_static(JSON));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::transport(format!("Failed to build HTTP client: {}", e)))?;

        tracing::debug!(
            "zone.eu client for {} (timeout {}s)",
            config.api_url,
            config.timeout_secs
        );

        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            api_key: config.api_key.clone(),
            http,
        })
    }

    /// Shorthand for `from_config` wrapped for constructor injection
    pub fn shared(config: &ClientConfig) -> Result<Arc<dyn RegistryClient>> {
        Ok(Arc::new(Self::from_config(config)?))
    }

    /// Base API URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .basic_auth(&self.username, Some(&self.api_key))
    }

    /// Send a request and fail on transport errors or status >= 400
    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::transport(format!("{} failed: {}", what, e)))?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            tracing::debug!("{} returned {}", what, status);
            return Err(Error::api(status.as_u16(), body));
        }

        Ok(response)
    }

    /// GET an endpoint returning an array; an empty body decodes as no records
    async fn get_array<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let what = format!("GET {}", path);
        let response = self.send(self.request(Method::GET, path), &what).await?;
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("{}: failed to read body: {}", what, e)))?;

        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Issue a write; the response body is not used
    async fn write<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<()> {
        let what = format!("{} {}", method, path);
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.body(serde_json::to_vec(body)?);
        }
        self.send(request, &what).await?;
        Ok(())
    }
}

fn domain_path(domain: &str) -> String {
    format!("/domain/{}", domain)
}

fn nameserver_path(domain: &str, hostname: &str) -> String {
    format!("/domain/{}/nameserver/{}", domain, hostname)
}

#[async_trait]
impl RegistryClient for ZoneClient {
    async fn get_domain(&self, domain: &str) -> Result<Vec<DomainRecord>> {
        self.get_array(&domain_path(domain)).await
    }

    async fn update_domain(&self, domain: &str, update: &DomainUpdate) -> Result<()> {
        self.write(Method::PUT, &domain_path(domain), Some(update))
            .await
    }

    async fn list_nameservers(&self, domain: &str) -> Result<Vec<NameserverRecord>> {
        self.get_array(&format!("/domain/{}/nameserver", domain))
            .await
    }

    async fn get_nameserver(&self, domain: &str, hostname: &str) -> Result<Vec<NameserverRecord>> {
        self.get_array(&nameserver_path(domain, hostname)).await
    }

    async fn create_nameservers(&self, domain: &str, nameservers: &[NameserverRecord]) -> Result<()> {
        self.write(
            Method::POST,
            &format!("/domain/{}/nameserver", domain),
            Some(nameservers),
        )
        .await
    }

    async fn update_nameserver(
        &self,
        domain: &str,
        hostname: &str,
        nameserver: &NameserverRecord,
    ) -> Result<()> {
        self.write(Method::PUT, &nameserver_path(domain, hostname), Some(nameserver))
            .await
    }

    async fn delete_nameserver(&self, domain: &str, hostname: &str) -> Result<()> {
        self.write::<()>(Method::DELETE, &nameserver_path(domain, hostname), None)
            .await
    }

    async fn get_dns_zone(&self, domain: &str) -> Result<Vec<DnsZoneRecord>> {
        self.get_array(&format!("/dns/{}", domain)).await
    }

    async fn update_dns_zone(&self, domain: &str, zone: &DnsZoneRecord) -> Result<()> {
        self.write(Method::PUT, &format!("/dns/{}", domain), Some(zone))
            .await
    }

    fn client_name(&self) -> &'static str {
        "zone"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig::new("alice", "secret_key_12345")
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let result = ZoneClient::from_config(&ClientConfig::new("", "key"));
        assert!(result.is_err());

        let result = ZoneClient::from_config(&ClientConfig::new("alice", ""));
        assert!(result.is_err());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client =
            ZoneClient::from_config(&config().with_api_url("http://localhost:8080/v2/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/v2");
    }

    #[test]
    fn test_default_endpoint() {
        let client = ZoneClient::from_config(&config()).unwrap();
        assert_eq!(client.base_url(), "https://api.zone.eu/v2");
        assert_eq!(client.client_name(), "zone");
    }

    #[test]
    fn test_api_key_not_exposed_in_debug() {
        let client = ZoneClient::from_config(&config()).unwrap();

        let debug_str = format!("{:?}", client);
        assert!(!debug_str.contains("secret_key_12345"));
        assert!(debug_str.contains("<REDACTED>"));
        assert!(debug_str.contains("ZoneClient"));
    }

    #[test]
    fn test_paths() {
        assert_eq!(domain_path("example.com"), "/domain/example.com");
        assert_eq!(
            nameserver_path("example.com", "ns1.example.com"),
            "/domain/example.com/nameserver/ns1.example.com"
        );
    }
}
