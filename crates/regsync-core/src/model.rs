//! Shared state and record types
//!
//! Three families of types live here:
//!
//! - **Wire records** (`DomainRecord`, `NameserverRecord`, `DnsZoneRecord`,
//!   `DnssecKey`): the JSON shapes exchanged with the registrar.
//! - **Desired state** (`DomainSpec`, `NameserverSetSpec`, `NameserverSpec`,
//!   `DnssecSpec`): what the operator declared for one resource instance.
//! - **Observed state** (`DomainState`, `NameserverSetState`, `DnssecState`):
//!   the typed view of a fresh read, wrapped in [`ResourceState`].
//!
//! ## Wire schema
//!
//! The DNS zone record uses `name` / `has_dnssec` / `dnssec_keys`, with keys
//! encoded as `{flags, algorithm, public_key}`.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// DNSKEY flags value of a Zone-Signing Key
pub const ZONE_SIGNING_KEY: u16 = 256;

/// DNSKEY flags value of a Key-Signing Key
pub const KEY_SIGNING_KEY: u16 = 257;

/// Resource kinds managed by regsync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// The registered domain itself (autorenew only)
    #[serde(rename = "zone_domain")]
    Domain,
    /// The whole nameserver set of a domain
    #[serde(rename = "zone_domain_nameservers")]
    NameserverSet,
    /// A single nameserver addressed by `(domain, hostname)`
    #[serde(rename = "zone_domain_nameserver")]
    Nameserver,
    /// The DNSSEC configuration of a domain's zone
    #[serde(rename = "zone_domain_dnssec")]
    Dnssec,
}

impl ResourceKind {
    /// Every kind, in registration order
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Domain,
        ResourceKind::NameserverSet,
        ResourceKind::Nameserver,
        ResourceKind::Dnssec,
    ];

    /// The resource-kind identifier used in declarations
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Domain => "zone_domain",
            ResourceKind::NameserverSet => "zone_domain_nameservers",
            ResourceKind::Nameserver => "zone_domain_nameserver",
            ResourceKind::Dnssec => "zone_domain_dnssec",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::UnknownResourceKind(s.to_string()))
    }
}

/// Result of a read: the resource is either gone upstream or present
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState<T> {
    /// The registrar reported no matching record
    Absent,
    /// The registrar reported the resource
    Present(T),
}

impl<T> ResourceState<T> {
    /// Whether the resource is absent upstream
    pub fn is_absent(&self) -> bool {
        matches!(self, ResourceState::Absent)
    }

    /// Borrow the observed state, if present
    pub fn present(&self) -> Option<&T> {
        match self {
            ResourceState::Present(state) => Some(state),
            ResourceState::Absent => None,
        }
    }

    /// Take the observed state, if present
    pub fn into_present(self) -> Option<T> {
        match self {
            ResourceState::Present(state) => Some(state),
            ResourceState::Absent => None,
        }
    }

    /// Map the observed state
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResourceState<U> {
        match self {
            ResourceState::Present(state) => ResourceState::Present(f(state)),
            ResourceState::Absent => ResourceState::Absent,
        }
    }
}

/// Whether observed state already matches the declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Convergence {
    /// Remote state equals desired state; the plan is empty
    Converged,
    /// At least one operation is needed
    Divergent,
}

// ---------------------------------------------------------------------------
// Wire records
// ---------------------------------------------------------------------------

/// Domain record as returned by `GET /domain/{name}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecord {
    /// Domain name
    pub name: String,
    /// Expiry timestamp
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
    /// Whether the registrar renews the domain automatically
    #[serde(default)]
    pub autorenew: bool,
    /// Whether the domain can currently be renewed
    #[serde(default)]
    pub is_renewable: bool,
    /// Whether the domain is delegated
    #[serde(default)]
    pub is_delegated: bool,
    /// Registrar status string
    #[serde(default)]
    pub status: String,
}

/// Body of `PUT /domain/{name}`; autorenew is the only settable field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainUpdate {
    /// New autorenew value
    pub autorenew: bool,
}

/// A nameserver entry with optional glue addresses
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameserverRecord {
    /// Nameserver hostname, unique within a domain
    pub hostname: String,
    /// IPv4 glue address
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub ipv4: Option<String>,
    /// IPv6 glue address
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub ipv6: Option<String>,
}

impl NameserverRecord {
    /// Create a nameserver record without glue
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ipv4: None,
            ipv6: None,
        }
    }

    /// Set the IPv4 glue address
    pub fn with_ipv4(mut self, ipv4: impl Into<String>) -> Self {
        self.ipv4 = Some(ipv4.into());
        self
    }

    /// Set the IPv6 glue address
    pub fn with_ipv6(mut self, ipv6: impl Into<String>) -> Self {
        self.ipv6 = Some(ipv6.into());
        self
    }

    /// Validate hostname and glue address syntax
    pub fn validate(&self) -> Result<()> {
        validate_domain_name(&self.hostname)?;

        if let Some(ref ipv4) = self.ipv4 {
            ipv4.parse::<Ipv4Addr>().map_err(|_| {
                Error::validation(format!(
                    "Invalid IPv4 glue address '{}' for nameserver {}",
                    ipv4, self.hostname
                ))
            })?;
        }

        if let Some(ref ipv6) = self.ipv6 {
            ipv6.parse::<Ipv6Addr>().map_err(|_| {
                Error::validation(format!(
                    "Invalid IPv6 glue address '{}' for nameserver {}",
                    ipv6, self.hostname
                ))
            })?;
        }

        Ok(())
    }

    /// Whether the glue addresses match, ignoring the hostname
    pub fn same_glue(&self, other: &NameserverRecord) -> bool {
        self.ipv4 == other.ipv4 && self.ipv6 == other.ipv6
    }
}

/// A DNSSEC public key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DnssecKey {
    /// DNSKEY flags: 256 (ZSK) or 257 (KSK)
    pub flags: u16,
    /// DNSSEC algorithm number
    pub algorithm: u8,
    /// Base64 public key material, treated as opaque
    pub public_key: String,
}

impl DnssecKey {
    /// Create a key from its raw tuple
    pub fn new(flags: u16, algorithm: u8, public_key: impl Into<String>) -> Self {
        Self {
            flags,
            algorithm,
            public_key: public_key.into(),
        }
    }

    /// Create a Key-Signing Key
    pub fn ksk(algorithm: u8, public_key: impl Into<String>) -> Self {
        Self::new(KEY_SIGNING_KEY, algorithm, public_key)
    }

    /// Create a Zone-Signing Key
    pub fn zsk(algorithm: u8, public_key: impl Into<String>) -> Self {
        Self::new(ZONE_SIGNING_KEY, algorithm, public_key)
    }

    /// Reject flags outside the KSK/ZSK codes and empty key material
    pub fn validate(&self) -> Result<()> {
        if self.flags != ZONE_SIGNING_KEY && self.flags != KEY_SIGNING_KEY {
            return Err(Error::validation(format!(
                "DNSSEC key flags must be {} (ZSK) or {} (KSK), got {}",
                ZONE_SIGNING_KEY, KEY_SIGNING_KEY, self.flags
            )));
        }

        if self.public_key.trim().is_empty() {
            return Err(Error::validation("DNSSEC public key cannot be empty"));
        }

        Ok(())
    }
}

/// DNS zone record as exchanged with `GET/PUT /dns/{name}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsZoneRecord {
    /// Zone name (the domain)
    pub name: String,
    /// Whether DNSSEC signing is enabled
    #[serde(default)]
    pub has_dnssec: bool,
    /// Published keys; always serialized, empty when disabled
    #[serde(default, deserialize_with = "null_as_empty")]
    pub dnssec_keys: Vec<DnssecKey>,
}

// ---------------------------------------------------------------------------
// Desired state
// ---------------------------------------------------------------------------

/// Declared state of a domain resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainSpec {
    /// Domain name; immutable for the lifetime of the resource
    pub name: String,
    /// Whether the domain should renew automatically
    #[serde(default = "default_autorenew")]
    pub autorenew: bool,
}

impl DomainSpec {
    /// Create a declaration with autorenew enabled
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            autorenew: default_autorenew(),
        }
    }

    /// Set the autorenew flag
    pub fn with_autorenew(mut self, autorenew: bool) -> Self {
        self.autorenew = autorenew;
        self
    }

    /// Validate the declaration
    pub fn validate(&self) -> Result<()> {
        validate_domain_name(&self.name)
    }
}

fn default_autorenew() -> bool {
    true
}

/// Declared nameserver set of a domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameserverSetSpec {
    /// Domain the set belongs to
    pub domain: String,
    /// Nameservers that should be present, in order
    pub nameservers: Vec<NameserverRecord>,
}

impl NameserverSetSpec {
    /// Create a declaration from bare hostnames
    pub fn from_hostnames<I, S>(domain: impl Into<String>, hostnames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domain: domain.into(),
            nameservers: hostnames.into_iter().map(NameserverRecord::new).collect(),
        }
    }

    /// Validate the declaration
    ///
    /// The set must be non-empty and hostnames must be unique (case-insensitive).
    pub fn validate(&self) -> Result<()> {
        validate_domain_name(&self.domain)?;

        if self.nameservers.is_empty() {
            return Err(Error::validation(format!(
                "Nameserver set for {} must contain at least one nameserver",
                self.domain
            )));
        }

        let mut seen = HashSet::new();
        for nameserver in &self.nameservers {
            nameserver.validate()?;
            if !seen.insert(nameserver.hostname.to_ascii_lowercase()) {
                return Err(Error::validation(format!(
                    "Duplicate nameserver hostname {} for {}",
                    nameserver.hostname, self.domain
                )));
            }
        }

        Ok(())
    }

    /// Declared hostnames, in order
    pub fn hostnames(&self) -> Vec<&str> {
        self.nameservers.iter().map(|ns| ns.hostname.as_str()).collect()
    }
}

/// Declared single nameserver, addressed by `(domain, hostname)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameserverSpec {
    /// Domain the nameserver belongs to
    pub domain: String,
    /// The nameserver and its glue
    #[serde(flatten)]
    pub nameserver: NameserverRecord,
}

impl NameserverSpec {
    /// Create a declaration
    pub fn new(domain: impl Into<String>, nameserver: NameserverRecord) -> Self {
        Self {
            domain: domain.into(),
            nameserver,
        }
    }

    /// Identity of this nameserver
    pub fn id(&self) -> NameserverId {
        NameserverId::new(&self.domain, &self.nameserver.hostname)
    }

    /// Validate the declaration
    pub fn validate(&self) -> Result<()> {
        validate_domain_name(&self.domain)?;
        self.nameserver.validate()
    }
}

/// Identity of a single nameserver: `"{domain}/{hostname}"`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameserverId {
    /// Domain name
    pub domain: String,
    /// Nameserver hostname
    pub hostname: String,
}

impl NameserverId {
    /// Create an identity
    pub fn new(domain: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            hostname: hostname.into(),
        }
    }

    /// Parse a `domain/hostname` identifier
    pub fn parse(id: &str) -> Result<Self> {
        match id.split_once('/') {
            Some((domain, hostname)) if !domain.is_empty() && !hostname.is_empty() => {
                Ok(Self::new(domain, hostname))
            }
            _ => Err(Error::validation(format!(
                "Nameserver identifier must look like 'domain/hostname', got '{}'",
                id
            ))),
        }
    }
}

impl fmt::Display for NameserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.domain, self.hostname)
    }
}

/// Declared DNSSEC configuration of a domain's zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnssecSpec {
    /// Domain whose zone is signed
    pub domain: String,
    /// Whether DNSSEC should be enabled
    pub enabled: bool,
    /// Keys to publish while enabled
    #[serde(default)]
    pub keys: Vec<DnssecKey>,
}

impl DnssecSpec {
    /// Declaration with DNSSEC enabled and the given keys
    pub fn enabled(domain: impl Into<String>, keys: Vec<DnssecKey>) -> Self {
        Self {
            domain: domain.into(),
            enabled: true,
            keys,
        }
    }

    /// Declaration with DNSSEC disabled and no keys
    pub fn disabled(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            enabled: false,
            keys: Vec::new(),
        }
    }

    /// Validate flags and key uniqueness
    pub fn validate(&self) -> Result<()> {
        validate_domain_name(&self.domain)?;

        let mut seen = HashSet::new();
        for key in &self.keys {
            key.validate()?;
            if !seen.insert(key) {
                return Err(Error::validation(format!(
                    "Duplicate DNSSEC key (flags={}, algorithm={}) for {}",
                    key.flags, key.algorithm, self.domain
                )));
            }
        }

        Ok(())
    }

    /// Keys that go on the wire: the declared set when enabled, nothing otherwise
    pub fn effective_keys(&self) -> &[DnssecKey] {
        if self.enabled { self.keys.as_slice() } else { &[] }
    }

    /// Build the whole-state zone record sent to the registrar
    pub fn to_zone_record(&self) -> DnsZoneRecord {
        DnsZoneRecord {
            name: self.domain.clone(),
            has_dnssec: self.enabled,
            dnssec_keys: self.effective_keys().to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// Observed state
// ---------------------------------------------------------------------------

/// Observed state of a domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainState {
    /// Domain name
    pub name: String,
    /// Autorenew flag as held by the registrar
    pub autorenew: bool,
    /// Expiry timestamp (read-only)
    pub expires: Option<DateTime<Utc>>,
    /// Registrar status (read-only)
    pub status: String,
    /// Whether the domain can currently be renewed (read-only)
    pub is_renewable: bool,
    /// Whether the domain is delegated (read-only)
    pub is_delegated: bool,
}

impl From<DomainRecord> for DomainState {
    fn from(record: DomainRecord) -> Self {
        Self {
            name: record.name,
            autorenew: record.autorenew,
            expires: record.expires,
            status: record.status,
            is_renewable: record.is_renewable,
            is_delegated: record.is_delegated,
        }
    }
}

/// Observed nameserver set of a domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameserverSetState {
    /// Domain name
    pub domain: String,
    /// Nameservers as listed by the registrar
    pub nameservers: Vec<NameserverRecord>,
}

impl NameserverSetState {
    /// Observed hostnames, in registrar order
    pub fn hostnames(&self) -> Vec<&str> {
        self.nameservers.iter().map(|ns| ns.hostname.as_str()).collect()
    }
}

/// Observed DNSSEC configuration of a zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnssecState {
    /// Domain name
    pub domain: String,
    /// Whether signing is enabled
    pub enabled: bool,
    /// Published keys; empty while disabled
    pub keys: Vec<DnssecKey>,
}

impl From<DnsZoneRecord> for DnssecState {
    fn from(zone: DnsZoneRecord) -> Self {
        let keys = if zone.has_dnssec {
            zone.dnssec_keys
        } else {
            Vec::new()
        };

        Self {
            domain: zone.name,
            enabled: zone.has_dnssec,
            keys,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Validate that a string is a valid domain name
///
/// This implements basic DNS domain name validation per RFC 1035.
/// A single trailing dot is accepted.
pub fn validate_domain_name(domain: &str) -> Result<()> {
    let domain = domain.strip_suffix('.').unwrap_or(domain);

    if domain.is_empty() {
        return Err(Error::validation("Domain name cannot be empty"));
    }

    // Total length limit (RFC 1035: 253 chars max)
    if domain.len() > 253 {
        return Err(Error::validation(format!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        )));
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(Error::validation(format!(
                "Domain name has empty label: '{}'",
                domain
            )));
        }

        if label.len() > 63 {
            return Err(Error::validation(format!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(Error::validation(format!(
                "Domain label contains invalid characters. Label: '{}'. \
                Valid: ASCII letters, digits and hyphen (use punycode for IDNs).",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(Error::validation(format!(
                "Domain label cannot start or end with hyphen. Label: '{}'",
                label
            )));
        }
    }

    Ok(())
}

/// The registrar reports missing glue as `""`
fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<DnssecKey>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Vec<DnssecKey>> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_kind_identifiers_round_trip() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.as_str().parse::<ResourceKind>().unwrap(), kind);
        }
        assert!(matches!(
            "zone_record".parse::<ResourceKind>(),
            Err(Error::UnknownResourceKind(_))
        ));
    }

    #[test]
    fn nameserver_glue_empty_strings_decode_as_none() {
        let record: NameserverRecord =
            serde_json::from_str(r#"{"hostname":"ns1.example.com","ipv4":"","ipv6":""}"#).unwrap();
        assert_eq!(record, NameserverRecord::new("ns1.example.com"));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"hostname": "ns1.example.com"}));
    }

    #[test]
    fn nameserver_rejects_bad_glue() {
        let record = NameserverRecord::new("ns1.example.com").with_ipv4("300.1.1.1");
        assert!(record.validate().unwrap_err().is_validation());

        let record = NameserverRecord::new("ns1.example.com").with_ipv6("192.0.2.1");
        assert!(record.validate().is_err());

        let record = NameserverRecord::new("ns1.example.com")
            .with_ipv4("192.0.2.1")
            .with_ipv6("2001:db8::1");
        assert!(record.validate().is_ok());
    }

    #[test]
    fn nameserver_set_rejects_duplicate_hostnames() {
        let spec = NameserverSetSpec::from_hostnames(
            "example.com",
            ["ns1.example.com", "NS1.example.com"],
        );
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate nameserver"));
    }

    #[test]
    fn nameserver_set_rejects_empty_list() {
        let spec = NameserverSetSpec::from_hostnames("example.com", Vec::<String>::new());
        assert!(spec.validate().is_err());
    }

    #[test]
    fn dnssec_flags_outside_ksk_zsk_are_rejected() {
        let spec = DnssecSpec::enabled("example.com", vec![DnssecKey::new(255, 13, "AwEAAa")]);
        let err = spec.validate().unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("255"));
    }

    #[test]
    fn dnssec_duplicate_keys_are_rejected() {
        let key = DnssecKey::ksk(13, "AwEAAa");
        let spec = DnssecSpec::enabled("example.com", vec![key.clone(), key]);
        assert!(spec.validate().unwrap_err().is_validation());
    }

    #[test]
    fn dnssec_same_material_with_different_flags_is_allowed() {
        let spec = DnssecSpec::enabled(
            "example.com",
            vec![DnssecKey::ksk(13, "AwEAAa"), DnssecKey::zsk(13, "AwEAAa")],
        );
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn disabled_zone_record_carries_no_keys() {
        let spec = DnssecSpec {
            domain: "example.com".to_string(),
            enabled: false,
            keys: vec![DnssecKey::ksk(13, "AwEAAa")],
        };
        let zone = spec.to_zone_record();
        assert!(!zone.has_dnssec);
        assert!(zone.dnssec_keys.is_empty());

        let json = serde_json::to_value(&zone).unwrap();
        assert_eq!(json["dnssec_keys"], serde_json::json!([]));
    }

    #[test]
    fn zone_record_decodes_null_keys() {
        let zone: DnsZoneRecord =
            serde_json::from_str(r#"{"name":"example.com","has_dnssec":false,"dnssec_keys":null}"#)
                .unwrap();
        assert!(zone.dnssec_keys.is_empty());
    }

    #[test]
    fn domain_record_decodes_expiry() {
        let record: DomainRecord = serde_json::from_str(
            r#"{"name":"example.com","expires":"2027-03-01T00:00:00Z","autorenew":true,"status":"active"}"#,
        )
        .unwrap();
        let state = DomainState::from(record);
        assert!(state.autorenew);
        assert_eq!(state.status, "active");
        assert_eq!(state.expires.unwrap().to_rfc3339(), "2027-03-01T00:00:00+00:00");
    }

    #[test]
    fn nameserver_id_parses_import_form() {
        let id = NameserverId::parse("example.com/ns1.example.com").unwrap();
        assert_eq!(id.domain, "example.com");
        assert_eq!(id.hostname, "ns1.example.com");
        assert_eq!(id.to_string(), "example.com/ns1.example.com");

        assert!(NameserverId::parse("example.com").is_err());
        assert!(NameserverId::parse("/ns1.example.com").is_err());
    }

    #[test]
    fn validate_domain_name_rules() {
        assert!(validate_domain_name("example.com").is_ok());
        assert!(validate_domain_name("example.com.").is_ok());
        assert!(validate_domain_name("").is_err());
        assert!(validate_domain_name("exa mple.com").is_err());
        assert!(validate_domain_name("-bad.example.com").is_err());
        assert!(validate_domain_name("a..b").is_err());
    }

    #[test]
    fn idn_must_be_given_in_punycode() {
        assert!(validate_domain_name("bücher.example").is_err());
        assert!(validate_domain_name("ns1.bücher.example").is_err());
        assert!(validate_domain_name("xn--bcher-kva.example").is_ok());
    }
}
