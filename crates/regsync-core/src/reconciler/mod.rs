//! Reconciler: desired state + observed state → plan
//!
//! Every function here is pure: no I/O, deterministic given its inputs.
//! Each resource kind has its own policy:
//!
//! | Kind | Policy |
//! |------|--------|
//! | Domain | partial update, `autorenew` only |
//! | Nameserver set | full replace (default) or set diff |
//! | Single nameserver | create / update glue / replace on hostname change |
//! | DNSSEC | whole-state replacement in one update |
//!
//! ## Full-replace availability gap
//!
//! The default nameserver policy deletes every current nameserver before
//! creating the desired set, including nameservers that appear in both.
//! While the plan executes the domain has **zero nameservers**; if the
//! create call fails the domain stays that way until the next pass.
//! `NameserverPolicy::SetDiff` avoids the window at the cost of diverging
//! from the registrar-native replace semantics.

pub mod plan;

pub use plan::{Operation, OperationKind, Plan, Target};

use crate::error::Error;
use crate::model::{
    DnsZoneRecord, DnssecKey, DnssecSpec, DomainRecord, DomainSpec, DomainUpdate,
    NameserverRecord, NameserverSetSpec, NameserverSpec,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// How a nameserver set is converged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameserverPolicy {
    /// Delete every current nameserver, then create the whole desired list
    #[default]
    FullReplace,
    /// Create missing hostnames, update changed glue, delete extra hostnames
    SetDiff,
}

impl fmt::Display for NameserverPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameserverPolicy::FullReplace => f.write_str("full-replace"),
            NameserverPolicy::SetDiff => f.write_str("set-diff"),
        }
    }
}

impl FromStr for NameserverPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full-replace" => Ok(NameserverPolicy::FullReplace),
            "set-diff" => Ok(NameserverPolicy::SetDiff),
            other => Err(Error::config(format!(
                "Unknown nameserver policy '{}'. Valid: full-replace, set-diff",
                other
            ))),
        }
    }
}

/// Plans operations for each resource kind
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    nameserver_policy: NameserverPolicy,
}

impl Reconciler {
    /// Create a reconciler with the given nameserver policy
    pub fn new(nameserver_policy: NameserverPolicy) -> Self {
        Self { nameserver_policy }
    }

    /// Active nameserver policy
    pub fn nameserver_policy(&self) -> NameserverPolicy {
        self.nameserver_policy
    }

    /// Domain: at most one update, carrying only `autorenew`
    pub fn plan_domain(&self, desired: &DomainSpec, current: &DomainRecord) -> Plan {
        let mut plan = Plan::new();
        if desired.autorenew != current.autorenew {
            plan.push(Operation::UpdateDomain {
                domain: desired.name.clone(),
                update: DomainUpdate {
                    autorenew: desired.autorenew,
                },
            });
        }
        plan
    }

    /// Nameserver set, according to the configured policy
    pub fn plan_nameserver_set(
        &self,
        desired: &NameserverSetSpec,
        current: &[NameserverRecord],
    ) -> Plan {
        match self.nameserver_policy {
            NameserverPolicy::FullReplace => full_replace(desired, current),
            NameserverPolicy::SetDiff => set_diff(desired, current),
        }
    }

    /// Removal of a whole nameserver set: one delete per current nameserver
    pub fn plan_nameserver_removal(&self, domain: &str, current: &[NameserverRecord]) -> Plan {
        current
            .iter()
            .map(|ns| Operation::DeleteNameserver {
                domain: domain.to_string(),
                hostname: ns.hostname.clone(),
            })
            .collect::<Vec<_>>()
            .into()
    }

    /// Single nameserver
    ///
    /// `current` is the record found under the tracked identity. A different
    /// hostname there means the identity changed and the record is replaced.
    pub fn plan_nameserver(
        &self,
        desired: &NameserverSpec,
        current: Option<&NameserverRecord>,
    ) -> Plan {
        let wanted = &desired.nameserver;
        let create = || Operation::CreateNameservers {
            domain: desired.domain.clone(),
            nameservers: vec![wanted.clone()],
        };

        match current {
            None => vec![create()].into(),
            // Delete and create count separately in the execution report
            Some(existing) if !existing.hostname.eq_ignore_ascii_case(&wanted.hostname) => vec![
                Operation::DeleteNameserver {
                    domain: desired.domain.clone(),
                    hostname: existing.hostname.clone(),
                },
                create(),
            ]
            .into(),
            Some(existing) if !existing.same_glue(wanted) => vec![Operation::UpdateNameserver {
                domain: desired.domain.clone(),
                nameserver: wanted.clone(),
            }]
            .into(),
            Some(_) => Plan::new(),
        }
    }

    /// DNSSEC: a single whole-state update, or nothing when already converged
    ///
    /// With `enabled = false` the update carries an empty key set whatever
    /// keys were declared.
    pub fn plan_dnssec(&self, desired: &DnssecSpec, current: Option<&DnsZoneRecord>) -> Plan {
        let mut plan = Plan::new();
        if current.is_some_and(|zone| dnssec_converged(desired, zone)) {
            return plan;
        }
        plan.push(Operation::UpdateDnsZone {
            domain: desired.domain.clone(),
            zone: desired.to_zone_record(),
        });
        plan
    }
}

/// Every current nameserver is deleted, overlap or not, then the full
/// desired list is created in one call.
fn full_replace(desired: &NameserverSetSpec, current: &[NameserverRecord]) -> Plan {
    let mut plan = Plan::new();
    for ns in current {
        plan.push(Operation::DeleteNameserver {
            domain: desired.domain.clone(),
            hostname: ns.hostname.clone(),
        });
    }
    plan.push(Operation::CreateNameservers {
        domain: desired.domain.clone(),
        nameservers: desired.nameservers.clone(),
    });
    plan
}

fn set_diff(desired: &NameserverSetSpec, current: &[NameserverRecord]) -> Plan {
    let current_by_host: HashMap<String, &NameserverRecord> = current
        .iter()
        .map(|ns| (ns.hostname.to_ascii_lowercase(), ns))
        .collect();
    let desired_hosts: HashSet<String> = desired
        .nameservers
        .iter()
        .map(|ns| ns.hostname.to_ascii_lowercase())
        .collect();

    let mut plan = Plan::new();

    // Additions first so the set never drops to zero.
    let missing: Vec<NameserverRecord> = desired
        .nameservers
        .iter()
        .filter(|ns| !current_by_host.contains_key(&ns.hostname.to_ascii_lowercase()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        plan.push(Operation::CreateNameservers {
            domain: desired.domain.clone(),
            nameservers: missing,
        });
    }

    for ns in &desired.nameservers {
        let changed = current_by_host
            .get(&ns.hostname.to_ascii_lowercase())
            .is_some_and(|existing| !existing.same_glue(ns));
        if changed {
            plan.push(Operation::UpdateNameserver {
                domain: desired.domain.clone(),
                nameserver: ns.clone(),
            });
        }
    }

    for ns in current {
        if !desired_hosts.contains(&ns.hostname.to_ascii_lowercase()) {
            plan.push(Operation::DeleteNameserver {
                domain: desired.domain.clone(),
                hostname: ns.hostname.clone(),
            });
        }
    }

    plan
}

fn dnssec_converged(desired: &DnssecSpec, current: &DnsZoneRecord) -> bool {
    if desired.enabled != current.has_dnssec {
        return false;
    }
    if !desired.enabled {
        return true;
    }
    let wanted: HashSet<&DnssecKey> = desired.keys.iter().collect();
    let present: HashSet<&DnssecKey> = current.dnssec_keys.iter().collect();
    wanted == present && current.dnssec_keys.len() == present.len()
}
