//! Reconciliation plans
//!
//! A [`Plan`] is an ordered list of [`Operation`]s. It is built by the
//! reconciler, consumed by the executor within the same lifecycle
//! invocation, and never persisted.

use crate::model::{Convergence, DnsZoneRecord, DomainUpdate, NameserverId, NameserverRecord};
use serde_json::Value;
use std::fmt;

/// Operation category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Adds something that does not exist remotely
    Create,
    /// Changes something in place
    Update,
    /// Removes something remotely
    Delete,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Sub-resource an operation acts on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// The domain record
    Domain(String),
    /// The nameserver collection of a domain
    NameserverSet(String),
    /// One nameserver of a domain
    Nameserver(NameserverId),
    /// The DNS zone of a domain
    DnsZone(String),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Domain(domain) => write!(f, "domain {}", domain),
            Target::NameserverSet(domain) => write!(f, "nameservers of {}", domain),
            Target::Nameserver(id) => write!(f, "nameserver {}", id),
            Target::DnsZone(domain) => write!(f, "dns zone {}", domain),
        }
    }
}

/// A single remote operation with its payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// `PUT /domain/{name}`
    UpdateDomain {
        /// Domain name
        domain: String,
        /// Partial update body
        update: DomainUpdate,
    },
    /// `POST /domain/{name}/nameserver`
    CreateNameservers {
        /// Domain name
        domain: String,
        /// Records to create, in declared order
        nameservers: Vec<NameserverRecord>,
    },
    /// `PUT /domain/{name}/nameserver/{hostname}`
    UpdateNameserver {
        /// Domain name
        domain: String,
        /// Record carrying the new glue; its hostname addresses the target
        nameserver: NameserverRecord,
    },
    /// `DELETE /domain/{name}/nameserver/{hostname}`
    DeleteNameserver {
        /// Domain name
        domain: String,
        /// Hostname to remove
        hostname: String,
    },
    /// `PUT /dns/{name}` with the whole zone record
    UpdateDnsZone {
        /// Domain name
        domain: String,
        /// Complete desired zone record
        zone: DnsZoneRecord,
    },
}

impl Operation {
    /// Operation category
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::CreateNameservers { .. } => OperationKind::Create,
            Operation::UpdateDomain { .. }
            | Operation::UpdateNameserver { .. }
            | Operation::UpdateDnsZone { .. } => OperationKind::Update,
            Operation::DeleteNameserver { .. } => OperationKind::Delete,
        }
    }

    /// Sub-resource this operation acts on
    pub fn target(&self) -> Target {
        match self {
            Operation::UpdateDomain { domain, .. } => Target::Domain(domain.clone()),
            Operation::CreateNameservers { domain, .. } => Target::NameserverSet(domain.clone()),
            Operation::UpdateNameserver { domain, nameserver } => {
                Target::Nameserver(NameserverId::new(domain, &nameserver.hostname))
            }
            Operation::DeleteNameserver { domain, hostname } => {
                Target::Nameserver(NameserverId::new(domain, hostname))
            }
            Operation::UpdateDnsZone { domain, .. } => Target::DnsZone(domain.clone()),
        }
    }

    /// JSON body that goes on the wire, if any
    pub fn payload(&self) -> serde_json::Result<Option<Value>> {
        let value = match self {
            Operation::UpdateDomain { update, .. } => serde_json::to_value(update)?,
            Operation::CreateNameservers { nameservers, .. } => serde_json::to_value(nameservers)?,
            Operation::UpdateNameserver { nameserver, .. } => serde_json::to_value(nameserver)?,
            Operation::UpdateDnsZone { zone, .. } => serde_json::to_value(zone)?,
            Operation::DeleteNameserver { .. } => return Ok(None),
        };
        Ok(Some(value))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::CreateNameservers { nameservers, .. } => {
                let hostnames: Vec<&str> =
                    nameservers.iter().map(|ns| ns.hostname.as_str()).collect();
                write!(f, "{} {} [{}]", self.kind(), self.target(), hostnames.join(", "))
            }
            _ => write!(f, "{} {}", self.kind(), self.target()),
        }
    }
}

/// Ordered sequence of operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    operations: Vec<Operation>,
}

impl Plan {
    /// Create an empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation
    pub fn push(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    /// Operations in execution order
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of operations
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the plan is a no-op
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Iterate operations in execution order
    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }

    /// Number of operations of the given kind
    pub fn count(&self, kind: OperationKind) -> usize {
        self.operations.iter().filter(|op| op.kind() == kind).count()
    }

    /// `Converged` when there is nothing to do
    ///
    /// Under `NameserverPolicy::FullReplace` a nameserver set plan is never
    /// empty, so a set that already matches still reports `Divergent`.
    pub fn convergence(&self) -> Convergence {
        if self.is_empty() {
            Convergence::Converged
        } else {
            Convergence::Divergent
        }
    }
}

impl From<Vec<Operation>> for Plan {
    fn from(operations: Vec<Operation>) -> Self {
        Self { operations }
    }
}

impl IntoIterator for Plan {
    type Item = Operation;
    type IntoIter = std::vec::IntoIter<Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operations.is_empty() {
            return f.write_str("no changes");
        }
        for (i, op) in self.operations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", op)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_display_names_kind_and_target() {
        let op = Operation::DeleteNameserver {
            domain: "example.com".to_string(),
            hostname: "ns0.example.com".to_string(),
        };
        assert_eq!(op.to_string(), "delete nameserver example.com/ns0.example.com");
        assert_eq!(op.payload().unwrap(), None);

        let op = Operation::CreateNameservers {
            domain: "example.com".to_string(),
            nameservers: vec![
                NameserverRecord::new("ns1.example.com"),
                NameserverRecord::new("ns2.example.com"),
            ],
        };
        assert_eq!(
            op.to_string(),
            "create nameservers of example.com [ns1.example.com, ns2.example.com]"
        );
    }

    #[test]
    fn delete_has_no_payload() {
        let op = Operation::DeleteNameserver {
            domain: "example.com".to_string(),
            hostname: "ns-old.example.com".to_string(),
        };
        assert_eq!(op.kind(), OperationKind::Delete);
        assert_eq!(op.payload().unwrap(), None);
        assert_eq!(op.to_string(), "delete nameserver example.com/ns-old.example.com");
    }

    #[test]
    fn empty_plan_displays_no_changes() {
        assert_eq!(Plan::new().to_string(), "no changes");
        assert_eq!(Plan::new().convergence(), Convergence::Converged);
    }
}
