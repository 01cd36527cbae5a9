//! Resource managers, one per resource kind
//!
//! Each manager owns the read → plan → execute → read-back lifecycle of its
//! kind. Managers are stateless: the registrar client is injected at
//! construction and every hook reads remote state fresh.
//!
//! - [`DomainManager`]: `zone_domain`
//! - [`NameserverSetManager`]: `zone_domain_nameservers`
//! - [`NameserverManager`]: `zone_domain_nameserver`
//! - [`DnssecManager`]: `zone_domain_dnssec`

pub mod dnssec;
pub mod domain;
pub mod nameservers;

pub use dnssec::DnssecManager;
pub use domain::DomainManager;
pub use nameservers::{NameserverManager, NameserverSetManager};

use crate::error::{Error, Result};

/// Reads return arrays; the first element is the record, an empty array means absent
fn first<T>(records: Vec<T>) -> Option<T> {
    records.into_iter().next()
}

/// The domain of a tracked instance cannot change in place
fn ensure_same_domain(tracked: &str, declared: &str) -> Result<()> {
    let tracked = tracked.trim_end_matches('.');
    let declared = declared.trim_end_matches('.');
    if tracked.eq_ignore_ascii_case(declared) {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "Domain name is immutable: tracked '{}', declared '{}'. \
            Delete the resource and create it again under the new name.",
            tracked, declared
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_takes_head_of_array() {
        assert_eq!(first(vec![1, 2]), Some(1));
        assert_eq!(first(Vec::<u8>::new()), None);
    }

    #[test]
    fn domain_rename_is_rejected() {
        assert!(ensure_same_domain("example.com", "EXAMPLE.com.").is_ok());
        let err = ensure_same_domain("example.com", "example.org").unwrap_err();
        assert!(err.is_validation());
    }
}
