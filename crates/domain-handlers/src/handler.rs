use async_trait::async_trait;
use contacts_ldap_domain::{error::Result, types::ContactRecord};

/// Read access to the upstream contact directory.
///
/// Implementations must be safe to share between LDAP sessions: each search
/// calls `search_contacts` at most once, and nothing is cached between calls.
#[async_trait]
pub trait ContactLookupHandler: Send + Sync {
    /// Returns the contacts matching the free-text `term`, in the order the
    /// upstream returned them.
    async fn search_contacts(&self, term: &str) -> Result<Vec<ContactRecord>>;
}
