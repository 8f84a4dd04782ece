use crate::core::{error::SearchRejection, utils::LdapInfo};
use ldap3_proto::proto::LdapSearchScope;
use tracing::debug;

/// Checks that a search targets the served subtree with a list-style scope.
///
/// Base object searches are refused whatever their base: only the root DSE is
/// answered for those, and that happens before this check. The base DN must
/// then match the configured one exactly, case included.
pub fn validate_search_request(
    requested_base_dn: &str,
    scope: &LdapSearchScope,
    ldap_info: &LdapInfo,
) -> Result<(), SearchRejection> {
    if matches!(scope, LdapSearchScope::Base) {
        return Err(SearchRejection::UnsupportedScope);
    }
    if requested_base_dn != ldap_info.base_dn_str {
        return Err(SearchRejection::PolicyMismatch {
            expected: ldap_info.base_dn_str.clone(),
            requested: requested_base_dn.to_string(),
        });
    }
    debug!(base = requested_base_dn, ?scope, "Search request accepted");
    Ok(())
}
