use crate::core::error::SearchRejection;
use ldap3_proto::proto::{LdapFilter, LdapSubstringFilter};

/// Attributes the address book clients search on. Matched case-insensitively.
const SEARCHABLE_ATTRIBUTES: &[&str] = &["mail", "cn", "givenname", "sn"];

// Address book clients (Thunderbird, macOS Contacts) turn a typed fragment into
//   (|(mail=*XXX*)(cn=*XXX*)(givenName=*XXX*)(sn=*XXX*))
// with the branches possibly in another order. Anything else is refused.

fn describe(filter: Option<&LdapFilter>) -> String {
    match filter {
        Some(filter) => format!("{filter:?}"),
        None => "<no filter>".to_string(),
    }
}

fn first_fragment(substrings: &LdapSubstringFilter) -> Option<&String> {
    substrings
        .initial
        .iter()
        .chain(substrings.any.iter())
        .chain(substrings.final_.iter())
        .find(|fragment| !fragment.is_empty())
}

/// Extracts the free-text search term from an address book filter.
///
/// Only the second branch of the `Or` is inspected: the clients put the same
/// fragment in every branch.
pub fn get_search_term(filter: Option<&LdapFilter>) -> Result<String, SearchRejection> {
    let too_complex = || SearchRejection::TooComplex {
        filter: describe(filter),
    };
    let blank_query = || SearchRejection::BlankQuery {
        filter: describe(filter),
    };
    let branches = match filter {
        Some(LdapFilter::Or(branches)) => branches,
        _ => return Err(too_complex()),
    };
    if branches.len() <= 3 {
        return Err(too_complex());
    }
    let (attribute, substrings) = match &branches[1] {
        LdapFilter::Substring(attribute, substrings) => (attribute, substrings),
        _ => return Err(too_complex()),
    };
    if attribute.is_empty() {
        return Err(blank_query());
    }
    if !SEARCHABLE_ATTRIBUTES
        .iter()
        .any(|a| a.eq_ignore_ascii_case(attribute))
    {
        return Err(too_complex());
    }
    first_fragment(substrings).cloned().ok_or_else(blank_query)
}
