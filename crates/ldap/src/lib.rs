pub(crate) mod core;
pub(crate) mod handler;
pub(crate) mod search;

pub use crate::core::{
    contact::{ALL_CONTACT_ATTRIBUTES, DirectoryEntry, contact_to_entry},
    error::{LdapError, LdapResult, SearchRejection},
    filter::get_search_term,
    guard::validate_search_request,
    utils::LdapInfo,
};
pub use handler::LdapHandler;
