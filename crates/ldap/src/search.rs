use crate::core::{
    contact::make_ldap_search_contact_result_entry,
    error::{LdapError, LdapResult, SearchRejection},
    filter::get_search_term,
    guard::validate_search_request,
    utils::LdapInfo,
};
use contacts_ldap_domain_handlers::handler::ContactLookupHandler;
use ldap3_proto::{
    LdapFilter, LdapPartialAttribute, LdapResultCode, LdapSearchResultEntry, LdapSearchScope,
    proto::{LdapDerefAliases, LdapOp, LdapResult as LdapResultOp, LdapSearchRequest},
};
use tracing::{debug, error, info, instrument};

pub(crate) fn make_search_request<S: Into<String>>(
    base: &str,
    filter: LdapFilter,
    attrs: Vec<S>,
) -> LdapSearchRequest {
    LdapSearchRequest {
        base: base.to_string(),
        scope: LdapSearchScope::Subtree,
        aliases: LdapDerefAliases::Never,
        sizelimit: 0,
        timelimit: 0,
        typesonly: false,
        filter,
        attrs: attrs.into_iter().map(Into::into).collect(),
    }
}

pub(crate) fn make_search_success() -> LdapOp {
    make_search_error(LdapResultCode::Success, "".to_string())
}

pub(crate) fn make_search_error(code: LdapResultCode, message: String) -> LdapOp {
    LdapOp::SearchResultDone(LdapResultOp {
        code,
        matcheddn: "".to_string(),
        message,
        referral: vec![],
    })
}

pub(crate) fn root_dse_response(base_dn: &str) -> LdapOp {
    LdapOp::SearchResultEntry(LdapSearchResultEntry {
        dn: "".to_string(),
        attributes: vec![
            LdapPartialAttribute {
                atype: "objectClass".to_string(),
                vals: vec![b"top".to_vec()],
            },
            LdapPartialAttribute {
                atype: "vendorName".to_string(),
                vals: vec![b"contacts_ldap".to_vec()],
            },
            LdapPartialAttribute {
                atype: "vendorVersion".to_string(),
                vals: vec![
                    concat!("contacts_ldap_", env!("CARGO_PKG_VERSION"))
                        .to_string()
                        .into_bytes(),
                ],
            },
            LdapPartialAttribute {
                atype: "supportedLDAPVersion".to_string(),
                vals: vec![b"3".to_vec()],
            },
            LdapPartialAttribute {
                atype: "defaultNamingContext".to_string(),
                vals: vec![base_dn.to_string().into_bytes()],
            },
            LdapPartialAttribute {
                atype: "namingContexts".to_string(),
                vals: vec![base_dn.to_string().into_bytes()],
            },
        ],
    })
}

pub(crate) fn is_root_dse_request(request: &LdapSearchRequest) -> bool {
    if request.base.is_empty() && request.scope == LdapSearchScope::Base {
        if let LdapFilter::Present(attribute) = &request.filter {
            if attribute.eq_ignore_ascii_case("objectclass") {
                return true;
            }
        }
    }
    false
}

fn log_rejection(rejection: SearchRejection) -> LdapError {
    match &rejection {
        SearchRejection::PolicyMismatch {
            expected,
            requested,
        } => info!(
            r#"Denying request with mismatched base DN (wanted "{}", but got "{}")"#,
            expected, requested
        ),
        r if r.is_request_error() => info!("Denying request: {}", r),
        r => error!("{}", r),
    }
    rejection.into()
}

/// Answers one address book search.
///
/// The request goes through the base DN/scope check and the filter
/// translation, the extracted term is looked up upstream, and every contact
/// found becomes one entry, in upstream order. A contact that can't be turned
/// into an entry is skipped; the remaining ones are still sent and the search
/// then ends with an operations error instead of a success.
#[instrument(skip_all, level = "debug", fields(base = %request.base))]
pub async fn do_search(
    backend_handler: &impl ContactLookupHandler,
    ldap_info: &LdapInfo,
    request: &LdapSearchRequest,
) -> LdapResult<Vec<LdapOp>> {
    info!("Received search request");
    debug!(filter = ?request.filter);
    validate_search_request(&request.base, &request.scope, ldap_info).map_err(log_rejection)?;
    let term = get_search_term(Some(&request.filter)).map_err(log_rejection)?;
    // Every contact attribute is returned, whatever the client asked for.
    if !request.attrs.is_empty() && !request.attrs.iter().any(|a| a == "*") {
        debug!(attrs = ?request.attrs, "Ignoring the requested attribute list");
    }

    debug!("Searching for {:?} upstream", &term);
    let contacts = backend_handler
        .search_contacts(&term)
        .await
        .map_err(|e| {
            log_rejection(SearchRejection::Upstream(format!(
                "while searching for {term:?}: {e}"
            )))
        })?;
    info!(
        r#"Returning {} records matching "{}""#,
        contacts.len(),
        &term
    );

    let mut results = Vec::with_capacity(contacts.len() + 1);
    let mut first_failure = None;
    for contact in &contacts {
        match make_ldap_search_contact_result_entry(contact, ldap_info) {
            Ok(entry) => {
                debug!(dn = %entry.dn, "Sending entry");
                results.push(LdapOp::SearchResultEntry(entry));
            }
            Err(e) => {
                error!("Error converting contact {} to an entry: {}", contact.id, e);
                first_failure.get_or_insert(e);
            }
        }
    }
    results.push(match first_failure {
        None => make_search_success(),
        Some(rejection) => {
            let LdapError { code, message } = rejection.into();
            make_search_error(code, message)
        }
    });
    Ok(results)
}
