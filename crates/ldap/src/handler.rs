use crate::{
    core::{error::LdapError, utils::LdapInfo},
    search::{self, is_root_dse_request, make_search_error, make_search_success, root_dse_response},
};
use contacts_ldap_domain_handlers::handler::ContactLookupHandler;
use ldap3_proto::proto::{
    LdapBindCred, LdapBindRequest, LdapBindResponse, LdapExtendedResponse, LdapOp,
    LdapResult as LdapResultOp, LdapResultCode, LdapSearchRequest,
};
use tracing::{debug, instrument};

fn make_result(code: LdapResultCode, message: String) -> LdapResultOp {
    LdapResultOp {
        code,
        matcheddn: "".to_string(),
        message,
        referral: vec![],
    }
}

pub(crate) fn make_extended_response(code: LdapResultCode, message: String) -> LdapOp {
    LdapOp::ExtendedResponse(LdapExtendedResponse {
        res: make_result(code, message),
        name: None,
        value: None,
    })
}

pub(crate) fn make_bind_response(code: LdapResultCode, message: String) -> LdapOp {
    LdapOp::BindResponse(LdapBindResponse {
        res: make_result(code, message),
        saslcreds: None,
    })
}

const READ_ONLY_MESSAGE: &str = "This directory is read-only";

/// One LDAP session: answers the operations received on a connection.
pub struct LdapHandler<Backend> {
    backend_handler: Backend,
    ldap_info: &'static LdapInfo,
    session_uuid: uuid::Uuid,
}

impl<Backend> LdapHandler<Backend> {
    pub fn session_uuid(&self) -> &uuid::Uuid {
        &self.session_uuid
    }
}

impl<Backend: ContactLookupHandler> LdapHandler<Backend> {
    pub fn new(
        backend_handler: Backend,
        ldap_info: &'static LdapInfo,
        session_uuid: uuid::Uuid,
    ) -> Self {
        Self {
            backend_handler,
            ldap_info,
            session_uuid,
        }
    }

    #[cfg(test)]
    pub fn new_for_tests(backend_handler: Backend, ldap_base_dn: &str) -> Self {
        Self::new(
            backend_handler,
            Box::leak(Box::new(LdapInfo::new(ldap_base_dn).unwrap())),
            uuid::Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap(),
        )
    }

    pub async fn do_search_or_dse(
        &self,
        request: &LdapSearchRequest,
    ) -> Result<Vec<LdapOp>, LdapError> {
        if is_root_dse_request(request) {
            debug!("rootDSE request");
            return Ok(vec![
                root_dse_response(&self.ldap_info.base_dn_str),
                make_search_success(),
            ]);
        }
        search::do_search(&self.backend_handler, self.ldap_info, request).await
    }

    /// Only anonymous binds are accepted: there are no accounts to bind to.
    #[instrument(skip_all, level = "debug", fields(dn = %request.dn))]
    pub fn do_bind(&self, request: &LdapBindRequest) -> LdapOp {
        let anonymous = request.dn.is_empty()
            && matches!(&request.cred, LdapBindCred::Simple(password) if password.is_empty());
        if anonymous {
            debug!("Anonymous bind");
            make_bind_response(LdapResultCode::Success, "".to_string())
        } else {
            debug!("Refusing authenticated bind");
            make_bind_response(
                LdapResultCode::UnwillingToPerform,
                "Only anonymous binds are supported".to_string(),
            )
        }
    }

    pub async fn handle_ldap_message(&mut self, ldap_op: LdapOp) -> Option<Vec<LdapOp>> {
        Some(match ldap_op {
            LdapOp::BindRequest(request) => vec![self.do_bind(&request)],
            LdapOp::SearchRequest(request) => self
                .do_search_or_dse(&request)
                .await
                .unwrap_or_else(|e: LdapError| vec![make_search_error(e.code, e.message)]),
            LdapOp::UnbindRequest => {
                debug!("Unbind request");
                // No need to notify on unbind (per rfc4511)
                return None;
            }
            LdapOp::AddRequest(_) => vec![LdapOp::AddResponse(make_result(
                LdapResultCode::UnwillingToPerform,
                READ_ONLY_MESSAGE.to_string(),
            ))],
            LdapOp::DelRequest(_) => vec![LdapOp::DelResponse(make_result(
                LdapResultCode::UnwillingToPerform,
                READ_ONLY_MESSAGE.to_string(),
            ))],
            LdapOp::ModifyRequest(_) => vec![LdapOp::ModifyResponse(make_result(
                LdapResultCode::UnwillingToPerform,
                READ_ONLY_MESSAGE.to_string(),
            ))],
            LdapOp::ModifyDNRequest(_) => vec![LdapOp::ModifyDNResponse(make_result(
                LdapResultCode::UnwillingToPerform,
                READ_ONLY_MESSAGE.to_string(),
            ))],
            LdapOp::CompareRequest(_) => vec![LdapOp::CompareResult(make_result(
                LdapResultCode::UnwillingToPerform,
                "Compare is not supported".to_string(),
            ))],
            op => vec![make_extended_response(
                LdapResultCode::UnwillingToPerform,
                format!("Unsupported operation: {op:#?}"),
            )],
        })
    }
}
