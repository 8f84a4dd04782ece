use ldap3_proto::LdapResultCode;
use thiserror::Error;

#[derive(Debug, PartialEq)]
pub struct LdapError {
    pub code: LdapResultCode,
    pub message: String,
}

impl std::fmt::Display for LdapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for LdapError {}

pub type LdapResult<T> = std::result::Result<T, LdapError>;

/// Why a search was not (fully) answered.
///
/// The first four variants are refusals of the request shape, the last two are
/// faults on our side or upstream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchRejection {
    #[error("Bad base DN: {requested:?}")]
    PolicyMismatch { expected: String, requested: String },
    #[error("BaseObject searches are not implemented")]
    UnsupportedScope,
    #[error("This query is way too complex: {filter}")]
    TooComplex { filter: String },
    #[error("Refusing to respond to blank query string: {filter}")]
    BlankQuery { filter: String },
    #[error("Error encountered during processing: {0}")]
    Upstream(String),
    #[error("Error encountered during processing: {0}")]
    Mapping(String),
}

impl SearchRejection {
    pub fn result_code(&self) -> LdapResultCode {
        match self {
            SearchRejection::PolicyMismatch { .. }
            | SearchRejection::UnsupportedScope
            | SearchRejection::TooComplex { .. }
            | SearchRejection::BlankQuery { .. } => LdapResultCode::UnwillingToPerform,
            SearchRejection::Upstream(_) | SearchRejection::Mapping(_) => {
                LdapResultCode::OperationsError
            }
        }
    }

    /// Whether the client asked for something we don't serve, as opposed to
    /// something going wrong while serving it.
    pub fn is_request_error(&self) -> bool {
        self.result_code() == LdapResultCode::UnwillingToPerform
    }
}

impl From<SearchRejection> for LdapError {
    fn from(rejection: SearchRejection) -> Self {
        LdapError {
            code: rejection.result_code(),
            message: rejection.to_string(),
        }
    }
}
