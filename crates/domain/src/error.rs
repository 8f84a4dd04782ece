use thiserror::Error;

#[allow(clippy::enum_variant_names)]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Upstream error: `{0}`")]
    UpstreamError(String),
    #[error("Internal error: `{0}`")]
    InternalError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
