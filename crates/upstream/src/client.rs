use crate::model::PersonDto;
use async_trait::async_trait;
use contacts_ldap_domain::{
    error::{DomainError, Result},
    types::ContactRecord,
};
use contacts_ldap_domain_handlers::handler::ContactLookupHandler;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Connection settings for the upstream contact directory.
#[derive(Clone, derive_more::Debug)]
pub struct HighriseOptions {
    /// Base URL of the account, e.g. "https://example.highrisehq.com/".
    pub base_url: Url,
    /// API token, sent as the basic-auth user name.
    #[debug(skip)]
    pub token: Option<String>,
    pub timeout: Duration,
}

/// Searches people through the upstream's `/people/search.json` endpoint.
#[derive(Clone, derive_more::Debug)]
pub struct HighriseClient {
    client: reqwest::Client,
    search_url: Url,
    #[debug(skip)]
    token: Option<String>,
}

fn append_to_url(base_url: &Url, path: &str) -> Result<Url> {
    let mut new_url = base_url.clone();
    new_url
        .path_segments_mut()
        .map_err(|_| {
            DomainError::InternalError(format!("Cannot use {base_url} as a base URL"))
        })?
        .pop_if_empty()
        .extend(path.split('/'));
    Ok(new_url)
}

fn upstream_error(context: &str, e: impl std::fmt::Display) -> DomainError {
    DomainError::UpstreamError(format!("{context}: {e:#}"))
}

impl HighriseClient {
    pub fn new(options: &HighriseOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| DomainError::InternalError(format!("{e:#}")))?;
        Ok(Self {
            client,
            search_url: append_to_url(&options.base_url, "people/search.json")?,
            token: options.token.clone().filter(|t| !t.is_empty()),
        })
    }

    pub fn search_url(&self) -> &Url {
        &self.search_url
    }
}

#[async_trait]
impl ContactLookupHandler for HighriseClient {
    #[instrument(skip(self), level = "debug", err)]
    async fn search_contacts(&self, term: &str) -> Result<Vec<ContactRecord>> {
        let mut request = self
            .client
            .get(self.search_url.clone())
            .query(&[("term", term)]);
        if let Some(token) = &self.token {
            // The token is the user name, the password is ignored.
            request = request.basic_auth(token, Some("X"));
        }
        let response = request
            .send()
            .await
            .map_err(|e| upstream_error("while sending the search request", e))?
            .error_for_status()
            .map_err(|e| upstream_error("error from the upstream response", e))?;
        let body = response
            .text()
            .await
            .map_err(|e| upstream_error("while reading the upstream response", e))?;
        let people: Vec<serde_json::Value> = serde_json::from_str(&body)
            .map_err(|e| upstream_error("while parsing the upstream response", e))?;
        debug!("Upstream returned {} people", people.len());
        let mut contacts = Vec::with_capacity(people.len());
        for person in people {
            match PersonDto::deserialize(person) {
                Ok(person) => contacts.push(ContactRecord::from(person)),
                Err(e) => warn!("Skipping unreadable person in the upstream response: {e}"),
            }
        }
        Ok(contacts)
    }
}
