use crate::core::error::{LdapError, LdapResult};
use ldap3_proto::LdapResultCode;

fn make_dn_pair<I>(mut iter: I) -> LdapResult<(String, String)>
where
    I: Iterator<Item = String>,
{
    (|| {
        let pair = (
            iter.next()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| "Empty DN element".to_string())?,
            iter.next()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| "Missing DN value".to_string())?,
        );
        if let Some(e) = iter.next() {
            Err(format!(
                r#"Too many elements in distinguished name: "{}", "{}", "{}""#,
                pair.0, pair.1, e
            ))
        } else {
            Ok(pair)
        }
    })()
    .map_err(|e| LdapError {
        code: LdapResultCode::InvalidDNSyntax,
        message: e,
    })
}

pub fn parse_distinguished_name(dn: &str) -> LdapResult<Vec<(String, String)>> {
    dn.split(',')
        .map(|s| make_dn_pair(s.split('=').map(str::trim).map(String::from)))
        .collect()
}

/// The read-only server policy shared by every session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LdapInfo {
    /// The only base DN searches are answered under, as configured.
    pub base_dn_str: String,
}

impl LdapInfo {
    pub fn new(base_dn: &str) -> LdapResult<Self> {
        parse_distinguished_name(base_dn)?;
        Ok(Self {
            base_dn_str: base_dn.to_string(),
        })
    }
}
