use anyhow::{Context, Result, anyhow, bail, ensure};
use futures_util::SinkExt;
use ldap3_proto::{
    LdapCodec,
    proto::{
        LdapDerefAliases, LdapFilter, LdapMsg, LdapOp, LdapResultCode, LdapSearchRequest,
        LdapSearchResultEntry, LdapSearchScope,
    },
};
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, instrument};

async fn next_op<Responses>(responses: &mut Responses) -> Result<LdapOp>
where
    Responses: tokio_stream::Stream<Item = std::io::Result<LdapMsg>> + Unpin,
{
    use tokio_stream::StreamExt;
    let msg = responses
        .next()
        .await
        .ok_or_else(|| anyhow!("No answer from LDAP server"))?
        .context("Invalid answer from LDAP server")?;
    debug!("Received message: {:?}", &msg);
    Ok(msg.op)
}

/// Reads the root DSE and checks that the server answers for `base_dn`.
async fn check_ldap_endpoint<Stream>(stream: Stream, base_dn: &str) -> Result<()>
where
    Stream: tokio::io::AsyncRead + tokio::io::AsyncWrite,
{
    let (r, w) = tokio::io::split(stream);
    let mut responses = FramedRead::new(r, LdapCodec::default());
    let mut requests = FramedWrite::new(w, LdapCodec::default());

    requests
        .send(LdapMsg {
            msgid: 1,
            op: LdapOp::SearchRequest(LdapSearchRequest {
                base: "".to_string(),
                scope: LdapSearchScope::Base,
                aliases: LdapDerefAliases::Never,
                sizelimit: 0,
                timelimit: 0,
                typesonly: false,
                filter: LdapFilter::Present("objectClass".to_string()),
                attrs: vec!["namingContexts".to_string()],
            }),
            ctrl: vec![],
        })
        .await
        .context("while sending the root DSE request")?;

    let LdapSearchResultEntry { dn, attributes } = match next_op(&mut responses).await? {
        LdapOp::SearchResultEntry(entry) => entry,
        op => bail!("Expected the root DSE, got {:?}", op),
    };
    ensure!(dn.is_empty(), "Root DSE with a DN: {:?}", dn);
    let naming_contexts: Vec<String> = attributes
        .into_iter()
        .filter(|a| a.atype.eq_ignore_ascii_case("namingContexts"))
        .flat_map(|a| a.vals)
        .map(|v| String::from_utf8_lossy(&v).into_owned())
        .collect();
    ensure!(
        naming_contexts == [base_dn],
        "The LDAP server serves {:?} instead of {:?}",
        naming_contexts,
        base_dn
    );
    match next_op(&mut responses).await? {
        LdapOp::SearchResultDone(res) => ensure!(
            res.code == LdapResultCode::Success,
            "Root DSE search failed: {:?}",
            res
        ),
        op => bail!("Expected the end of the root DSE search, got {:?}", op),
    }
    info!("Success");
    requests.close().await?;
    Ok(())
}

#[instrument(level = "info", err)]
pub async fn check_ldap(host: &str, port: u16, base_dn: &str) -> Result<()> {
    check_ldap_endpoint(TcpStream::connect((host, port)).await?, base_dn).await
}
