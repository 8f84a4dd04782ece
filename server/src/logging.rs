use crate::configuration::Configuration;
use anyhow::Context;
use std::env;
use tracing_subscriber::{
    filter::EnvFilter, fmt::time::ChronoLocal, layer::SubscriberExt, util::SubscriberInitExt,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    /// Session spans rendered as trees, one per LDAP request.
    Forest,
    /// One line per event.
    Raw,
    /// One line per event, timestamped in the local time zone.
    LocalTime,
}

impl LogFormat {
    fn from_switches(is_set: impl Fn(&str) -> bool) -> Self {
        if is_set("CONTACTS_LDAP_LOCAL_TZ_LOG") {
            LogFormat::LocalTime
        } else if is_set("CONTACTS_LDAP_RAW_LOG") {
            LogFormat::Raw
        } else {
            LogFormat::Forest
        }
    }
}

// The codec logs every incomplete frame at trace level and the HTTP stack
// every connection at debug level: both stay at warn unless RUST_LOG says
// otherwise.
fn default_directives(verbose: bool) -> String {
    format!(
        "hyper=warn,reqwest=warn,ldap3_proto=warn,{}",
        if verbose { "debug" } else { "info" }
    )
}

pub fn init(config: &Configuration) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(config.verbose)));
    let registry = tracing_subscriber::registry().with(env_filter);

    match LogFormat::from_switches(|name| env::var_os(name).is_some()) {
        LogFormat::LocalTime => registry
            .with(tracing_subscriber::fmt::layer().with_timer(ChronoLocal::rfc_3339()))
            .try_init(),
        LogFormat::Raw => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Forest => registry
            .with(tracing_forest::ForestLayer::default())
            .try_init(),
    }
    .context("while setting up logging")
}
