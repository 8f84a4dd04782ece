use clap::{Args, Parser, Subcommand};
use url::Url;

/// contacts_ldap exposes a contact management API as a read-only LDAP directory
#[derive(Debug, Parser, Clone)]
#[clap(version, author)]
pub struct CLIOpts {
    /// Export
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the LDAP server.
    #[clap(name = "run")]
    Run(RunOpts),
    /// Check that the LDAP server is up and answering.
    #[clap(name = "healthcheck")]
    HealthCheck(RunOpts),
}

#[derive(Debug, Args, Clone)]
pub struct GeneralConfigOpts {
    /// Change config file name.
    #[clap(
        short,
        long,
        default_value = "contacts_ldap_config.toml",
        env = "CONTACTS_LDAP_CONFIG_FILE"
    )]
    pub config_file: String,

    /// Set verbose logging.
    #[clap(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct RunOpts {
    #[clap(flatten)]
    pub general_config: GeneralConfigOpts,

    /// Change the address the LDAP server listens on. Default: 0.0.0.0
    #[clap(long, env = "CONTACTS_LDAP_LDAP_HOST")]
    pub ldap_host: Option<String>,

    /// Change ldap port. Default: 3890
    #[clap(long, env = "CONTACTS_LDAP_LDAP_PORT")]
    pub ldap_port: Option<u16>,

    /// Change the base DN served. Default: dc=example,dc=com
    #[clap(long, env = "CONTACTS_LDAP_LDAP_BASE_DN")]
    pub ldap_base_dn: Option<String>,

    /// Base URL of the upstream contact API, e.g. "https://example.highrisehq.com/".
    #[clap(long, env = "CONTACTS_LDAP_UPSTREAM_OPTIONS__URL")]
    pub upstream_url: Option<Url>,

    /// Number of worker threads. Default: 1
    #[clap(long, env = "CONTACTS_LDAP_WORKERS")]
    pub workers: Option<usize>,
}

pub fn init() -> CLIOpts {
    CLIOpts::parse()
}
