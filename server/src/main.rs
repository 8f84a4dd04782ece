#![forbid(unsafe_code)]
#![forbid(non_ascii_idents)]

mod cli;
mod configuration;
mod healthcheck;
mod ldap_server;
mod logging;

use crate::{
    cli::{Command, RunOpts},
    configuration::Configuration,
};
use actix_server::ServerBuilder;
use anyhow::{Context, Result, bail};
use contacts_ldap_upstream::HighriseClient;
use std::time::Duration;
use tracing::{debug, error, info};

fn set_up_server(config: &Configuration) -> Result<ServerBuilder> {
    info!("Starting contacts_ldap version {}", env!("CARGO_PKG_VERSION"));

    let client = HighriseClient::new(&config.highrise_options())
        .context("while setting up the upstream client")?;
    info!("Forwarding searches to {}", client.search_url());

    ldap_server::build_ldap_server(config, client, ServerBuilder::new())
        .context("while binding the LDAP server")
}

async fn run_server_command(opts: RunOpts) -> Result<()> {
    debug!("CLI: {:#?}", &opts);

    let config = configuration::init(opts)?;
    logging::init(&config)?;

    let server = set_up_server(&config)?.workers(config.workers);

    server.run().await.context("while starting the server")
}

async fn run_healthcheck(opts: RunOpts) -> Result<()> {
    debug!("CLI: {:#?}", &opts);
    let config = configuration::init(opts)?;
    logging::init(&config)?;

    info!("Starting healthchecks");

    use tokio::time::timeout;
    let delay = Duration::from_millis(3000);
    match timeout(
        delay,
        healthcheck::check_ldap(
            &config.healthcheck_options.ldap_host,
            config.ldap_port,
            &config.ldap_base_dn,
        ),
    )
    .await
    {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            error!("Error running the health check: {:#}", e);
            bail!("Healthcheck failed")
        }
        Err(e) => {
            error!("Error running the health check: {:#}", e);
            bail!("Healthcheck failed")
        }
    }
}

#[actix_rt::main]
async fn main() -> Result<()> {
    let cli_opts = cli::init();
    match cli_opts.command {
        Command::Run(opts) => run_server_command(opts).await,
        Command::HealthCheck(opts) => run_healthcheck(opts).await,
    }
}
