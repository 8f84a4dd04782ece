use crate::cli::{GeneralConfigOpts, RunOpts};
use anyhow::{Context, Result};
use contacts_ldap_upstream::HighriseOptions;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use figment_file_provider_adapter::FileAdapter;
use secstr::SecUtf8;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, time::Duration};
use url::Url;

const ENV_PREFIX: &str = "CONTACTS_LDAP_";

#[derive(Clone, Deserialize, Serialize, derive_more::Debug)]
#[debug(r#""{_0}""#)]
pub struct HttpUrl(pub Url);

#[derive(Clone, derive_more::Debug, Deserialize, Serialize, derive_builder::Builder)]
#[builder(pattern = "owned")]
pub struct UpstreamOptions {
    #[builder(default = r#"HttpUrl(Url::parse("http://localhost").unwrap())"#)]
    pub url: HttpUrl,
    #[builder(default)]
    pub token: Option<SecUtf8>,
    #[builder(default = "10")]
    pub timeout_secs: u64,
}

impl std::default::Default for UpstreamOptions {
    fn default() -> Self {
        UpstreamOptionsBuilder::default().build().unwrap()
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, derive_builder::Builder)]
#[builder(pattern = "owned")]
pub struct HealthcheckOptions {
    #[builder(default = r#"String::from("localhost")"#)]
    pub ldap_host: String,
}

impl std::default::Default for HealthcheckOptions {
    fn default() -> Self {
        HealthcheckOptionsBuilder::default().build().unwrap()
    }
}

#[derive(Clone, Deserialize, Serialize, derive_builder::Builder, derive_more::Debug)]
#[builder(pattern = "owned")]
pub struct Configuration {
    #[builder(default = r#"String::from("0.0.0.0")"#)]
    pub ldap_host: String,
    #[builder(default = "3890")]
    pub ldap_port: u16,
    #[builder(default = r#"String::from("dc=example,dc=com")"#)]
    pub ldap_base_dn: String,
    #[builder(default)]
    pub upstream_options: UpstreamOptions,
    #[builder(default)]
    pub healthcheck_options: HealthcheckOptions,
    #[builder(default = "1")]
    pub workers: usize,
    #[builder(default = "false")]
    pub verbose: bool,
}

impl std::default::Default for Configuration {
    fn default() -> Self {
        ConfigurationBuilder::default().build().unwrap()
    }
}

impl Configuration {
    pub fn highrise_options(&self) -> HighriseOptions {
        HighriseOptions {
            base_url: self.upstream_options.url.0.clone(),
            token: self
                .upstream_options
                .token
                .as_ref()
                .map(|t| t.unsecure().to_string()),
            timeout: Duration::from_secs(self.upstream_options.timeout_secs),
        }
    }
}

pub trait ConfigOverrider {
    fn override_config(&self, config: &mut Configuration);
}

pub trait TopLevelCommandOpts {
    fn general_config(&self) -> &GeneralConfigOpts;
}

impl TopLevelCommandOpts for RunOpts {
    fn general_config(&self) -> &GeneralConfigOpts {
        &self.general_config
    }
}

impl ConfigOverrider for RunOpts {
    fn override_config(&self, config: &mut Configuration) {
        self.general_config.override_config(config);

        if let Some(host) = self.ldap_host.as_ref() {
            config.ldap_host.clone_from(host);
        }

        if let Some(port) = self.ldap_port {
            config.ldap_port = port;
        }

        if let Some(base_dn) = self.ldap_base_dn.as_ref() {
            config.ldap_base_dn.clone_from(base_dn);
        }

        if let Some(url) = self.upstream_url.as_ref() {
            config.upstream_options.url = HttpUrl(url.clone());
        }

        if let Some(workers) = self.workers {
            config.workers = workers;
        }
    }
}

impl ConfigOverrider for GeneralConfigOpts {
    fn override_config(&self, config: &mut Configuration) {
        if self.verbose {
            config.verbose = true;
        }
    }
}

fn extract_keys(dict: &figment::value::Dict) -> HashSet<String> {
    use figment::value::{Dict, Value};
    fn process_value(value: &Dict, keys: &mut HashSet<String>, path: &mut Vec<String>) {
        for (key, value) in value {
            match value {
                Value::Dict(_, dict) => {
                    path.push(format!("{}__", key.to_ascii_uppercase()));
                    process_value(dict, keys, path);
                    path.pop();
                }
                _ => {
                    keys.insert(format!(
                        "{}{}{}",
                        ENV_PREFIX,
                        path.join(""),
                        key.to_ascii_uppercase()
                    ));
                }
            }
        }
    }
    let mut keys = HashSet::new();
    let mut path = Vec::new();
    process_value(dict, &mut keys, &mut path);
    keys
}

fn expected_keys(dict: &figment::value::Dict) -> HashSet<String> {
    let mut keys = extract_keys(dict);
    // CLI-only values.
    keys.insert(format!("{ENV_PREFIX}CONFIG_FILE"));
    // Optional values, absent from the serialized defaults.
    keys.insert(format!("{ENV_PREFIX}UPSTREAM_OPTIONS__TOKEN"));
    // Logging switches, read directly from the environment.
    keys.insert(format!("{ENV_PREFIX}RAW_LOG"));
    keys.insert(format!("{ENV_PREFIX}LOCAL_TZ_LOG"));
    keys
}

fn env_variable_provider() -> impl figment::Provider {
    FileAdapter::wrap(Env::prefixed(ENV_PREFIX).split("__")).ignore(&["config_file"])
}

pub fn init<C>(overrides: C) -> Result<Configuration>
where
    C: TopLevelCommandOpts + ConfigOverrider,
{
    println!(
        "Loading configuration from {}",
        &overrides.general_config().config_file
    );

    let figment_config = Figment::from(Serialized::defaults(Configuration::default()))
        .merge(
            FileAdapter::wrap(Toml::file(&overrides.general_config().config_file))
                .ignore(&["config_file"]),
        )
        .merge(env_variable_provider());
    let mut config: Configuration = figment_config
        .extract()
        .context("while parsing the configuration")?;

    overrides.override_config(&mut config);
    if config.verbose {
        println!("Configuration: {:#?}", &config);
    }
    {
        use figment::{Profile, Provider};
        let expected_keys = expected_keys(
            &Figment::from(Serialized::defaults(Configuration::default()))
                .data()
                .context("while listing the configuration keys")?[&Profile::default()],
        );
        if let Some(env_values) = env_variable_provider()
            .data()
            .context("while reading the environment")?
            .get(&Profile::default())
        {
            extract_keys(env_values)
                .iter()
                .filter(|k| !expected_keys.contains(k.as_str()))
                .for_each(|k| {
                    eprintln!("WARNING: Unknown environment variable: {}", k);
                });
        }
    }
    if config.upstream_options.token.is_none() {
        println!("WARNING: No upstream API token configured, searches will be unauthenticated.");
    }
    Ok(config)
}
