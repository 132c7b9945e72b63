use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use super::{Config, ConfigRaw, defaults};
use crate::config::ConfigError;

/// Environment variables read as `triple_store` overrides, e.g. `VIRTUOSO_HOST`.
const ENV_PREFIX: &str = "VIRTUOSO_";
const ENV_KEYS: [&str; 4] = ["host", "port", "http_port", "backend"];
const USERNAME_ENV: &str = "VIRTUOSO_USERNAME";
const PASSWORD_ENV: &str = "VIRTUOSO_PASSWORD";

/// Loads the layered configuration.
///
/// Priority, lowest to highest: typed defaults, `./config.toml`, the
/// `--config` file, `VIRTUOSO_*` environment variables.
pub(crate) fn load_configuration(custom_config_path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut raw: ConfigRaw = figment(custom_config_path)?
        .extract()
        .map_err(Box::new)?;
    apply_credentials_from_env(&mut raw);
    raw.resolve()
}

/// Credentials are taken verbatim, so an all-digit password stays a string.
fn apply_credentials_from_env(raw: &mut ConfigRaw) {
    if let Ok(username) = std::env::var(USERNAME_ENV) {
        raw.triple_store.username = Some(username);
    }
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        raw.triple_store.password = Some(password);
    }
}

fn figment(custom_config_path: Option<&Path>) -> Result<Figment, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(defaults::config()));

    // User overrides from config.toml
    if Path::new("config.toml").exists() {
        figment = figment.merge(Toml::file("config.toml"));
    }

    if let Some(config_path) = custom_config_path {
        if !config_path.exists() {
            return Err(ConfigError::MissingConfig(
                config_path.display().to_string(),
            ));
        }
        figment = figment.merge(Toml::file(config_path));
    }

    Ok(figment.merge(Env::prefixed(ENV_PREFIX).filter_map(|key| {
        let key = key.as_str().to_ascii_lowercase();
        ENV_KEYS
            .contains(&key.as_str())
            .then(|| format!("triple_store.{key}").into())
    })))
}
