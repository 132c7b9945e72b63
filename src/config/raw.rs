use serde::{Deserialize, Serialize};
use virtuoso_triple_store::{TripleStoreBackendType, TripleStoreManagerConfig};

use crate::{
    config::ConfigError,
    logger::{LoggerConfig, TelemetryConfig},
};

/// Configuration as read from defaults, files and the environment.
///
/// **Secret handling**: the Virtuoso password should come from the
/// `VIRTUOSO_PASSWORD` environment variable (a `.env` file works too) rather
/// than from a committed config file.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct ConfigRaw {
    pub triple_store: TripleStoreManagerConfig,
    pub logger: LoggerConfig,
    pub telemetry: TelemetryConfig,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub triple_store: TripleStoreManagerConfig,
    pub logger: LoggerConfig,
    pub telemetry: TelemetryConfig,
}

impl ConfigRaw {
    pub(crate) fn resolve(self) -> Result<Config, ConfigError> {
        let triple_store = self.triple_store;

        if triple_store.max_concurrent_operations == 0 {
            return Err(ConfigError::InvalidConfig(
                "triple_store.max_concurrent_operations must be at least 1".to_string(),
            ));
        }

        if triple_store.backend == TripleStoreBackendType::Virtuoso {
            if triple_store.host.trim().is_empty() {
                return Err(ConfigError::InvalidConfig(
                    "triple_store.host must not be empty".to_string(),
                ));
            }
            if triple_store.port == 0 {
                return Err(ConfigError::InvalidConfig(
                    "triple_store.port must not be 0".to_string(),
                ));
            }
            if triple_store.username.as_deref().is_none_or(str::is_empty) {
                return Err(ConfigError::InvalidConfig(
                    "triple_store.username is required for Virtuoso".to_string(),
                ));
            }
            if triple_store.password.is_none() {
                return Err(ConfigError::MissingSecret(
                    "VIRTUOSO_PASSWORD env var or triple_store.password config required"
                        .to_string(),
                ));
            }
        }

        Ok(Config {
            triple_store,
            logger: self.logger,
            telemetry: self.telemetry,
        })
    }
}
