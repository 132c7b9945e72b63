//! Typed default configuration.
//!
//! Every key has a value here, so a config file only needs to list what
//! differs (typically host, port and username; the password comes from the
//! environment).

use std::net::SocketAddr;

use virtuoso_triple_store::{DEFAULT_SQL_PORT, TripleStoreManagerConfig};

use super::ConfigRaw;
use crate::logger::{LogFormat, LoggerConfig, TelemetryConfig, TelemetryMetricsConfig};

/// Returns the default [`ConfigRaw`].
pub(crate) fn config() -> ConfigRaw {
    ConfigRaw {
        triple_store: triple_store(),
        logger: LoggerConfig {
            level: "virtuoso_rep=info,virtuoso_triple_store=info".to_string(),
            format: LogFormat::Pretty,
        },
        telemetry: TelemetryConfig {
            metrics: TelemetryMetricsConfig {
                enabled: false,
                bind_address: SocketAddr::from(([127, 0, 0, 1], 9464)),
            },
        },
    }
}

fn triple_store() -> TripleStoreManagerConfig {
    let mut config = TripleStoreManagerConfig::virtuoso("localhost", DEFAULT_SQL_PORT, "dba", "");
    // Secret is never defaulted
    config.password = None;
    config
}
