//! Logging and metrics setup for the command-line driver.
//!
//! Log lines go to stderr in pretty or JSON form so that command output on
//! stdout stays machine readable. `RUST_LOG` replaces the configured filter
//! entirely; otherwise `-v` flags raise the store client's level on top of it.

mod config;

use std::io::IsTerminal;

pub(crate) use config::{LogFormat, LoggerConfig, TelemetryConfig, TelemetryMetricsConfig};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const STORE_TARGET: &str = "virtuoso_triple_store";

/// Installs the global subscriber and, if enabled, the Prometheus exporter.
pub(crate) fn initialize(
    logger_config: &LoggerConfig,
    telemetry_config: &TelemetryConfig,
    verbosity: u8,
) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(&logger_config.level, verbosity)));

    let installed = match logger_config.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(std::io::stderr().is_terminal())
                    .with_target(verbosity > 0),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };
    if let Err(error) = installed {
        eprintln!("logging disabled: {error}");
    }

    initialize_metrics(&telemetry_config.metrics);
}

/// Configured directives, with the store client raised to debug (`-v`) or
/// trace (`-vv` and more). Later directives for the same target win.
fn filter_directives(level: &str, verbosity: u8) -> String {
    let store_level = match verbosity {
        0 => return level.to_string(),
        1 => "debug",
        _ => "trace",
    };
    if level.trim().is_empty() {
        format!("{STORE_TARGET}={store_level}")
    } else {
        format!("{level},{STORE_TARGET}={store_level}")
    }
}

fn initialize_metrics(metrics_config: &TelemetryMetricsConfig) {
    if !metrics_config.enabled {
        return;
    }

    let bind_address = metrics_config.bind_address;
    match PrometheusBuilder::new()
        .with_http_listener(bind_address)
        .install()
    {
        Ok(()) => tracing::info!(%bind_address, "Prometheus metrics exporter enabled"),
        Err(error) => tracing::warn!(
            %bind_address,
            error = %error,
            "Failed to initialize Prometheus metrics exporter"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_level_is_kept_without_flags() {
        assert_eq!(
            filter_directives("virtuoso_rep=info,virtuoso_triple_store=info", 0),
            "virtuoso_rep=info,virtuoso_triple_store=info"
        );
    }

    #[test]
    fn verbose_flags_raise_the_store_client() {
        assert_eq!(
            filter_directives("warn", 1),
            "warn,virtuoso_triple_store=debug"
        );
        assert_eq!(
            filter_directives("warn", 3),
            "warn,virtuoso_triple_store=trace"
        );
    }

    #[test]
    fn verbose_flag_with_empty_level() {
        assert_eq!(filter_directives(" ", 2), "virtuoso_triple_store=trace");
    }

    #[test]
    fn raised_directives_parse() {
        assert!(EnvFilter::try_new(filter_directives("virtuoso_rep=info", 2)).is_ok());
    }
}
