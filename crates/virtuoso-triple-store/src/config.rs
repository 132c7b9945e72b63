use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::namespaces::PrefixDeclaration;

/// Default Virtuoso SQL (isql/ODBC) port.
pub const DEFAULT_SQL_PORT: u16 = 1111;
/// Default Virtuoso HTTP listener port.
pub const DEFAULT_HTTP_PORT: u16 = 8890;

/// Backend type for the triple store
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TripleStoreBackendType {
    /// Remote Virtuoso server: SPARQL over HTTP, SQL through `isql`
    Virtuoso,
    /// Oxigraph embedded store (in memory, or on disk when a path is set)
    Oxigraph,
}

/// Configuration for the Triple Store Manager
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TripleStoreManagerConfig {
    /// Backend type to use.
    pub backend: TripleStoreBackendType,

    /// Host name or IP of the machine running Virtuoso
    pub host: String,

    /// SQL port used by `isql` (Virtuoso default 1111)
    pub port: u16,

    /// HTTP port serving the SPARQL and Graph Store endpoints (Virtuoso default 8890)
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Username of the certified user
    pub username: Option<String>,

    /// Password of the certified user
    pub password: Option<String>,

    /// Path of the SPARQL endpoint on the HTTP listener
    #[serde(default = "default_sparql_path")]
    pub sparql_path: String,

    /// Path of the Graph Store protocol endpoint on the HTTP listener
    #[serde(default = "default_graph_store_path")]
    pub graph_store_path: String,

    /// `isql` client options (Virtuoso only)
    #[serde(default)]
    pub isql: IsqlConfig,

    /// Oxigraph-specific storage options.
    ///
    /// Ignored for the Virtuoso backend.
    #[serde(default)]
    pub oxigraph: OxigraphStoreConfig,

    /// Maximum number of connection attempts on startup
    pub connect_max_retries: u32,

    /// Delay between connection attempts in milliseconds
    pub connect_retry_frequency_ms: u64,

    /// Timeout configuration for different operation types
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Maximum concurrent backend operations.
    /// The default of 1 keeps one statement in flight per manager.
    #[serde(default = "default_max_concurrent_operations")]
    pub max_concurrent_operations: usize,

    /// PREFIX declarations prepended to SPARQL statements
    #[serde(default = "PrefixDeclaration::defaults")]
    pub prefixes: Vec<PrefixDeclaration>,
}

/// `isql` command-line client options.
///
/// `isql` receives the username and password as command-line arguments, so
/// they show up in the process list while a SQL session runs. Statements are
/// written to its stdin.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct IsqlConfig {
    /// Path or name of the `isql` binary shipped with Virtuoso
    pub binary: PathBuf,

    /// Statements executed at the start of every `isql` session
    pub session_init: Vec<String>,
}

impl Default for IsqlConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("isql"),
            session_init: vec!["log_enable(3,1)".to_string()],
        }
    }
}

/// Oxigraph storage options.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct OxigraphStoreConfig {
    /// Directory of the persistent store. `None` keeps the store in memory.
    pub path: Option<PathBuf>,
}

/// Timeout configuration for different operation types
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TimeoutConfig {
    /// Timeout for SELECT queries in milliseconds
    pub query_ms: u64,

    /// Timeout for SPARQL UPDATE operations in milliseconds
    pub update_ms: u64,

    /// Timeout for SQL statements (bulk loader, checkpoint) in milliseconds
    pub sql_ms: u64,

    /// Timeout for file import/export transfers in milliseconds
    pub transfer_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            query_ms: 60_000,
            update_ms: 120_000,
            sql_ms: 3_600_000,
            transfer_ms: 600_000,
        }
    }
}

impl TimeoutConfig {
    /// Get query timeout as Duration
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_ms)
    }

    /// Get update timeout as Duration
    pub fn update_timeout(&self) -> Duration {
        Duration::from_millis(self.update_ms)
    }

    /// Get SQL timeout as Duration
    pub fn sql_timeout(&self) -> Duration {
        Duration::from_millis(self.sql_ms)
    }

    /// Get transfer timeout as Duration
    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_millis(self.transfer_ms)
    }
}

fn default_http_port() -> u16 {
    DEFAULT_HTTP_PORT
}

fn default_sparql_path() -> String {
    "/sparql-auth".to_string()
}

fn default_graph_store_path() -> String {
    "/sparql-graph-crud-auth".to_string()
}

fn default_max_concurrent_operations() -> usize {
    1
}

impl TripleStoreManagerConfig {
    /// Configuration for a remote Virtuoso server with the four required settings.
    pub fn virtuoso(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            backend: TripleStoreBackendType::Virtuoso,
            host: host.into(),
            port,
            http_port: DEFAULT_HTTP_PORT,
            username: Some(username.into()),
            password: Some(password.into()),
            sparql_path: default_sparql_path(),
            graph_store_path: default_graph_store_path(),
            isql: IsqlConfig::default(),
            oxigraph: OxigraphStoreConfig::default(),
            connect_max_retries: 3,
            connect_retry_frequency_ms: 1_000,
            timeouts: TimeoutConfig::default(),
            max_concurrent_operations: default_max_concurrent_operations(),
            prefixes: PrefixDeclaration::defaults(),
        }
    }

    /// Configuration for an embedded Oxigraph store, persisted under `path` if given.
    pub fn oxigraph(path: Option<PathBuf>) -> Self {
        Self {
            backend: TripleStoreBackendType::Oxigraph,
            host: "localhost".to_string(),
            port: DEFAULT_SQL_PORT,
            http_port: DEFAULT_HTTP_PORT,
            username: None,
            password: None,
            sparql_path: default_sparql_path(),
            graph_store_path: default_graph_store_path(),
            isql: IsqlConfig::default(),
            oxigraph: OxigraphStoreConfig { path },
            connect_max_retries: 1,
            connect_retry_frequency_ms: 10,
            timeouts: TimeoutConfig::default(),
            max_concurrent_operations: default_max_concurrent_operations(),
            prefixes: PrefixDeclaration::defaults(),
        }
    }

    /// Get connect retry frequency as Duration
    pub fn connect_retry_frequency(&self) -> Duration {
        Duration::from_millis(self.connect_retry_frequency_ms)
    }

    /// Base URL of the Virtuoso HTTP listener
    pub fn http_base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.http_port)
    }

    /// Get the SPARQL endpoint URL
    pub fn sparql_endpoint(&self) -> String {
        format!("{}{}", self.http_base_url(), normalize_path(&self.sparql_path))
    }

    /// Get the Graph Store protocol endpoint URL
    pub fn graph_store_endpoint(&self) -> String {
        format!(
            "{}{}",
            self.http_base_url(),
            normalize_path(&self.graph_store_path)
        )
    }

    /// `host:port` address passed to `isql`
    pub fn sql_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_built_from_host_and_ports() {
        let config = TripleStoreManagerConfig::virtuoso("10.0.0.5", 1111, "dba", "dba");

        assert_eq!(config.sql_address(), "10.0.0.5:1111");
        assert_eq!(config.sparql_endpoint(), "http://10.0.0.5:8890/sparql-auth");
        assert_eq!(
            config.graph_store_endpoint(),
            "http://10.0.0.5:8890/sparql-graph-crud-auth"
        );
    }

    #[test]
    fn endpoint_paths_are_normalized() {
        let mut config = TripleStoreManagerConfig::virtuoso("localhost", 1111, "dba", "dba");
        config.sparql_path = "sparql/".to_string();

        assert_eq!(config.sparql_endpoint(), "http://localhost:8890/sparql");
    }
}
