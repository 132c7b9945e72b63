mod isql;
mod oxigraph_backend;
mod virtuoso;

use std::time::Duration;

use async_trait::async_trait;
pub use isql::IsqlClient;
pub use oxigraph_backend::OxigraphBackend;
pub use virtuoso::VirtuosoBackend;

use crate::{error::Result, rdf::RdfFormat};

/// Trait for triple store backends
///
/// Implementations provide the low-level statement execution against a
/// specific connectivity surface. Statement text arrives fully built; the
/// backend only transports it.
#[async_trait]
pub trait TripleStoreBackend: Send + Sync {
    /// Backend name for logging/debugging
    fn name(&self) -> &'static str;

    /// Health check - verify the triple store is reachable and accepts the credentials
    async fn health_check(&self) -> Result<bool>;

    /// Whether [`execute_sql`](Self::execute_sql) is available
    fn supports_sql(&self) -> bool;

    /// Execute a SPARQL UPDATE
    async fn update(&self, query: &str, timeout: Duration) -> Result<()>;

    /// Execute a SPARQL SELECT
    ///
    /// Returns SPARQL results JSON as a string
    async fn select(&self, query: &str, timeout: Duration) -> Result<String>;

    /// Execute a store-specific SQL statement or procedure call
    async fn execute_sql(&self, statement: &str, timeout: Duration) -> Result<()>;

    /// Parse `data` as `format` and add its triples to `graph`
    async fn load_document(
        &self,
        data: Vec<u8>,
        format: RdfFormat,
        graph: &str,
        timeout: Duration,
    ) -> Result<()>;

    /// Serialize the contents of `graph` as `format`
    async fn export_graph(&self, graph: &str, format: RdfFormat, timeout: Duration)
    -> Result<Vec<u8>>;

    /// Release connections and handles
    async fn close(&self) -> Result<()>;
}
