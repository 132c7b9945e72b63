mod backend;
mod bulk_load;
mod config;
pub mod error;
mod graph;
mod metrics;
mod namespaces;
mod query;
mod rdf;
mod schema;
pub mod sparql;
mod transfer;

use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

pub use backend::{IsqlClient, OxigraphBackend, TripleStoreBackend, VirtuosoBackend};
pub use config::{
    DEFAULT_HTTP_PORT, DEFAULT_SQL_PORT, IsqlConfig, OxigraphStoreConfig, TimeoutConfig,
    TripleStoreBackendType, TripleStoreManagerConfig,
};
use error::{Result, TripleStoreError};
pub use namespaces::{Namespaces, PrefixDeclaration};
pub use query::vocab;
pub use rdf::{ObjectKind, RdfFormat, RdfTriple, parse_iri};
pub use sparql::{QuerySolution, QuerySolutions, RdfTerm};
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};

#[cfg(test)]
mod tests;

/// Triple Store Manager
///
/// Single client over one triple store connection. Builds SPARQL and SQL
/// statements for the common graph operations and hands them to the
/// configured backend.
pub struct TripleStoreManager {
    pub(crate) backend: Box<dyn TripleStoreBackend>,
    pub(crate) config: TripleStoreManagerConfig,
    namespaces: Namespaces,
    /// Semaphore for limiting concurrent operations
    concurrency_limiter: Arc<Semaphore>,
    /// Held for the whole statement sequence of a bulk import
    pub(crate) bulk_load_lock: Mutex<()>,
    closed: AtomicBool,
}

impl TripleStoreManager {
    /// Create a new Triple Store Manager
    ///
    /// Creates the backend selected by `config.backend` and waits until the
    /// store answers a health check.
    pub async fn connect(config: &TripleStoreManagerConfig) -> Result<Self> {
        let backend: Box<dyn TripleStoreBackend> = match config.backend {
            TripleStoreBackendType::Virtuoso => Box::new(VirtuosoBackend::new(config.clone())?),
            TripleStoreBackendType::Oxigraph => match &config.oxigraph.path {
                Some(path) => {
                    tokio::fs::create_dir_all(path).await?;
                    Box::new(OxigraphBackend::open(path)?)
                }
                None => Box::new(OxigraphBackend::in_memory()?),
            },
        };

        let manager = Self::with_backend(backend, config.clone());
        manager.connect_with_retry().await?;

        Ok(manager)
    }

    fn with_backend(backend: Box<dyn TripleStoreBackend>, config: TripleStoreManagerConfig) -> Self {
        let max_concurrent = effective_concurrency(config.max_concurrent_operations);
        if max_concurrent != config.max_concurrent_operations {
            tracing::warn!(
                configured = config.max_concurrent_operations,
                effective = max_concurrent,
                "Triple store max_concurrent_operations out of range; clamped"
            );
        }
        tracing::debug!(
            backend = %backend.name(),
            max_concurrent = max_concurrent,
            "Triple store concurrency limiter initialized"
        );

        Self {
            backend,
            namespaces: Namespaces::new(&config.prefixes),
            concurrency_limiter: Arc::new(Semaphore::new(max_concurrent)),
            bulk_load_lock: Mutex::new(()),
            closed: AtomicBool::new(false),
            config,
        }
    }

    /// Connect to triple store with retry logic
    ///
    /// Rejected credentials are not retried.
    async fn connect_with_retry(&self) -> Result<()> {
        let max_attempts = self.config.connect_max_retries.max(1);
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.backend.health_check().await {
                Ok(true) => {
                    tracing::info!(
                        backend = %self.backend.name(),
                        host = %self.config.host,
                        port = self.config.port,
                        "Connected to triple store"
                    );
                    return Ok(());
                }
                Ok(false) => {
                    tracing::warn!(
                        backend = %self.backend.name(),
                        attempt = attempts,
                        "Triple store health check returned false"
                    );
                }
                Err(e @ TripleStoreError::Authentication { .. }) => {
                    tracing::error!(
                        backend = %self.backend.name(),
                        error = %e,
                        "Triple store rejected the credentials"
                    );
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(
                        backend = %self.backend.name(),
                        attempt = attempts,
                        error = %e,
                        "Failed to connect to triple store"
                    );
                }
            }

            if attempts >= max_attempts {
                return Err(TripleStoreError::ConnectionFailed { attempts });
            }

            tokio::time::sleep(self.config.connect_retry_frequency()).await;
        }
    }

    /// Name of the active backend (`virtuoso` or `oxigraph`)
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn config(&self) -> &TripleStoreManagerConfig {
        &self.config
    }

    /// Prefix block prepended to SPARQL statements
    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    /// Whether [`terminate`](Self::terminate) has been called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(TripleStoreError::Closed)
        } else {
            Ok(())
        }
    }

    // ========== Statement execution ==========

    /// Execute a SPARQL UPDATE
    ///
    /// The configured prefix block is prepended unless the text already
    /// declares its own prefixes.
    pub async fn execute_update(&self, sparql: &str) -> Result<()> {
        let query = self.namespaces.apply(sparql);
        let started = Instant::now();
        tracing::debug!(query = %query, "Executing SPARQL update");

        self.backend_update(&query, self.config.timeouts.update_timeout())
            .await?;

        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "SPARQL update completed"
        );
        Ok(())
    }

    /// Execute a SPARQL SELECT and return its rows
    pub async fn execute_select(&self, sparql: &str) -> Result<QuerySolutions> {
        let query = self.namespaces.apply(sparql);
        let started = Instant::now();
        tracing::debug!(query = %query, "Executing SPARQL select");

        let body = self
            .backend_select(&query, self.config.timeouts.query_timeout())
            .await?;
        let solutions = sparql::parse_select_results(&body)?;

        tracing::debug!(
            rows = solutions.remaining(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "SPARQL select completed"
        );
        Ok(solutions)
    }

    /// Execute a store-specific SQL statement or procedure call
    pub async fn execute_sql(&self, statement: &str) -> Result<()> {
        let started = Instant::now();
        tracing::debug!(statement = %statement, "Executing SQL statement");

        self.backend_sql(statement, self.config.timeouts.sql_timeout())
            .await?;

        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "SQL statement completed"
        );
        Ok(())
    }

    /// Close the connection
    ///
    /// Waits for in-flight statements, then releases the backend. Calling it
    /// again is a no-op; close failures are logged, not returned.
    pub async fn terminate(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        let max = u32::try_from(self.max_concurrent_operations()).unwrap_or(u32::MAX);
        match self.concurrency_limiter.acquire_many(max).await {
            Ok(permits) => permits.forget(),
            Err(_) => tracing::debug!("Concurrency limiter already closed"),
        }
        self.concurrency_limiter.close();

        match self.backend.close().await {
            Ok(()) => tracing::info!(backend = %self.backend.name(), "Triple store connection closed"),
            Err(e) => tracing::warn!(
                backend = %self.backend.name(),
                error = %e,
                "Failed to close triple store connection"
            ),
        }
    }

    // ========== Internal Backend Wrappers (with concurrency limiting) ==========

    /// Effective concurrency limit used by the internal semaphore.
    pub fn max_concurrent_operations(&self) -> usize {
        effective_concurrency(self.config.max_concurrent_operations)
    }

    fn record_permit_snapshot(&self, backend: &str) {
        metrics::record_backend_permit_snapshot(
            backend,
            self.max_concurrent_operations(),
            self.concurrency_limiter.available_permits(),
        );
    }

    async fn acquire_permit(&self, backend: &str, op: &str) -> Result<OwnedSemaphorePermit> {
        self.ensure_open()?;
        let wait_started = Instant::now();
        let permit = self
            .concurrency_limiter
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| {
                if self.is_closed() {
                    TripleStoreError::Closed
                } else {
                    TripleStoreError::SemaphoreClosed
                }
            })?;
        metrics::record_backend_permit_wait(backend, op, wait_started.elapsed());
        self.record_permit_snapshot(backend);
        Ok(permit)
    }

    /// Runs one backend call under a permit and records its metrics
    async fn limited<T, F, Fut>(&self, op: &str, statement_bytes: usize, call: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let backend = self.backend.name();
        let started = Instant::now();
        metrics::record_backend_query_bytes_total(backend, op, statement_bytes);

        let permit = match self.acquire_permit(backend, op).await {
            Ok(permit) => permit,
            Err(error) => {
                metrics::record_backend_operation(backend, op, Some(&error), started.elapsed());
                return Err(error);
            }
        };

        let result = call().await;
        drop(permit);
        self.record_permit_snapshot(backend);
        metrics::record_backend_operation(backend, op, result.as_ref().err(), started.elapsed());
        result
    }

    /// Execute a SPARQL UPDATE with concurrency limiting
    pub(crate) async fn backend_update(&self, query: &str, timeout: Duration) -> Result<()> {
        self.limited("update", query.len(), || self.backend.update(query, timeout))
            .await
    }

    /// Execute a SPARQL SELECT with concurrency limiting
    pub(crate) async fn backend_select(&self, query: &str, timeout: Duration) -> Result<String> {
        let result = self
            .limited("select", query.len(), || self.backend.select(query, timeout))
            .await;
        if let Ok(body) = &result {
            metrics::record_backend_result_bytes_total(self.backend.name(), "select", body.len());
        }
        result
    }

    /// Execute a SQL statement with concurrency limiting
    pub(crate) async fn backend_sql(&self, statement: &str, timeout: Duration) -> Result<()> {
        self.limited("sql", statement.len(), || {
            self.backend.execute_sql(statement, timeout)
        })
        .await
    }

    /// Upload a serialized document into a graph with concurrency limiting
    pub(crate) async fn backend_load(
        &self,
        data: Vec<u8>,
        format: RdfFormat,
        graph: &str,
        timeout: Duration,
    ) -> Result<()> {
        let bytes = data.len();
        self.limited("load", bytes, || {
            self.backend.load_document(data, format, graph, timeout)
        })
        .await
    }

    /// Serialize a graph with concurrency limiting
    pub(crate) async fn backend_export(
        &self,
        graph: &str,
        format: RdfFormat,
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        let result = self
            .limited("export", 0, || self.backend.export_graph(graph, format, timeout))
            .await;
        if let Ok(body) = &result {
            metrics::record_backend_result_bytes_total(self.backend.name(), "export", body.len());
        }
        result
    }
}

/// Permit count for the limiter: at least one, and small enough for both
/// `Semaphore::new` and the `u32` taken by `acquire_many`.
fn effective_concurrency(configured: usize) -> usize {
    let ceiling = Semaphore::MAX_PERMITS.min(u32::MAX as usize);
    configured.clamp(1, ceiling)
}

#[cfg(test)]
impl TripleStoreManager {
    pub fn from_backend_for_tests(
        backend: Box<dyn TripleStoreBackend>,
        config: TripleStoreManagerConfig,
    ) -> Self {
        Self::with_backend(backend, config)
    }
}
