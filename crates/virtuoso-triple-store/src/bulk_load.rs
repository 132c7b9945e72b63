//! Virtuoso bulk loader: server-side folders and single files.
//!
//! All paths here are read by the database server, not by this process.

use std::{path::Path, time::Instant};

use crate::{
    TripleStoreManager,
    error::{Result, TripleStoreError},
    metrics,
    query::sql,
    rdf::{RdfFormat, parse_iri},
};

impl TripleStoreManager {
    /// Loads every `format` file of a server-side `folder` into `graph`.
    ///
    /// Statement sequence: clear the graph (skipped when `incremental`), empty
    /// the load queue, queue the folder, run the loader, checkpoint. Steps are
    /// not atomic: a failure leaves the earlier steps applied. Imports on the
    /// same manager run one at a time.
    pub async fn bulk_import(
        &self,
        folder: impl AsRef<Path>,
        format: RdfFormat,
        graph: &str,
        incremental: bool,
    ) -> Result<()> {
        let folder = folder.as_ref();
        let graph_iri = parse_iri(graph)?;
        // Build every statement before the first one is sent
        let enqueue = sql::enqueue_directory(folder, &format.loader_mask(), &graph_iri)?;
        self.ensure_open()?;
        self.require_sql("bulk_import")?;

        let started = Instant::now();
        let _guard = self.bulk_load_lock.lock().await;
        tracing::info!(
            folder = %folder.display(),
            format = %format,
            graph = %graph_iri.as_str(),
            incremental,
            "Starting bulk import"
        );

        let result = self.run_bulk_import(&enqueue, graph, incremental).await;
        metrics::record_bulk_import(
            self.backend.name(),
            incremental,
            result.as_ref().err(),
            started.elapsed(),
        );

        match &result {
            Ok(()) => tracing::info!(
                graph = %graph_iri.as_str(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Bulk import finished"
            ),
            Err(e) => tracing::error!(
                graph = %graph_iri.as_str(),
                error = %e,
                "Bulk import failed"
            ),
        }
        result
    }

    async fn run_bulk_import(&self, enqueue: &str, graph: &str, incremental: bool) -> Result<()> {
        if !incremental {
            self.clear_graph(graph).await?;
        }
        self.clear_load_list().await?;
        self.execute_sql(enqueue).await?;
        self.run_loader().await?;
        self.checkpoint().await
    }

    /// Empties the bulk loader queue (`DB.DBA.load_list`).
    pub async fn clear_load_list(&self) -> Result<()> {
        self.execute_sql(sql::CLEAR_LOAD_LIST).await
    }

    /// Queues the files of a server-side folder matching `mask` for loading into `graph`.
    pub async fn enqueue_directory(
        &self,
        folder: impl AsRef<Path>,
        mask: &str,
        graph: &str,
    ) -> Result<()> {
        let graph = parse_iri(graph)?;
        self.execute_sql(&sql::enqueue_directory(folder.as_ref(), mask, &graph)?)
            .await
    }

    /// Loads everything currently queued.
    pub async fn run_loader(&self) -> Result<()> {
        self.execute_sql(sql::RUN_LOADER).await
    }

    /// Makes loaded data durable.
    pub async fn checkpoint(&self) -> Result<()> {
        self.execute_sql(sql::CHECKPOINT).await
    }

    /// Loads one server-side file into `graph` with the parser matching `format`.
    pub async fn import_server_file(
        &self,
        path: impl AsRef<Path>,
        format: RdfFormat,
        graph: &str,
    ) -> Result<()> {
        let graph = parse_iri(graph)?;
        let statement = match format {
            RdfFormat::RdfXml => sql::load_rdfxml_file(path.as_ref(), &graph)?,
            RdfFormat::Turtle | RdfFormat::N3 | RdfFormat::NTriples => {
                sql::load_turtle_file(path.as_ref(), &graph)?
            }
        };
        self.execute_sql(&statement).await
    }

    fn require_sql(&self, operation: &'static str) -> Result<()> {
        if self.backend.supports_sql() {
            Ok(())
        } else {
            Err(TripleStoreError::Unsupported {
                backend: self.backend.name(),
                operation,
            })
        }
    }
}
