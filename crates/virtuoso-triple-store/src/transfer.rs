//! Client-side import and export of whole graphs.

use std::path::Path;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::{
    TripleStoreManager,
    error::Result,
    rdf::{RdfFormat, parse_iri},
};

impl TripleStoreManager {
    /// Uploads a local RDF file into `graph`.
    pub async fn import_file(
        &self,
        path: impl AsRef<Path>,
        format: RdfFormat,
        graph: &str,
    ) -> Result<()> {
        let path = path.as_ref();
        let graph = parse_iri(graph)?;
        self.ensure_open()?;

        let data = tokio::fs::read(path).await?;
        tracing::debug!(
            path = %path.display(),
            bytes = data.len(),
            format = %format,
            graph = %graph.as_str(),
            "Importing local file"
        );

        self.backend_load(
            data,
            format,
            graph.as_str(),
            self.config.timeouts.transfer_timeout(),
        )
        .await
    }

    /// Serializes `graph` as `format`.
    ///
    /// A graph without triples yields an empty or header-only document.
    pub async fn export_graph(&self, graph: &str, format: RdfFormat) -> Result<Vec<u8>> {
        let graph = parse_iri(graph)?;
        self.backend_export(
            graph.as_str(),
            format,
            self.config.timeouts.transfer_timeout(),
        )
        .await
    }

    /// Writes `graph` to a local file, replacing it if present.
    pub async fn export_to_file(
        &self,
        path: impl AsRef<Path>,
        format: RdfFormat,
        graph: &str,
    ) -> Result<()> {
        let data = self.export_graph(graph, format).await?;
        tokio::fs::write(path.as_ref(), &data).await?;
        tracing::debug!(
            path = %path.as_ref().display(),
            bytes = data.len(),
            "Exported graph to file"
        );
        Ok(())
    }

    /// Streams `graph` into `writer` and flushes it.
    pub async fn export_to_writer<W>(&self, writer: &mut W, format: RdfFormat, graph: &str) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let data = self.export_graph(graph, format).await?;
        writer.write_all(&data).await?;
        writer.flush().await?;
        Ok(())
    }
}
