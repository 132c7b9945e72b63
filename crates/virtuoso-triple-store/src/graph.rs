use crate::{
    TripleStoreManager,
    error::Result,
    query::{sparql, sql},
    rdf::{RdfTriple, parse_iri},
    sparql::parse_single_count,
};

impl TripleStoreManager {
    /// Number of triples in `graph`.
    ///
    /// Reads the single aggregate column of the first row, whatever the store
    /// names it. A result without rows counts as zero; a failed query is an
    /// error, never a zero count.
    pub async fn count_triples(&self, graph: &str) -> Result<u64> {
        let graph = parse_iri(graph)?;
        let solutions = self
            .execute_select(&sparql::count_triples(Some(&graph)))
            .await?;
        parse_single_count(solutions)
    }

    /// Number of triples across every graph of the store.
    pub async fn count_all_triples(&self) -> Result<u64> {
        let solutions = self.execute_select(&sparql::count_triples(None)).await?;
        parse_single_count(solutions)
    }

    /// Whether `graph` holds at least one triple.
    pub async fn graph_exists(&self, graph: &str) -> Result<bool> {
        let graph = parse_iri(graph)?;
        let mut solutions = self.execute_select(&sparql::graph_exists_query(&graph)).await?;
        Ok(solutions.next().is_some())
    }

    /// Removes every triple of `graph`. Clearing a missing graph succeeds.
    pub async fn clear_graph(&self, graph: &str) -> Result<()> {
        let graph = parse_iri(graph)?;
        self.execute_update(&sparql::clear_graph(&graph)).await
    }

    /// Adds every triple of `source` to `destination`; `source` is left intact.
    pub async fn copy_graph(&self, source: &str, destination: &str) -> Result<()> {
        let source = parse_iri(source)?;
        let destination = parse_iri(destination)?;
        self.execute_update(&sparql::copy_graph(&source, &destination))
            .await
    }

    /// Re-labels the triples of `old_name` as belonging to `new_name`.
    ///
    /// Virtuoso rewrites the graph column of its quad table in place; stores
    /// without SQL get a SPARQL `MOVE`.
    pub async fn rename_graph(&self, old_name: &str, new_name: &str) -> Result<()> {
        let old_name = parse_iri(old_name)?;
        let new_name = parse_iri(new_name)?;

        if self.backend.supports_sql() {
            self.execute_sql(&sql::rename_graph(&old_name, &new_name)?)
                .await
        } else {
            self.execute_update(&sparql::move_graph(&old_name, &new_name))
                .await
        }
    }

    /// Inserts `<subject> <predicate> <object>` into `graph`.
    pub async fn add_triple(
        &self,
        subject: &str,
        predicate: &str,
        object: &str,
        graph: &str,
    ) -> Result<()> {
        let triple = RdfTriple::iri(subject, predicate, object)?;
        self.add_triples(&[triple], graph).await
    }

    /// Inserts `<subject> <predicate> "literal"` into `graph`.
    pub async fn add_literal_triple(
        &self,
        subject: &str,
        predicate: &str,
        literal: &str,
        graph: &str,
    ) -> Result<()> {
        let triple = RdfTriple::literal(subject, predicate, literal)?;
        self.add_triples(&[triple], graph).await
    }

    /// Inserts a triple whose object is an `xsd:double` literal.
    pub async fn add_double_triple(
        &self,
        subject: &str,
        predicate: &str,
        value: f64,
        graph: &str,
    ) -> Result<()> {
        let triple = RdfTriple::typed(subject, predicate, value)?;
        self.add_triples(&[triple], graph).await
    }

    /// Inserts a batch of triples with a single `INSERT DATA` statement.
    ///
    /// An empty batch sends nothing.
    pub async fn add_triples(&self, triples: &[RdfTriple], graph: &str) -> Result<()> {
        let graph = parse_iri(graph)?;
        self.ensure_open()?;
        if triples.is_empty() {
            return Ok(());
        }
        self.execute_update(&sparql::insert_data(&graph, triples))
            .await
    }

    /// Writes the plain triples encoded by the diachron records of
    /// `reified_source` into `destination`.
    pub async fn dereify_graph(&self, reified_source: &str, destination: &str) -> Result<()> {
        let reified_source = parse_iri(reified_source)?;
        let destination = parse_iri(destination)?;
        self.execute_update(&sparql::dereify(&reified_source, &destination))
            .await
    }
}
