use std::{path::Path, time::Duration};

use async_trait::async_trait;
use oxigraph::{
    io::{RdfFormat as OxRdfFormat, RdfParser},
    model::{NamedNode, Term, vocab::xsd},
    sparql::{QueryResults, SparqlEvaluator},
    store::Store,
};
use serde_json::{Map, Value, json};

use super::TripleStoreBackend;
use crate::{
    error::{Result, TripleStoreError},
    rdf::{RdfFormat, parse_iri},
};

/// Oxigraph embedded triple store backend
///
/// Speaks standard SPARQL 1.1 only, so store-specific SQL procedures are
/// reported as unsupported and callers fall back to SPARQL equivalents.
pub struct OxigraphBackend {
    store: Store,
}

impl OxigraphBackend {
    /// Create a new Oxigraph backend with persistent storage
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = Store::open(&path).map_err(|e| {
            TripleStoreError::Other(format!("Failed to open Oxigraph store: {}", e))
        })?;

        tracing::info!(
            path = %path.as_ref().display(),
            "Opened Oxigraph persistent store"
        );

        Ok(Self { store })
    }

    /// Create a new in-memory Oxigraph backend
    pub fn in_memory() -> Result<Self> {
        let store = Store::new().map_err(|e| {
            TripleStoreError::Other(format!("Failed to create in-memory Oxigraph store: {}", e))
        })?;

        tracing::info!("Created in-memory Oxigraph store");

        Ok(Self { store })
    }

    /// Get direct access to the underlying store
    pub fn store(&self) -> &Store {
        &self.store
    }
}

fn parser_format(format: RdfFormat) -> OxRdfFormat {
    match format {
        RdfFormat::RdfXml => OxRdfFormat::RdfXml,
        RdfFormat::Turtle => OxRdfFormat::Turtle,
        RdfFormat::N3 => OxRdfFormat::N3,
        RdfFormat::NTriples => OxRdfFormat::NTriples,
    }
}

fn serializer_format(format: RdfFormat) -> OxRdfFormat {
    match format {
        RdfFormat::RdfXml => OxRdfFormat::RdfXml,
        // Turtle documents are valid N3
        RdfFormat::Turtle | RdfFormat::N3 => OxRdfFormat::Turtle,
        RdfFormat::NTriples => OxRdfFormat::NTriples,
    }
}

fn term_to_json(term: &Term) -> Value {
    match term {
        Term::NamedNode(node) => json!({ "type": "uri", "value": node.as_str() }),
        Term::BlankNode(node) => json!({ "type": "bnode", "value": node.as_str() }),
        Term::Literal(literal) => {
            let mut binding = Map::new();
            binding.insert("type".to_string(), json!("literal"));
            binding.insert("value".to_string(), json!(literal.value()));
            if let Some(language) = literal.language() {
                binding.insert("xml:lang".to_string(), json!(language));
            } else if literal.datatype() != xsd::STRING {
                binding.insert("datatype".to_string(), json!(literal.datatype().as_str()));
            }
            Value::Object(binding)
        }
        #[allow(unreachable_patterns)]
        other => json!({ "type": "literal", "value": other.to_string() }),
    }
}

#[async_trait]
impl TripleStoreBackend for OxigraphBackend {
    fn name(&self) -> &'static str {
        "oxigraph"
    }

    async fn health_check(&self) -> Result<bool> {
        // Embedded store: a trivial query proves it is usable
        let result = SparqlEvaluator::new()
            .parse_query("ASK { ?s ?p ?o }")
            .map_err(|e| {
                TripleStoreError::Other(format!("Health check query parse failed: {}", e))
            })?
            .on_store(&self.store)
            .execute()
            .map_err(|e| TripleStoreError::Other(format!("Health check query failed: {}", e)))?;

        match result {
            QueryResults::Boolean(_) => Ok(true),
            _ => Ok(false),
        }
    }

    fn supports_sql(&self) -> bool {
        false
    }

    async fn update(&self, query: &str, _timeout: Duration) -> Result<()> {
        let prepared = SparqlEvaluator::new().parse_update(query).map_err(|e| {
            TripleStoreError::InvalidQuery {
                reason: format!("Failed to parse SPARQL UPDATE: {}", e),
            }
        })?;

        // Execute on blocking thread pool since Oxigraph's update involves disk I/O
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || {
            prepared
                .on_store(&store)
                .execute()
                .map_err(|e| TripleStoreError::Other(format!("SPARQL UPDATE failed: {}", e)))
        })
        .await
        .map_err(|e| TripleStoreError::Other(format!("Task join error: {}", e)))??;

        Ok(())
    }

    async fn select(&self, query: &str, _timeout: Duration) -> Result<String> {
        let prepared = SparqlEvaluator::new().parse_query(query).map_err(|e| {
            TripleStoreError::InvalidQuery {
                reason: format!("Failed to parse SPARQL SELECT: {}", e),
            }
        })?;

        let store = self.store.clone();
        tokio::task::spawn_blocking(move || {
            let result = prepared
                .on_store(&store)
                .execute()
                .map_err(|e| TripleStoreError::Other(format!("SPARQL SELECT failed: {}", e)))?;

            let QueryResults::Solutions(solutions) = result else {
                return Err(TripleStoreError::InvalidQuery {
                    reason: "Expected SELECT to return solutions".to_string(),
                });
            };

            let variables: Vec<String> = solutions
                .variables()
                .iter()
                .map(|variable| variable.as_str().to_string())
                .collect();

            let mut bindings = Vec::new();
            for solution in solutions {
                let solution = solution.map_err(|e| {
                    TripleStoreError::Other(format!("Failed to read solution: {}", e))
                })?;
                let mut row = Map::new();
                for (variable, term) in solution.iter() {
                    row.insert(variable.as_str().to_string(), term_to_json(term));
                }
                bindings.push(Value::Object(row));
            }

            let document = json!({
                "head": { "vars": variables },
                "results": { "bindings": bindings },
            });
            Ok(document.to_string())
        })
        .await
        .map_err(|e| TripleStoreError::Other(format!("Task join error: {}", e)))?
    }

    async fn execute_sql(&self, _statement: &str, _timeout: Duration) -> Result<()> {
        Err(TripleStoreError::Unsupported {
            backend: "oxigraph",
            operation: "SQL",
        })
    }

    async fn load_document(
        &self,
        data: Vec<u8>,
        format: RdfFormat,
        graph: &str,
        _timeout: Duration,
    ) -> Result<()> {
        let graph: NamedNode = parse_iri(graph)?;
        let parser = RdfParser::from_format(parser_format(format)).with_default_graph(graph);

        let store = self.store.clone();
        tokio::task::spawn_blocking(move || {
            store
                .load_from_reader(parser, data.as_slice())
                .map_err(|e| TripleStoreError::ParseError {
                    reason: format!("Failed to load document: {}", e),
                })
        })
        .await
        .map_err(|e| TripleStoreError::Other(format!("Task join error: {}", e)))?
    }

    async fn export_graph(
        &self,
        graph: &str,
        format: RdfFormat,
        _timeout: Duration,
    ) -> Result<Vec<u8>> {
        let graph: NamedNode = parse_iri(graph)?;

        let store = self.store.clone();
        tokio::task::spawn_blocking(move || {
            store
                .dump_graph_to_writer(graph.as_ref(), serializer_format(format), Vec::new())
                .map_err(|e| TripleStoreError::Other(format!("Failed to export graph: {}", e)))
        })
        .await
        .map_err(|e| TripleStoreError::Other(format!("Task join error: {}", e)))?
    }

    async fn close(&self) -> Result<()> {
        // Writes are committed per statement; the store closes when dropped
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::sparql::parse_select_results;

    const GRAPH: &str = "http://example.org/graph1";

    #[tokio::test]
    async fn in_memory_store_is_healthy() {
        let backend = OxigraphBackend::in_memory().unwrap();

        assert!(backend.health_check().await.unwrap());
        assert!(!backend.supports_sql());
    }

    #[tokio::test]
    async fn select_results_are_sparql_json() {
        let backend = OxigraphBackend::in_memory().unwrap();
        backend
            .update(
                r#"INSERT DATA { GRAPH <http://example.org/graph1> {
                    <http://example.org/s> <http://example.org/label> "hello"@en .
                    <http://example.org/s> <http://example.org/next> <http://example.org/o> .
                } }"#,
                Duration::from_secs(10),
            )
            .await
            .unwrap();

        let json = backend
            .select(
                "SELECT ?p ?o FROM <http://example.org/graph1> WHERE { ?s ?p ?o } ORDER BY ?p",
                Duration::from_secs(10),
            )
            .await
            .unwrap();
        let rows: Vec<_> = parse_select_results(&json).unwrap().collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("o").unwrap().to_string(), "\"hello\"@en");
        assert_eq!(rows[1].get("o").unwrap().value(), "http://example.org/o");
    }

    #[tokio::test]
    async fn sql_is_unsupported() {
        let backend = OxigraphBackend::in_memory().unwrap();

        let result = backend.execute_sql("checkpoint", Duration::from_secs(1)).await;

        assert!(matches!(result, Err(TripleStoreError::Unsupported { .. })));
    }

    #[tokio::test]
    async fn loaded_documents_land_in_the_target_graph() {
        let backend = OxigraphBackend::in_memory().unwrap();
        let turtle = b"<http://example.org/a> <http://example.org/p> \"x\" .\n".to_vec();

        backend
            .load_document(turtle, RdfFormat::Turtle, GRAPH, Duration::from_secs(10))
            .await
            .unwrap();
        let exported = backend
            .export_graph(GRAPH, RdfFormat::NTriples, Duration::from_secs(10))
            .await
            .unwrap();

        assert_eq!(
            String::from_utf8(exported).unwrap().trim(),
            "<http://example.org/a> <http://example.org/p> \"x\" ."
        );
    }

    #[tokio::test]
    async fn malformed_document_is_a_parse_error() {
        let backend = OxigraphBackend::in_memory().unwrap();

        let result = backend
            .load_document(
                b"this is not turtle".to_vec(),
                RdfFormat::Turtle,
                GRAPH,
                Duration::from_secs(10),
            )
            .await;

        assert!(matches!(result, Err(TripleStoreError::ParseError { .. })));
    }

    #[tokio::test]
    async fn invalid_update_is_rejected_before_execution() {
        let backend = OxigraphBackend::in_memory().unwrap();

        let result = backend
            .update("INSERT NONSENSE", Duration::from_secs(1))
            .await;

        assert!(matches!(result, Err(TripleStoreError::InvalidQuery { .. })));
    }
}
