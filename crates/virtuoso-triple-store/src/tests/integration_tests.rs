#![allow(clippy::unwrap_used)]

//! Integration tests against a live Virtuoso server.
//!
//! Start one with:
//! `docker run -d -p 1111:1111 -p 8890:8890 -e DBA_PASSWORD=dba openlink/virtuoso-opensource-7`
//! and run with `RUN_VIRTUOSO_TESTS=1`. Bulk loader tests additionally need
//! `VIRTUOSO_LOAD_DIR` pointing at a folder listed in the server's `DirsAllowed`.

use crate::{RdfFormat, TripleStoreManager, TripleStoreManagerConfig};

const GRAPH: &str = "http://example.org/virtuoso-rep/test";
const COPY: &str = "http://example.org/virtuoso-rep/test-copy";

fn virtuoso_config() -> TripleStoreManagerConfig {
    let host = std::env::var("VIRTUOSO_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = std::env::var("VIRTUOSO_PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(crate::DEFAULT_SQL_PORT);
    let username = std::env::var("VIRTUOSO_USERNAME").unwrap_or_else(|_| "dba".to_string());
    let password = std::env::var("VIRTUOSO_PASSWORD").unwrap_or_else(|_| "dba".to_string());

    let mut config = TripleStoreManagerConfig::virtuoso(host, port, username, password);
    if let Some(http_port) = std::env::var("VIRTUOSO_HTTP_PORT")
        .ok()
        .and_then(|value| value.parse().ok())
    {
        config.http_port = http_port;
    }
    config
}

async fn connect() -> Option<TripleStoreManager> {
    match TripleStoreManager::connect(&virtuoso_config()).await {
        Ok(manager) => Some(manager),
        Err(e) => {
            eprintln!("Skipping test - Virtuoso not available: {e}");
            None
        }
    }
}

#[tokio::test]
async fn test_virtuoso_graph_operations() {
    if !super::require_virtuoso() {
        return;
    }
    let Some(manager) = connect().await else {
        return;
    };

    manager.clear_graph(GRAPH).await.unwrap();
    manager.clear_graph(COPY).await.unwrap();
    assert!(!manager.graph_exists(GRAPH).await.unwrap());

    manager
        .add_triple(
            "http://example.org/a",
            "http://example.org/knows",
            "http://example.org/b",
            GRAPH,
        )
        .await
        .unwrap();
    manager
        .add_literal_triple("http://example.org/a", "http://example.org/name", "Alice", GRAPH)
        .await
        .unwrap();
    assert_eq!(manager.count_triples(GRAPH).await.unwrap(), 2);

    manager.copy_graph(GRAPH, COPY).await.unwrap();
    assert_eq!(manager.count_triples(COPY).await.unwrap(), 2);

    manager.clear_graph(COPY).await.unwrap();
    manager.rename_graph(GRAPH, COPY).await.unwrap();
    assert!(!manager.graph_exists(GRAPH).await.unwrap());
    assert_eq!(manager.count_triples(COPY).await.unwrap(), 2);

    let exported = manager
        .export_graph(COPY, RdfFormat::NTriples)
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&exported).contains("\"Alice\""));

    manager.clear_graph(COPY).await.unwrap();
    manager.terminate().await;
}

#[tokio::test]
async fn test_virtuoso_bulk_import() {
    if !super::require_virtuoso() {
        return;
    }
    let Ok(load_dir) = std::env::var("VIRTUOSO_LOAD_DIR") else {
        eprintln!("Skipping bulk import test (set VIRTUOSO_LOAD_DIR)");
        return;
    };
    let Some(manager) = connect().await else {
        return;
    };

    manager
        .bulk_import(&load_dir, RdfFormat::NTriples, GRAPH, false)
        .await
        .unwrap();
    assert!(manager.count_triples(GRAPH).await.unwrap() > 0);

    manager.clear_graph(GRAPH).await.unwrap();
    manager.terminate().await;
}
