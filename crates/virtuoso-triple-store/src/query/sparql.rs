//! SPARQL statement templates.
//!
//! Every argument is an already validated term, so its `Display` form is safe
//! to splice into the statement text.

use oxigraph::model::NamedNode;

use super::vocab;
use crate::rdf::RdfTriple;

pub(crate) fn count_triples(graph: Option<&NamedNode>) -> String {
    match graph {
        Some(graph) => format!("SELECT (COUNT(*) AS ?count) FROM {graph} WHERE {{ ?s ?p ?o }}"),
        // Named graphs only: embedded stores keep the default graph separate
        None => "SELECT (COUNT(*) AS ?count) WHERE { GRAPH ?g { ?s ?p ?o } }".to_string(),
    }
}

/// Existence check bounded to two rows.
pub(crate) fn graph_exists_query(graph: &NamedNode) -> String {
    format!("SELECT * FROM {graph} WHERE {{ ?s ?p ?o }} LIMIT 2")
}

pub(crate) fn clear_graph(graph: &NamedNode) -> String {
    format!("CLEAR SILENT GRAPH {graph}")
}

pub(crate) fn copy_graph(source: &NamedNode, destination: &NamedNode) -> String {
    format!(
        "INSERT {{\n  GRAPH {destination} {{ ?s ?p ?o }}\n}}\nWHERE {{\n  GRAPH {source} {{ ?s ?p ?o }}\n}}"
    )
}

pub(crate) fn move_graph(old_name: &NamedNode, new_name: &NamedNode) -> String {
    format!("MOVE SILENT GRAPH {old_name} TO GRAPH {new_name}")
}

pub(crate) fn insert_data(graph: &NamedNode, triples: &[RdfTriple]) -> String {
    let mut body = String::new();
    for triple in triples {
        body.push_str(&format!("    {triple} .\n"));
    }
    format!("INSERT DATA {{\n  GRAPH {graph} {{\n{body}  }}\n}}")
}

/// Rebuilds `?s ?p ?o` from diachron records and their record attributes.
pub(crate) fn dereify(reified_source: &NamedNode, destination: &NamedNode) -> String {
    format!(
        r#"INSERT {{
  GRAPH {destination} {{ ?s ?p ?o . }}
}}
WHERE {{
  GRAPH {reified_source} {{
    ?record <{subject}> ?s ;
            <{has_attribute}> ?ratt .
    ?ratt <{predicate}> ?p ;
          <{object}> ?o .
  }}
}}"#,
        subject = vocab::DIACHRON_SUBJECT,
        has_attribute = vocab::DIACHRON_HAS_RECORD_ATTRIBUTE,
        predicate = vocab::DIACHRON_PREDICATE,
        object = vocab::DIACHRON_OBJECT,
    )
}
