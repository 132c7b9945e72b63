//! SPARQL 1.1 query results (JSON) as a forward-only row cursor.

use std::{collections::HashMap, fmt};

use serde::Deserialize;

use crate::error::{Result, TripleStoreError};

#[derive(Deserialize)]
struct SparqlSelectResponse {
    head: SparqlSelectHead,
    results: SparqlSelectResults,
}

#[derive(Deserialize)]
struct SparqlSelectHead {
    #[serde(default)]
    vars: Vec<String>,
}

#[derive(Deserialize)]
struct SparqlSelectResults {
    bindings: Vec<HashMap<String, SparqlSelectBinding>>,
}

#[derive(Deserialize)]
struct SparqlSelectBinding {
    #[serde(rename = "type")]
    kind: String,
    value: String,
    datatype: Option<String>,
    #[serde(rename = "xml:lang")]
    language: Option<String>,
}

/// A bound value in a result row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RdfTerm {
    Iri(String),
    BlankNode(String),
    Literal {
        value: String,
        datatype: Option<String>,
        language: Option<String>,
    },
}

impl RdfTerm {
    /// IRI, blank node label or literal lexical form.
    pub fn value(&self) -> &str {
        match self {
            RdfTerm::Iri(value) | RdfTerm::BlankNode(value) => value,
            RdfTerm::Literal { value, .. } => value,
        }
    }
}

impl fmt::Display for RdfTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RdfTerm::Iri(iri) => write!(f, "<{iri}>"),
            RdfTerm::BlankNode(id) => write!(f, "_:{id}"),
            RdfTerm::Literal {
                value,
                language: Some(language),
                ..
            } => write!(f, "{value:?}@{language}"),
            RdfTerm::Literal {
                value,
                datatype: Some(datatype),
                ..
            } => write!(f, "{value:?}^^<{datatype}>"),
            RdfTerm::Literal { value, .. } => write!(f, "{value:?}"),
        }
    }
}

impl TryFrom<SparqlSelectBinding> for RdfTerm {
    type Error = TripleStoreError;

    fn try_from(binding: SparqlSelectBinding) -> Result<Self> {
        match binding.kind.as_str() {
            "uri" => Ok(RdfTerm::Iri(binding.value)),
            "bnode" => Ok(RdfTerm::BlankNode(binding.value)),
            // "typed-literal" is the SPARQL XML-era name still emitted by Virtuoso
            "literal" | "typed-literal" => Ok(RdfTerm::Literal {
                value: binding.value,
                datatype: binding.datatype,
                language: binding.language,
            }),
            other => Err(TripleStoreError::ParseError {
                reason: format!("Unknown binding type '{other}'"),
            }),
        }
    }
}

/// One row of a SELECT result, aligned with [`QuerySolutions::variables`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySolution {
    variables: std::sync::Arc<[String]>,
    values: Vec<Option<RdfTerm>>,
}

impl QuerySolution {
    /// Value bound to `variable` (without the leading `?`).
    pub fn get(&self, variable: &str) -> Option<&RdfTerm> {
        self.variables
            .iter()
            .position(|name| name == variable)
            .and_then(|index| self.values[index].as_ref())
    }

    /// Value of the column at `index`, in projection order.
    pub fn get_index(&self, index: usize) -> Option<&RdfTerm> {
        self.values.get(index).and_then(Option::as_ref)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&RdfTerm>)> {
        self.variables
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Option::as_ref))
    }
}

/// Forward-only, read-only cursor over SELECT rows.
#[derive(Debug)]
pub struct QuerySolutions {
    variables: std::sync::Arc<[String]>,
    rows: std::vec::IntoIter<QuerySolution>,
}

impl QuerySolutions {
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Rows not yet consumed.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl Iterator for QuerySolutions {
    type Item = QuerySolution;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

/// Parses a `application/sparql-results+json` document.
pub fn parse_select_results(json: &str) -> Result<QuerySolutions> {
    let response: SparqlSelectResponse =
        serde_json::from_str(json).map_err(|e| TripleStoreError::ParseError {
            reason: format!("Failed to parse SELECT response: {e}"),
        })?;

    let variables: std::sync::Arc<[String]> = response.head.vars.into();
    let mut rows = Vec::with_capacity(response.results.bindings.len());

    for mut binding in response.results.bindings {
        let mut values = Vec::with_capacity(variables.len());
        for variable in variables.iter() {
            let value = binding.remove(variable).map(RdfTerm::try_from).transpose()?;
            values.push(value);
        }
        rows.push(QuerySolution {
            variables: std::sync::Arc::clone(&variables),
            values,
        });
    }

    Ok(QuerySolutions {
        variables,
        rows: rows.into_iter(),
    })
}

/// Reads the first column of the first row as an unsigned integer.
///
/// An empty result counts as zero.
pub(crate) fn parse_single_count(mut solutions: QuerySolutions) -> Result<u64> {
    let Some(row) = solutions.next() else {
        return Ok(0);
    };
    let Some(term) = row.get_index(0) else {
        return Ok(0);
    };

    term.value()
        .trim()
        .parse::<u64>()
        .map_err(|e| TripleStoreError::ParseError {
            reason: format!("Count value '{}' is not an integer: {e}", term.value()),
        })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    const VIRTUOSO_COUNT: &str = r#"{
        "head": { "link": [], "vars": ["callret-0"] },
        "results": { "distinct": false, "ordered": true, "bindings": [
            { "callret-0": { "type": "typed-literal",
                             "datatype": "http://www.w3.org/2001/XMLSchema#integer",
                             "value": "4213" } }
        ] }
    }"#;

    #[test]
    fn count_is_read_from_first_column_whatever_its_name() {
        let solutions = parse_select_results(VIRTUOSO_COUNT).unwrap();
        assert_eq!(solutions.variables(), ["callret-0".to_string()]);
        assert_eq!(parse_single_count(solutions).unwrap(), 4213);
    }

    #[test]
    fn empty_result_counts_as_zero() {
        let json = r#"{"head":{"vars":["count"]},"results":{"bindings":[]}}"#;
        assert_eq!(parse_single_count(parse_select_results(json).unwrap()).unwrap(), 0);
    }

    #[test]
    fn non_numeric_count_is_a_parse_error() {
        let json = r#"{"head":{"vars":["count"]},"results":{"bindings":[
            {"count":{"type":"literal","value":"many"}}]}}"#;
        let result = parse_single_count(parse_select_results(json).unwrap());
        assert!(matches!(result, Err(TripleStoreError::ParseError { .. })));
    }

    #[test]
    fn rows_keep_projection_order_and_unbound_values() {
        let json = r#"{"head":{"vars":["s","label"]},"results":{"bindings":[
            {"s":{"type":"uri","value":"http://example.org/a"},
             "label":{"type":"literal","value":"A","xml:lang":"en"}},
            {"s":{"type":"bnode","value":"b0"}}
        ]}}"#;
        let mut solutions = parse_select_results(json).unwrap();
        assert_eq!(solutions.remaining(), 2);

        let first = solutions.next().unwrap();
        assert_eq!(
            first.get("s"),
            Some(&RdfTerm::Iri("http://example.org/a".to_string()))
        );
        assert_eq!(first.get("label").unwrap().to_string(), "\"A\"@en");

        let second = solutions.next().unwrap();
        assert_eq!(second.get_index(0).unwrap().to_string(), "_:b0");
        assert_eq!(second.get("label"), None);
        let columns: Vec<_> = second.iter().map(|(name, _)| name).collect();
        assert_eq!(columns, ["s", "label"]);

        assert!(solutions.next().is_none());
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        assert!(matches!(
            parse_select_results("not-json"),
            Err(TripleStoreError::ParseError { .. })
        ));
    }
}
