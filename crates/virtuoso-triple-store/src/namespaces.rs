//! PREFIX block prepended to SPARQL statements.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// A single `PREFIX name: <iri>` declaration.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PrefixDeclaration {
    pub prefix: String,
    pub iri: String,
}

impl PrefixDeclaration {
    pub fn new(prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            iri: iri.into(),
        }
    }

    /// The diachron, EFO and change-ontology prefixes.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("diachron", "http://www.diachron-fp7.eu/resource/"),
            Self::new("efo", "http://www.ebi.ac.uk/efo/"),
            Self::new("co", "http://www.diachron-fp7.eu/changes/"),
        ]
    }
}

/// Immutable prefix block, rendered once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    block: String,
}

impl Namespaces {
    pub fn new(declarations: &[PrefixDeclaration]) -> Self {
        let block = declarations
            .iter()
            .map(|declaration| format!("PREFIX {}: <{}>\n", declaration.prefix, declaration.iri))
            .collect();
        Self { block }
    }

    /// Rendered `PREFIX` lines, newline terminated.
    pub fn block(&self) -> &str {
        &self.block
    }

    /// Prepends the prefix block unless the statement already declares prefixes.
    ///
    /// The check is a plain substring match on `PREFIX`, so a statement that
    /// declares any prefix of its own is sent unchanged.
    pub fn apply<'a>(&self, query: &'a str) -> Cow<'a, str> {
        if self.block.is_empty() || query.contains("PREFIX") {
            Cow::Borrowed(query)
        } else {
            Cow::Owned(format!("{}{}", self.block, query))
        }
    }
}

impl Default for Namespaces {
    fn default() -> Self {
        Self::new(&PrefixDeclaration::defaults())
    }
}
