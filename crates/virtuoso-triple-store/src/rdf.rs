//! RDF terms, triples and formats accepted by the manager.
//!
//! Caller strings never reach a statement directly: IRIs are validated with
//! [`NamedNode::new`] and literals are serialized through the oxigraph model,
//! which escapes quotes, backslashes and line breaks.

use std::{fmt, path::Path, str::FromStr};

use oxigraph::model::{Literal, NamedNode, Term};

use crate::error::{Result, TripleStoreError};

/// Parses an absolute IRI (graph name, subject, predicate or IRI object).
pub fn parse_iri(value: &str) -> Result<NamedNode> {
    NamedNode::new(value).map_err(|e| TripleStoreError::InvalidIri {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Whether the object of a triple is an IRI or a literal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Iri,
    Literal,
}

/// A single triple ready to be written into an `INSERT DATA` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdfTriple {
    subject: NamedNode,
    predicate: NamedNode,
    object: Term,
}

impl RdfTriple {
    /// Builds a triple whose object is interpreted according to `kind`.
    pub fn new(subject: &str, predicate: &str, object: &str, kind: ObjectKind) -> Result<Self> {
        let object = match kind {
            ObjectKind::Iri => Term::from(parse_iri(object)?),
            ObjectKind::Literal => Term::from(Literal::new_simple_literal(object)),
        };
        Ok(Self {
            subject: parse_iri(subject)?,
            predicate: parse_iri(predicate)?,
            object,
        })
    }

    pub fn iri(subject: &str, predicate: &str, object: &str) -> Result<Self> {
        Self::new(subject, predicate, object, ObjectKind::Iri)
    }

    pub fn literal(subject: &str, predicate: &str, object: &str) -> Result<Self> {
        Self::new(subject, predicate, object, ObjectKind::Literal)
    }

    /// Builds a triple with an already constructed (possibly typed) literal.
    pub fn typed(subject: &str, predicate: &str, object: impl Into<Literal>) -> Result<Self> {
        Ok(Self {
            subject: parse_iri(subject)?,
            predicate: parse_iri(predicate)?,
            object: Term::from(object.into()),
        })
    }

    pub fn subject(&self) -> &NamedNode {
        &self.subject
    }

    pub fn predicate(&self) -> &NamedNode {
        &self.predicate
    }

    pub fn object(&self) -> &Term {
        &self.object
    }

    pub fn object_kind(&self) -> ObjectKind {
        match self.object {
            Term::Literal(_) => ObjectKind::Literal,
            _ => ObjectKind::Iri,
        }
    }
}

/// N-Triples form without the terminating ` .`
impl fmt::Display for RdfTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

/// Serialization formats for imports, exports and the bulk loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    RdfXml,
    Turtle,
    N3,
    NTriples,
}

impl RdfFormat {
    pub fn media_type(&self) -> &'static str {
        match self {
            RdfFormat::RdfXml => "application/rdf+xml",
            RdfFormat::Turtle => "text/turtle",
            RdfFormat::N3 => "text/rdf+n3",
            RdfFormat::NTriples => "application/n-triples",
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self {
            RdfFormat::RdfXml => "rdf",
            RdfFormat::Turtle => "ttl",
            RdfFormat::N3 => "n3",
            RdfFormat::NTriples => "nt",
        }
    }

    /// File mask handed to `ld_dir`.
    pub fn loader_mask(&self) -> String {
        format!("*.{}", self.file_extension())
    }

    /// Guesses the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "rdf" | "xml" | "owl" => Some(RdfFormat::RdfXml),
            "ttl" => Some(RdfFormat::Turtle),
            "n3" => Some(RdfFormat::N3),
            "nt" => Some(RdfFormat::NTriples),
            _ => None,
        }
    }
}

impl fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RdfFormat::RdfXml => "RDF/XML",
            RdfFormat::Turtle => "Turtle",
            RdfFormat::N3 => "N3",
            RdfFormat::NTriples => "N-Triples",
        };
        f.write_str(name)
    }
}

impl FromStr for RdfFormat {
    type Err = TripleStoreError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rdfxml" | "rdf/xml" | "rdf" | "xml" => Ok(RdfFormat::RdfXml),
            "turtle" | "ttl" => Ok(RdfFormat::Turtle),
            "n3" => Ok(RdfFormat::N3),
            "ntriples" | "n-triples" | "nt" => Ok(RdfFormat::NTriples),
            other => Err(TripleStoreError::InvalidInput {
                reason: format!("unknown RDF format '{other}'"),
            }),
        }
    }
}
