//! Vocabulary used by the schema and dereification helpers.

/// RDF namespace
pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// RDF Schema namespace
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";

/// Fixed namespace table (`rdf`, `rdfs`).
pub const NAMESPACE_TABLE: [(&str, &str); 2] = [("rdf", RDF), ("rdfs", RDFS)];

/// Looks up a namespace IRI in [`NAMESPACE_TABLE`].
pub fn namespace(prefix: &str) -> Option<&'static str> {
    NAMESPACE_TABLE
        .iter()
        .find(|(name, _)| *name == prefix)
        .map(|(_, iri)| *iri)
}

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDF_PROPERTY: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Property";
pub const RDF_CLASS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Class";
pub const RDFS_DOMAIN: &str = "http://www.w3.org/2000/01/rdf-schema#domain";
pub const RDFS_RANGE: &str = "http://www.w3.org/2000/01/rdf-schema#range";

/// Diachron record: the subject of the reified triple
pub const DIACHRON_SUBJECT: &str = "http://www.diachron-fp7.eu/resource/subject";
/// Diachron record: link to a record attribute
pub const DIACHRON_HAS_RECORD_ATTRIBUTE: &str =
    "http://www.diachron-fp7.eu/resource/hasRecordAttribute";
/// Diachron record attribute: predicate
pub const DIACHRON_PREDICATE: &str = "http://www.diachron-fp7.eu/resource/predicate";
/// Diachron record attribute: object
pub const DIACHRON_OBJECT: &str = "http://www.diachron-fp7.eu/resource/object";
