use crate::{
    TripleStoreManager,
    error::Result,
    query::vocab,
    rdf::RdfTriple,
};

impl TripleStoreManager {
    /// Declares `class` as an `rdf:Class` in `graph`.
    pub async fn add_schema_class(&self, class: &str, graph: &str) -> Result<()> {
        let triple = RdfTriple::iri(class, vocab::RDF_TYPE, vocab::RDF_CLASS)?;
        self.add_triples(&[triple], graph).await
    }

    /// Declares an object property with its domain and range classes.
    pub async fn add_schema_property(
        &self,
        property: &str,
        domain: &str,
        range: &str,
        graph: &str,
    ) -> Result<()> {
        let triples = [
            RdfTriple::iri(property, vocab::RDF_TYPE, vocab::RDF_PROPERTY)?,
            RdfTriple::iri(property, vocab::RDFS_DOMAIN, domain)?,
            RdfTriple::iri(property, vocab::RDFS_RANGE, range)?,
        ];
        self.add_triples(&triples, graph).await
    }

    /// Declares a datatype property. The range is stored as a plain literal
    /// (for example `"xsd:string"`), not as an IRI.
    pub async fn add_datatype_property(
        &self,
        property: &str,
        domain: &str,
        range: &str,
        graph: &str,
    ) -> Result<()> {
        let triples = [
            RdfTriple::iri(property, vocab::RDF_TYPE, vocab::RDF_PROPERTY)?,
            RdfTriple::iri(property, vocab::RDFS_DOMAIN, domain)?,
            RdfTriple::literal(property, vocab::RDFS_RANGE, range)?,
        ];
        self.add_triples(&triples, graph).await
    }
}
