//! Virtuoso SQL statements: bulk loader, single-file loaders and the quad table.

use std::path::Path;

use oxigraph::model::NamedNode;

use crate::error::{Result, TripleStoreError};

pub(crate) const CLEAR_LOAD_LIST: &str = "DELETE FROM DB.DBA.load_list";
pub(crate) const RUN_LOADER: &str = "rdf_loader_run()";
pub(crate) const CHECKPOINT: &str = "checkpoint";

/// Quotes a value as a Virtuoso SQL string literal.
///
/// Single quotes are doubled and backslashes escaped; control characters are
/// rejected because `isql` reads statements line by line.
pub(crate) fn sql_string(value: &str) -> Result<String> {
    if let Some(c) = value.chars().find(|c| c.is_control()) {
        return Err(TripleStoreError::InvalidInput {
            reason: format!("control character {c:?} in SQL string argument"),
        });
    }
    let escaped = value.replace('\\', "\\\\").replace('\'', "''");
    Ok(format!("'{escaped}'"))
}

fn path_string(path: &Path) -> Result<String> {
    let value = path.to_str().ok_or_else(|| TripleStoreError::InvalidInput {
        reason: format!("path {} is not valid UTF-8", path.display()),
    })?;
    if value.is_empty() {
        return Err(TripleStoreError::InvalidInput {
            reason: "empty path".to_string(),
        });
    }
    sql_string(value)
}

/// `ld_dir(folder, mask, graph)`: queue every matching file of a server-side folder.
pub(crate) fn enqueue_directory(folder: &Path, mask: &str, graph: &NamedNode) -> Result<String> {
    Ok(format!(
        "ld_dir({}, {}, {})",
        path_string(folder)?,
        sql_string(mask)?,
        sql_string(graph.as_str())?
    ))
}

pub(crate) fn load_rdfxml_file(path: &Path, graph: &NamedNode) -> Result<String> {
    Ok(format!(
        "DB.DBA.RDF_LOAD_RDFXML_MT(file_to_string_output({}), '', {})",
        path_string(path)?,
        sql_string(graph.as_str())?
    ))
}

/// Turtle loader; also accepts N-Triples and N3 content.
pub(crate) fn load_turtle_file(path: &Path, graph: &NamedNode) -> Result<String> {
    Ok(format!(
        "DB.DBA.TTLP_MT(file_to_string_output({}), '', {})",
        path_string(path)?,
        sql_string(graph.as_str())?
    ))
}

/// Re-labels every quad of `old_name` in place through the GS index.
pub(crate) fn rename_graph(old_name: &NamedNode, new_name: &NamedNode) -> Result<String> {
    Ok(format!(
        "UPDATE DB.DBA.RDF_QUAD TABLE OPTION (index RDF_QUAD_GS) \
         SET g = iri_to_id ({}) \
         WHERE g = iri_to_id ({}, 0)",
        sql_string(new_name.as_str())?,
        sql_string(old_name.as_str())?
    ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::rdf::parse_iri;

    #[test]
    fn sql_strings_double_quotes_and_escape_backslashes() {
        assert_eq!(sql_string("plain").unwrap(), "'plain'");
        assert_eq!(sql_string("O'Brien").unwrap(), "'O''Brien'");
        assert_eq!(sql_string(r"C:\data").unwrap(), r"'C:\\data'");
        assert!(sql_string("a\nb").is_err());
    }

    #[test]
    fn enqueue_escapes_every_argument() {
        let graph = parse_iri("http://example.org/it's").unwrap();
        let statement =
            enqueue_directory(Path::new("/data/o'neil"), "*.nt", &graph).unwrap();

        assert_eq!(
            statement,
            "ld_dir('/data/o''neil', '*.nt', 'http://example.org/it''s')"
        );
    }

    #[test]
    fn rename_targets_the_quad_table() {
        let old_name = parse_iri("http://example.org/old").unwrap();
        let new_name = parse_iri("http://example.org/new").unwrap();

        assert_eq!(
            rename_graph(&old_name, &new_name).unwrap(),
            "UPDATE DB.DBA.RDF_QUAD TABLE OPTION (index RDF_QUAD_GS) \
             SET g = iri_to_id ('http://example.org/new') \
             WHERE g = iri_to_id ('http://example.org/old', 0)"
        );
    }

    #[test]
    fn empty_paths_are_rejected() {
        let graph = parse_iri("http://example.org/g").unwrap();
        assert!(load_turtle_file(Path::new(""), &graph).is_err());
    }
}
