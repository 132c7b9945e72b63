use std::io::Write;

use virtuoso_triple_store::{QuerySolutions, TripleStoreManager};

use crate::{cli::CliCommand, error::AppError};

/// Runs one command against the manager; results go to `out`.
pub(crate) async fn execute(
    manager: &TripleStoreManager,
    command: CliCommand,
    out: &mut impl Write,
) -> Result<(), AppError> {
    match command {
        CliCommand::Count { graph } => {
            let count = match graph {
                Some(graph) => manager.count_triples(&graph).await?,
                None => manager.count_all_triples().await?,
            };
            writeln!(out, "{count}")?;
        }
        CliCommand::Exists { graph } => {
            writeln!(out, "{}", manager.graph_exists(&graph).await?)?;
        }
        CliCommand::Clear { graph } => {
            manager.clear_graph(&graph).await?;
            tracing::info!(graph = %graph, "Graph cleared");
        }
        CliCommand::Copy {
            source,
            destination,
        } => {
            manager.copy_graph(&source, &destination).await?;
            tracing::info!(source = %source, destination = %destination, "Graph copied");
        }
        CliCommand::Rename { old_name, new_name } => {
            manager.rename_graph(&old_name, &new_name).await?;
            tracing::info!(old_name = %old_name, new_name = %new_name, "Graph renamed");
        }
        CliCommand::AddTriple {
            subject,
            predicate,
            object,
            graph,
            literal,
        } => {
            if literal {
                manager
                    .add_literal_triple(&subject, &predicate, &object, &graph)
                    .await?;
            } else {
                manager
                    .add_triple(&subject, &predicate, &object, &graph)
                    .await?;
            }
        }
        CliCommand::BulkImport {
            folder,
            format,
            graph,
            incremental,
        } => {
            manager
                .bulk_import(&folder, format, &graph, incremental)
                .await?;
        }
        CliCommand::ImportFile {
            path,
            format,
            graph,
            server,
        } => {
            if server {
                manager.import_server_file(&path, format, &graph).await?;
            } else {
                manager.import_file(&path, format, &graph).await?;
            }
            tracing::info!(path = %path.display(), graph = %graph, "File imported");
        }
        CliCommand::Export {
            graph,
            format,
            output,
        } => match output {
            Some(path) => {
                manager.export_to_file(&path, format, &graph).await?;
                tracing::info!(path = %path.display(), graph = %graph, "Graph exported");
            }
            None => {
                let data = manager.export_graph(&graph, format).await?;
                out.write_all(&data)?;
            }
        },
        CliCommand::Select { query } => {
            let solutions = manager.execute_select(&query).await?;
            write_solutions(out, solutions)?;
        }
        CliCommand::Update { query } => {
            manager.execute_update(&query).await?;
        }
        CliCommand::Dereify {
            source,
            destination,
        } => {
            manager.dereify_graph(&source, &destination).await?;
            tracing::info!(source = %source, destination = %destination, "Graph dereified");
        }
    }

    out.flush()?;
    Ok(())
}

/// Header line of variable names, then one tab-separated line per row.
/// Unbound values are left empty.
fn write_solutions(out: &mut impl Write, solutions: QuerySolutions) -> std::io::Result<()> {
    writeln!(out, "{}", solutions.variables().join("\t"))?;
    for row in solutions {
        let line: Vec<String> = row
            .iter()
            .map(|(_, value)| value.map(ToString::to_string).unwrap_or_default())
            .collect();
        writeln!(out, "{}", line.join("\t"))?;
    }
    Ok(())
}
