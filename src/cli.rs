use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use virtuoso_triple_store::RdfFormat;

use crate::error::AppError;

/// A parsed subcommand.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CliCommand {
    Count {
        graph: Option<String>,
    },
    Exists {
        graph: String,
    },
    Clear {
        graph: String,
    },
    Copy {
        source: String,
        destination: String,
    },
    Rename {
        old_name: String,
        new_name: String,
    },
    AddTriple {
        subject: String,
        predicate: String,
        object: String,
        graph: String,
        literal: bool,
    },
    BulkImport {
        folder: PathBuf,
        format: RdfFormat,
        graph: String,
        incremental: bool,
    },
    ImportFile {
        path: PathBuf,
        format: RdfFormat,
        graph: String,
        server: bool,
    },
    Export {
        graph: String,
        format: RdfFormat,
        output: Option<PathBuf>,
    },
    Select {
        query: String,
    },
    Update {
        query: String,
    },
    Dereify {
        source: String,
        destination: String,
    },
}

/// Global options plus the subcommand to run.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CliArgs {
    pub config: Option<PathBuf>,
    /// Number of `-v` flags
    pub verbosity: u8,
    pub command: CliCommand,
}

fn parse_format(value: &str) -> Result<RdfFormat, String> {
    value.parse::<RdfFormat>().map_err(|e| e.to_string())
}

fn graph_arg() -> Arg {
    Arg::new("graph")
        .short('g')
        .long("graph")
        .value_name("IRI")
        .required(true)
        .help("Named graph IRI")
}

fn format_arg() -> Arg {
    Arg::new("format")
        .short('f')
        .long("format")
        .value_name("FORMAT")
        .value_parser(parse_format)
        .help("RDF format: rdfxml, turtle, n3 or ntriples")
}

pub(crate) fn build() -> Command {
    Command::new("virtuoso-rep")
        .about("SPARQL, bulk loading and graph management for a Virtuoso triple store")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Sets a custom config file (.toml format)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Log store traffic: -v for debug, -vv for trace"),
        )
        .subcommand(
            Command::new("count")
                .about("Count the triples of a graph, or of the whole store")
                .arg(
                    Arg::new("graph")
                        .short('g')
                        .long("graph")
                        .value_name("IRI")
                        .help("Named graph IRI; omit to count every graph"),
                ),
        )
        .subcommand(
            Command::new("exists")
                .about("Report whether a graph holds any triple")
                .arg(Arg::new("graph").value_name("IRI").required(true)),
        )
        .subcommand(
            Command::new("clear")
                .about("Remove every triple of a graph")
                .arg(Arg::new("graph").value_name("IRI").required(true)),
        )
        .subcommand(
            Command::new("copy")
                .about("Copy the triples of one graph into another")
                .arg(Arg::new("source").value_name("SOURCE").required(true))
                .arg(Arg::new("destination").value_name("DESTINATION").required(true)),
        )
        .subcommand(
            Command::new("rename")
                .about("Move the triples of a graph under a new name")
                .arg(Arg::new("old").value_name("OLD").required(true))
                .arg(Arg::new("new").value_name("NEW").required(true)),
        )
        .subcommand(
            Command::new("add-triple")
                .about("Insert a single triple")
                .arg(Arg::new("subject").value_name("SUBJECT").required(true))
                .arg(Arg::new("predicate").value_name("PREDICATE").required(true))
                .arg(Arg::new("object").value_name("OBJECT").required(true))
                .arg(graph_arg())
                .arg(
                    Arg::new("literal")
                        .long("literal")
                        .action(ArgAction::SetTrue)
                        .help("Store the object as a plain literal instead of an IRI"),
                ),
        )
        .subcommand(
            Command::new("bulk-import")
                .about("Run the server-side bulk loader over a folder on the Virtuoso host")
                .arg(Arg::new("folder").value_name("FOLDER").required(true).value_parser(value_parser!(PathBuf)))
                .arg(graph_arg())
                .arg(format_arg().required(true))
                .arg(
                    Arg::new("incremental")
                        .long("incremental")
                        .action(ArgAction::SetTrue)
                        .help("Keep the existing triples of the graph"),
                ),
        )
        .subcommand(
            Command::new("import-file")
                .about("Load one RDF file into a graph")
                .arg(Arg::new("path").value_name("PATH").required(true).value_parser(value_parser!(PathBuf)))
                .arg(graph_arg())
                .arg(format_arg())
                .arg(
                    Arg::new("server")
                        .long("server")
                        .action(ArgAction::SetTrue)
                        .help("PATH is on the Virtuoso host; load it with the server-side parser"),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Serialize a graph to a file or stdout")
                .arg(Arg::new("graph").value_name("IRI").required(true))
                .arg(format_arg())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .value_parser(value_parser!(PathBuf))
                        .help("Destination file; stdout when omitted"),
                ),
        )
        .subcommand(
            Command::new("select")
                .about("Run a SPARQL SELECT and print the rows tab-separated")
                .arg(Arg::new("query").value_name("QUERY").required(true)),
        )
        .subcommand(
            Command::new("update")
                .about("Run a SPARQL UPDATE")
                .arg(Arg::new("query").value_name("QUERY").required(true)),
        )
        .subcommand(
            Command::new("dereify")
                .about("Rebuild plain triples from a graph of diachron records")
                .arg(Arg::new("source").value_name("SOURCE").required(true))
                .arg(Arg::new("destination").value_name("DESTINATION").required(true)),
        )
}

fn string(matches: &ArgMatches, id: &str) -> String {
    matches.get_one::<String>(id).cloned().unwrap_or_default()
}

fn path(matches: &ArgMatches, id: &str) -> PathBuf {
    matches.get_one::<PathBuf>(id).cloned().unwrap_or_default()
}

fn format_or_guess(matches: &ArgMatches, path: &std::path::Path) -> Result<RdfFormat, AppError> {
    if let Some(format) = matches.get_one::<RdfFormat>("format") {
        return Ok(*format);
    }
    RdfFormat::from_path(path).ok_or_else(|| {
        AppError::InvalidArguments(format!(
            "cannot guess the RDF format of {}; pass --format",
            path.display()
        ))
    })
}

pub(crate) fn parse(matches: &ArgMatches) -> Result<CliArgs, AppError> {
    let config = matches.get_one::<PathBuf>("config").cloned();
    let verbosity = matches.get_count("verbose");

    let command = match matches.subcommand() {
        Some(("count", sub)) => CliCommand::Count {
            graph: sub.get_one::<String>("graph").cloned(),
        },
        Some(("exists", sub)) => CliCommand::Exists {
            graph: string(sub, "graph"),
        },
        Some(("clear", sub)) => CliCommand::Clear {
            graph: string(sub, "graph"),
        },
        Some(("copy", sub)) => CliCommand::Copy {
            source: string(sub, "source"),
            destination: string(sub, "destination"),
        },
        Some(("rename", sub)) => CliCommand::Rename {
            old_name: string(sub, "old"),
            new_name: string(sub, "new"),
        },
        Some(("add-triple", sub)) => CliCommand::AddTriple {
            subject: string(sub, "subject"),
            predicate: string(sub, "predicate"),
            object: string(sub, "object"),
            graph: string(sub, "graph"),
            literal: sub.get_flag("literal"),
        },
        Some(("bulk-import", sub)) => {
            let folder = path(sub, "folder");
            CliCommand::BulkImport {
                format: format_or_guess(sub, &folder)?,
                folder,
                graph: string(sub, "graph"),
                incremental: sub.get_flag("incremental"),
            }
        }
        Some(("import-file", sub)) => {
            let path = path(sub, "path");
            CliCommand::ImportFile {
                format: format_or_guess(sub, &path)?,
                path,
                graph: string(sub, "graph"),
                server: sub.get_flag("server"),
            }
        }
        Some(("export", sub)) => {
            let output = sub.get_one::<PathBuf>("output").cloned();
            let format = match (sub.get_one::<RdfFormat>("format"), &output) {
                (Some(format), _) => *format,
                (None, Some(output)) => RdfFormat::from_path(output).unwrap_or(RdfFormat::NTriples),
                (None, None) => RdfFormat::NTriples,
            };
            CliCommand::Export {
                graph: string(sub, "graph"),
                format,
                output,
            }
        }
        Some(("select", sub)) => CliCommand::Select {
            query: string(sub, "query"),
        },
        Some(("update", sub)) => CliCommand::Update {
            query: string(sub, "query"),
        },
        Some(("dereify", sub)) => CliCommand::Dereify {
            source: string(sub, "source"),
            destination: string(sub, "destination"),
        },
        Some((other, _)) => {
            return Err(AppError::InvalidArguments(format!("unknown command '{other}'")));
        }
        None => return Err(AppError::InvalidArguments("no command given".to_string())),
    };

    Ok(CliArgs {
        config,
        verbosity,
        command,
    })
}
