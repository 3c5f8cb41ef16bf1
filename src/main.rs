//! curricle CLI: curriculum knowledge graph toolkit.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use curricle::export;
use curricle::graph::query::{Query, evaluate_lenient};
use curricle::graph::schema::describe_schema;
use curricle::graph::{CurriculumGraph, expand::expand_ancestors};
use curricle::import::{
    HierarchyFormat, enrich_subjects, import_hierarchy, link_additions, link_pairs,
    parse_arrow_line,
};
use curricle::node::NodeKind;
use curricle::turtle;

#[derive(Parser)]
#[command(name = "curricle", version, about = "Curriculum knowledge graph toolkit")]
struct Cli {
    /// Path of the Turtle graph file commands load and save.
    #[arg(long, global = true, default_value = "curriculum.ttl")]
    graph: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a fresh graph from a hierarchy document.
    Import {
        /// Path to the hierarchy text file.
        file: PathBuf,

        /// Line grammar of the document.
        #[arg(long, value_enum, default_value_t = HierarchyFormat::Marker)]
        format: HierarchyFormat,
    },

    /// Add prerequisite edges from an arrow-line document.
    Link {
        /// Path to a file of `A -> B` lines.
        file: PathBuf,

        /// Node kind the labels resolve against.
        #[arg(long, default_value = "Section")]
        kind: NodeKind,
    },

    /// Add prerequisite edges between Concepts from a freeform review document.
    Additions {
        /// Path to the markdown checklist file.
        file: PathBuf,
    },

    /// Attach grade and classification attributes to Subjects.
    Enrich {
        /// Path to a `Subject -> Grade, Classification` file.
        file: PathBuf,
    },

    /// Generate markdown reports from the graph.
    Export {
        #[command(subcommand)]
        action: ExportAction,
    },

    /// Print the schema description of the stored graph.
    Schema,

    /// Evaluate a JSON pattern query against the graph.
    Query {
        /// Path to the JSON query file.
        file: PathBuf,

        /// Emit rows as JSON instead of tab-separated text.
        #[arg(long)]
        json: bool,
    },

    /// Expand labels to their structural ancestor closure.
    Expand {
        /// Comma-separated labels to expand.
        labels: String,
    },

    /// Show prerequisite connections of every node with a label.
    Inspect {
        /// Label to look up.
        label: String,
    },

    /// Show node and edge counts.
    Info,
}

#[derive(Subcommand)]
enum ExportAction {
    /// Write the editable hierarchy report.
    Hierarchy {
        /// Output file; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write the prerequisite listing.
    Prereqs {
        /// Output file; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn emit(text: &str, out: Option<&PathBuf>) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, text).into_diagnostic()?;
            println!("Wrote {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Import { file, format } => {
            let text = std::fs::read_to_string(&file).into_diagnostic()?;
            let mut graph = CurriculumGraph::new();
            let report = import_hierarchy(&mut graph, &text, format);
            turtle::save_to(&graph, &cli.graph).into_diagnostic()?;
            println!("Imported {}: {report}", file.display());
            println!("Saved to {}", cli.graph.display());
        }

        Commands::Link { file, kind } => {
            let text = std::fs::read_to_string(&file).into_diagnostic()?;
            let pairs: Vec<(String, String)> =
                text.lines().filter_map(parse_arrow_line).collect();
            if pairs.is_empty() {
                miette::bail!("no `A -> B` lines found in {}", file.display());
            }
            let mut graph = turtle::load_from(&cli.graph).into_diagnostic()?;
            let report = link_pairs(&mut graph, &pairs, kind);
            turtle::save_to(&graph, &cli.graph).into_diagnostic()?;
            println!("{report}");
            for diagnostic in &report.diagnostics {
                println!("  {diagnostic}");
            }
        }

        Commands::Additions { file } => {
            let text = std::fs::read_to_string(&file).into_diagnostic()?;
            let mut graph = turtle::load_from(&cli.graph).into_diagnostic()?;
            let report = link_additions(&mut graph, &text);
            turtle::save_to(&graph, &cli.graph).into_diagnostic()?;
            println!("{report}");
            for diagnostic in &report.diagnostics {
                println!("  {diagnostic}");
            }
        }

        Commands::Enrich { file } => {
            let text = std::fs::read_to_string(&file).into_diagnostic()?;
            let mut graph = turtle::load_from(&cli.graph).into_diagnostic()?;
            let report = enrich_subjects(&mut graph, &text);
            turtle::save_to(&graph, &cli.graph).into_diagnostic()?;
            println!("{report}");
            for diagnostic in &report.diagnostics {
                println!("  {diagnostic}");
            }
        }

        Commands::Export { action } => {
            let graph = turtle::load_from(&cli.graph).into_diagnostic()?;
            match action {
                ExportAction::Hierarchy { out } => {
                    emit(&export::hierarchy_report(&graph), out.as_ref())?;
                }
                ExportAction::Prereqs { out } => {
                    emit(&export::prerequisites_report(&graph), out.as_ref())?;
                }
            }
        }

        Commands::Schema => {
            let graph = turtle::load_from(&cli.graph).into_diagnostic()?;
            print!("{}", describe_schema(&graph));
        }

        Commands::Query { file, json } => {
            let text = std::fs::read_to_string(&file).into_diagnostic()?;
            let query: Query = serde_json::from_str(&text).into_diagnostic()?;
            let graph = turtle::load_from(&cli.graph).into_diagnostic()?;

            let outcome = evaluate_lenient(&graph, &query);
            if let Some(reason) = &outcome.reason {
                eprintln!("query rejected: {reason}");
            }
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&outcome).into_diagnostic()?
                );
            } else {
                for row in &outcome.rows {
                    let cells: Vec<&str> = row
                        .values()
                        .map(|v| v.as_deref().unwrap_or("-"))
                        .collect();
                    println!("{}", cells.join("\t"));
                }
                println!("({} rows)", outcome.rows.len());
            }
        }

        Commands::Expand { labels } => {
            let graph = turtle::load_from(&cli.graph).into_diagnostic()?;
            let seeds: Vec<&str> = labels.split(',').map(str::trim).collect();
            for label in expand_ancestors(&graph, seeds) {
                println!("{label}");
            }
        }

        Commands::Inspect { label } => {
            let graph = turtle::load_from(&cli.graph).into_diagnostic()?;
            print!("{}", export::connection_summary(&graph, &label));
        }

        Commands::Info => {
            let graph = turtle::load_from(&cli.graph).into_diagnostic()?;
            println!("Graph: {}", cli.graph.display());
            println!("  nodes: {}", graph.node_count());
            for kind in NodeKind::ALL {
                println!("    {kind}: {}", graph.nodes_of_kind(kind).len());
            }
            println!("  edges: {}", graph.edge_count());
        }
    }

    Ok(())
}
