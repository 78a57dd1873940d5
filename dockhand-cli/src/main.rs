//! Dockhand CLI - operator tooling for the on-disk document store.
//!
//! The document store layout (`{data_root}/{instance_id}/{location}/`) is
//! a stable contract; this binary is the reference consumer. It lists,
//! shows and counts documents without going through a running agent.
//!
//! # Configuration
//!
//! Settings are loaded from `~/.dockhand/config.ini` on startup. CLI
//! arguments override config file values when specified.

mod error;

use clap::{Parser, Subcommand};
use dockhand::config::ConfigFile;
use dockhand::document::DocumentState;
use dockhand::store::{DocumentLocation, FileDocumentStore};
use error::CliError;
use std::path::PathBuf;

// ============================================================================
// CLI Argument Definitions
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "dockhand",
    version = dockhand::VERSION,
    about = "Inspect the dockhand document store"
)]
struct Cli {
    /// Root of the document store (overrides config file)
    #[arg(long, global = true)]
    data_root: Option<PathBuf>,

    /// Instance id to inspect (overrides config file)
    #[arg(long, global = true)]
    instance_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List document ids, for one location or all four
    List {
        /// Location to list: pending, current, completed or corrupt
        #[arg(long)]
        location: Option<String>,
    },

    /// Locate a document and print its JSON state
    Show {
        /// The document id to look up
        document_id: String,
    },

    /// Per-location document counts
    Stats,
}

// ============================================================================
// Entry Point
// ============================================================================

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    let config = ConfigFile::load()?;
    let data_root = cli.data_root.unwrap_or(config.agent.data_root);
    let instance_id = cli.instance_id.unwrap_or(config.agent.instance_id);
    let store = FileDocumentStore::new(data_root, instance_id);

    match cli.command {
        Commands::List { location } => {
            let locations = match location {
                Some(raw) => vec![parse_location(&raw)?],
                None => DocumentLocation::ALL.to_vec(),
            };
            for location in locations {
                let mut ids = store.list(location).await?;
                ids.sort();
                println!("{location} ({}):", ids.len());
                for id in ids {
                    println!("  {id}");
                }
            }
        }

        Commands::Show { document_id } => {
            let (location, doc) = find_document(&store, &document_id).await?;
            println!("# location: {location}");
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }

        Commands::Stats => {
            for location in DocumentLocation::ALL {
                let count = store.list(location).await?.len();
                println!("{:<12} {count}", location.to_string());
            }
        }
    }

    Ok(())
}

fn parse_location(raw: &str) -> Result<DocumentLocation, CliError> {
    raw.parse().map_err(CliError::InvalidArgument)
}

/// Looks a document up across all four locations, lifecycle order.
async fn find_document(
    store: &FileDocumentStore,
    document_id: &str,
) -> Result<(DocumentLocation, DocumentState), CliError> {
    for location in DocumentLocation::ALL {
        match store.load(document_id, location).await {
            Ok(doc) => return Ok((location, doc)),
            Err(err) if err.is_not_found() => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Err(CliError::DocumentNotFound(document_id.to_string()))
}
