use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

/// Road-mileage geocoding CLI tool
#[derive(Parser)]
#[command(name = "milepost")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Milestone CSV file
    #[arg(short, long, env = "MILEPOST_DATA", global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a road-position descriptor to coordinates
    Query {
        /// Descriptor, e.g. 台27線45K+200
        position: String,

        /// Include the bracketing milestones in the output
        #[arg(long)]
        debug: bool,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Convert a KML survey annotation file to milestone CSV
    Ingest {
        /// Input KML file
        input: PathBuf,

        /// Output CSV file (derived from input if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List roads in the milestone store
    List,

    /// Display information about one road
    Info {
        /// Road name, e.g. 台1線
        road: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Query {
            position,
            debug,
            json,
        } => commands::query::run(cli.data, &position, debug, json),
        Commands::Ingest { input, output } => commands::ingest::run(&input, output),
        Commands::List => commands::list::run(cli.data),
        Commands::Info { road } => commands::info::run(cli.data, &road),
    }
}
