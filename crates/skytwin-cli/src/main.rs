//! SkyTwin CLI - run the airspace simulation from the terminal.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "skytwin")]
#[command(author, version, about = "SkyTwin - multi-agent airspace negotiation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default skytwin.toml
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Run the simulation headless and print statistics
    Run {
        /// Number of ticks to run (default: from skytwin.toml, else 200)
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Seed for a reproducible run
        #[arg(short, long)]
        seed: Option<u64>,

        /// Number of drones
        #[arg(short, long)]
        agents: Option<usize>,

        /// Reduced fleet for small displays
        #[arg(long)]
        compact: bool,

        /// Print the final snapshot as JSON instead of statistics
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Run {
            ticks,
            seed,
            agents,
            compact,
            json,
        } => commands::run::run(commands::run::RunOptions {
            ticks,
            seed,
            agents,
            compact,
            json,
            verbose: cli.verbose,
        }),
    }
}
