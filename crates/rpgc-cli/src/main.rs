//! CLI frontend for the RPG companion tracker pipeline.

mod commands;

use std::io;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(
    name = "rpgc",
    about = "RPG companion: parse tracker blocks, build prompts, replay chat sessions",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the tracker sections from a model response
    Parse {
        /// Response file, or - for stdin
        input: PathBuf,

        /// Print the sections as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the fields parsed from a response's tracker sections
    Stats {
        /// Response file, or - for stdin
        input: PathBuf,

        /// Print the parsed stats as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a response with its tracker blocks removed
    Clean {
        /// Response file, or - for stdin
        input: PathBuf,
    },

    /// Show the prompt the next generation would receive
    Prompt {
        /// Session directory
        #[arg(short, long, default_value = ".rpgc")]
        dir: PathBuf,

        /// Player name used in the prompt
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Check a saved settings file and repair it if needed
    Validate {
        /// Settings JSON file
        file: PathBuf,

        /// Write the repaired settings back to the file
        #[arg(long)]
        fix: bool,
    },

    /// Run an interactive companion session
    Play {
        /// Session directory
        #[arg(short, long, default_value = ".rpgc")]
        dir: PathBuf,

        /// Player name
        #[arg(short, long)]
        user: Option<String>,

        /// RNG seed for reproducible dice
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Parse { input, json } => commands::parse::run(&input, json),
        Commands::Stats { input, json } => commands::stats::run(&input, json),
        Commands::Clean { input } => commands::clean::run(&input),
        Commands::Prompt { dir, user } => commands::prompt::run(&dir, user.as_deref()),
        Commands::Validate { file, fix } => commands::validate::run(&file, fix),
        Commands::Play { dir, user, seed } => commands::play::run(&dir, user.as_deref(), seed),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
