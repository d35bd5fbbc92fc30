//! Skirmish CLI - run, watch, replay and benchmark matches.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

/// Skirmish - a deterministic RTS simulation
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log debug events to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single headless match
    Run {
        #[command(flatten)]
        setup: cli::MatchArgs,

        /// Output format: text, json, or summary
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Save recording to file
        #[arg(long)]
        save: Option<PathBuf>,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Play a match in an interactive TUI
    Watch {
        #[command(flatten)]
        setup: cli::MatchArgs,

        /// Delay between ticks in milliseconds (default: 100)
        #[arg(long, default_value = "100")]
        speed: u64,

        /// Save recording to file on exit
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Replay a recorded match
    Replay {
        /// Recording file (.json)
        #[arg(required = true)]
        recording: PathBuf,

        /// Output format: tui, text, or summary
        #[arg(short, long, default_value = "tui")]
        format: cli::ReplayFormat,

        /// Start at specific tick
        #[arg(short, long)]
        tick: Option<u64>,

        /// Print every Nth tick in text formats
        #[arg(long, default_value = "1")]
        every: u64,
    },

    /// Run many headless matches in parallel and aggregate statistics
    Tournament {
        #[command(flatten)]
        setup: cli::MatchArgs,

        /// Number of matches to run (default: 100)
        #[arg(short, long, default_value = "100")]
        games: u64,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::TournamentFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.verbose {
            EnvFilter::new("skirmish=debug")
        } else {
            EnvFilter::new("skirmish=warn")
        }
    });
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match args.command {
        Commands::Run {
            setup,
            format,
            save,
            quiet,
        } => cli::run::execute(&setup, format, save.as_deref(), quiet),

        Commands::Watch { setup, speed, save } => {
            cli::watch::execute(&setup, speed, save.as_deref())
        }

        Commands::Replay {
            recording,
            format,
            tick,
            every,
        } => cli::replay::execute(recording, format, tick, every),

        Commands::Tournament {
            setup,
            games,
            threads,
            format,
            progress,
        } => cli::tournament::execute(&setup, games, threads, format, progress),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
