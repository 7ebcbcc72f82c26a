use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{config, counter, handoff};

/// Prethread Command Line Interface
///
/// Runs small workloads on a pre-threaded pool.
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Pool configuration file (TOML)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Increment a shared counter from every thread under mutex 0
    Counter(counter::CounterArgs),

    /// Pass values between two threads through a pair of condition variables
    Handoff(handoff::HandoffArgs),

    /// Print the effective pool configuration as TOML
    Config,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let pool_config = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Counter(args) => counter::execute(pool_config, &args),
        Commands::Handoff(args) => handoff::execute(pool_config, &args),
        Commands::Config => config::execute(&pool_config),
    }
}
