//! Lycan - AI players for chat werewolf
//!
//! Runs agents against an in-memory game table, either interactively or as
//! an unattended simulation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use lycan::ai::{self, ResponseGenerator, ScriptedGenerator};
use lycan::cli::simulate::SimulationOptions;
use lycan::Config;

/// Lycan - AI players for chat werewolf
#[derive(Parser)]
#[command(
    name = "lycan",
    author,
    version,
    about = "AI players for a chat-based werewolf game",
    long_about = r#"
Lycan runs AI agents that chat and vote in a werewolf game.

Agents reply through a Gemini model when LYCAN_MODEL_NAME and LYCAN_API_KEY
(or GEMINI_MODEL_NAME / GEMINI_API_KEY) are set. Without them they stay silent
unless --offline is given.

Examples:
  lycan                                  Start interactive console
  lycan console --offline                Console with canned agent replies
  lycan simulate --humans 3 --agents 2   Simulate one day
  lycan --config lycan.toml simulate     Use settings from a TOML file
"#
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Use canned replies instead of a model
    #[arg(long, global = true)]
    offline: bool,

    /// Seed for agent selection and delays
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive console (default)
    #[command(alias = "cli", alias = "repl")]
    Console,

    /// Run one day at a local table and print what happens
    #[command(alias = "sim")]
    Simulate(SimulateArgs),

    /// Display version and build information
    Info,
}

#[derive(Args)]
struct SimulateArgs {
    /// Human players at the table
    #[arg(long, default_value = "3")]
    humans: usize,

    /// AI agents at the table
    #[arg(long, default_value = "2")]
    agents: usize,

    /// Length of the day in seconds
    #[arg(long, default_value = "60")]
    seconds: u64,
}

const OFFLINE_REPLIES: [&str; 5] = [
    "i dont trust anyone yet",
    "who was quiet last night?",
    "hmm",
    "lets not rush the vote",
    "none",
];

fn generator_for(cli: &Cli, config: &Config) -> Option<Arc<dyn ResponseGenerator>> {
    if cli.offline {
        return Some(Arc::new(ScriptedGenerator::new(OFFLINE_REPLIES)));
    }
    ai::backend_from_config(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only when RUST_LOG is set)
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt::init();
    }

    let cli = Cli::parse();

    if let Some(Commands::Info) = &cli.command {
        println!("Lycan - AI players for chat werewolf");
        println!("Version: {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Features:");
        #[cfg(feature = "gemini")]
        println!("  - Gemini backend (reqwest)");
        #[cfg(not(feature = "gemini"))]
        println!("  - Gemini backend: disabled");
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?.with_overrides(|name| std::env::var(name).ok()),
        None => Config::from_env(),
    };
    if cli.seed.is_some() {
        config.rng_seed = cli.seed;
    }
    let generator = generator_for(&cli, &config);

    match cli.command {
        None | Some(Commands::Console) => {
            lycan::cli::console::run(config, generator).await?;
        }

        Some(Commands::Simulate(args)) => {
            let options = SimulationOptions {
                humans: args.humans,
                agents: args.agents,
                duration: Duration::from_secs(args.seconds),
                echo: true,
            };
            let report = lycan::cli::simulate::run(config, generator, options).await?;

            println!();
            println!("{} messages from agents.", report.messages.len());
            if report.votes.is_empty() {
                println!("No votes were cast.");
            }
            for (voter, target) in &report.votes {
                println!("  {} -> {}", voter, target);
            }
        }

        Some(Commands::Info) => {
            // Handled early, before initialization
            unreachable!()
        }
    }

    Ok(())
}
