//! Tend CLI - a personal task, note, and calendar assistant.
//!
//! The `tend` command drives the same command set through two front ends:
//! `tend run <line...>` executes one command against the local terminal,
//! and `tend session` bridges a full dispatch loop over stdin/stdout the
//! way a remote line-oriented transport would.

mod commands;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use config::Config;

/// Tend - tasks, notes, and calendar from wherever you can type
#[derive(Parser, Debug)]
#[command(name = "tend", author, version, about)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// Configuration file (defaults to ~/.tend/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account configuration on this machine
    Init {
        /// Display name for the account
        name: String,
    },

    /// Execute one command line against the local terminal
    ///
    /// Example: `tend run todo list`
    Run {
        /// The command line, e.g. `todo new`
        line: Vec<String>,
    },

    /// Run a channel-bridged session over stdin/stdout
    ///
    /// Each stdin line is dispatched exactly as a remote transport would
    /// deliver it; prompts and replies share the same two streams.
    Session,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let level = args.log_level.parse::<Level>().unwrap_or(Level::WARN);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = args.config.unwrap_or_else(Config::default_path);

    let Some(command) = args.command else {
        Args::command().print_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Command::Init { name } => {
            commands::init(&name, &config_path)?;
        }
        Command::Run { line } => {
            let status = commands::run(&line, &config_path).await?;
            if status != 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Session => {
            commands::session(&config_path).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
