use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "wager", about = "Wager debt ledger and session tracker", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// JSON data file
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Print the global ledger
    Ledger,
    /// Register or list users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Add or list games
    Game {
        #[command(subcommand)]
        action: GameAction,
    },
    /// Check every aggregate ledger against its sources
    Reconcile(ReconcileArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Overrides `bind_addr` from the config
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Subcommand)]
pub enum UserAction {
    Add { name: String },
    List,
}

#[derive(Subcommand)]
pub enum GameAction {
    Add { name: String },
    List,
}

#[derive(Args)]
pub struct ReconcileArgs {
    /// Rewrite drifted ledgers with their derived values
    #[arg(long)]
    pub repair: bool,
}
