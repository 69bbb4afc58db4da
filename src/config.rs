// Command-line / environment configuration for both binaries

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "investors.db";
pub const DEFAULT_CSV_PATH: &str = "data.csv";

/// Investor commitments data tool
#[derive(Parser, Debug)]
#[command(name = "investor-commitments", version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Drop all tables and reload them from a CSV file
    Import(ImportArgs),
    /// Print row counts of an existing database
    Stats(StatsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    /// Source CSV file
    #[arg(long, env = "INVESTORS_CSV", default_value = DEFAULT_CSV_PATH)]
    pub csv: PathBuf,

    /// SQLite database file (created if missing)
    #[arg(long, env = "INVESTORS_DB", default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    /// SQLite database file
    #[arg(long, env = "INVESTORS_DB", default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,
}

/// API server arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "investor-server", version, about = "Investor commitments HTTP API")]
pub struct ServerArgs {
    /// Bind address
    #[arg(short, long, default_value = "127.0.0.1")]
    pub bind: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8000")]
    pub port: u16,

    /// SQLite database file produced by `investor-commitments import`
    #[arg(long, env = "INVESTORS_DB", default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}
