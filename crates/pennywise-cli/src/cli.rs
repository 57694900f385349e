//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use pennywise_core::DEFAULT_USER_ID;

/// Pennywise - See where your money is heading
#[derive(Parser)]
#[command(name = "pennywise")]
#[command(about = "Personal finance forecaster", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML)
    ///
    /// Defaults to $PENNYWISE_CONFIG, then the platform data directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database path (overrides the configured store path)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// User whose transactions to work with
    #[arg(long, global = true, default_value = DEFAULT_USER_ID)]
    pub user: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Import transactions (or accounts) from CSV
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,

        /// Treat the file as an accounts CSV (name, type, subtype, balance)
        #[arg(long)]
        accounts: bool,
    },

    /// Add a single transaction by hand
    Add {
        /// What the transaction was for
        #[arg(short, long)]
        description: String,

        /// Amount (negative for money spent)
        #[arg(short, long, allow_hyphen_values = true)]
        amount: f64,

        /// Date (YYYY-MM-DD or MM/DD/YYYY), defaults to today
        #[arg(long)]
        date: Option<String>,

        /// Category (auto-detected from the description if omitted)
        #[arg(short, long)]
        category: Option<String>,
    },

    /// List recent transactions
    Transactions {
        /// How many days back to list
        #[arg(long, default_value = "30")]
        days: u32,
    },

    /// List accounts with balances
    Accounts,

    /// Predict next month and the next six months
    Predict {
        /// Predict from a transactions CSV instead of the database
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Print predictions as JSON
        #[arg(long)]
        json: bool,

        /// Also ask the AI backend for a written outlook
        #[arg(long)]
        outlook: bool,
    },

    /// Get AI recommendations from recent spending
    Recommend {
        /// Show savings tips instead of recommendations
        #[arg(long)]
        tips: bool,
    },

    /// Print a sample CSV to fill in
    Template {
        #[arg(value_enum, default_value = "transactions")]
        kind: TemplateKind,
    },

    /// Start the web server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TemplateKind {
    Transactions,
    Accounts,
}
