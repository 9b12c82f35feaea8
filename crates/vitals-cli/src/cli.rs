//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Vitals - Financial health analytics
#[derive(Parser)]
#[command(name = "vitals")]
#[command(about = "Self-hosted financial health analytics", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "vitals.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set VITALS_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Analytics config file (defaults to ~/.config/vitals/analytics.toml,
    /// then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Manage users
    Users {
        #[command(subcommand)]
        action: Option<UsersAction>,
    },

    /// Record a financial snapshot for a user (creates the user if needed)
    Add {
        /// Username
        #[arg(short, long)]
        user: String,

        /// Monthly income
        #[arg(long)]
        income: f64,

        /// Monthly expenses
        #[arg(long)]
        expenses: f64,

        /// Total outstanding debts
        #[arg(long, default_value = "0")]
        debts: f64,

        /// Total investments
        #[arg(long, default_value = "0")]
        investments: f64,

        /// Date the snapshot applies to (YYYY-MM-DD, defaults to now)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show a user's snapshot history
    History {
        /// Username
        #[arg(short, long)]
        user: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show ratios and predicted savings rate for a user's latest snapshot
    Health {
        /// Username
        #[arg(short, long)]
        user: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Flag unusual snapshots in a user's history
    Anomalies {
        /// Username
        #[arg(short, long)]
        user: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Project expenses for the next three periods
    Forecast {
        /// Username
        #[arg(short, long)]
        user: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Monthly savings needed to reach a goal
    Plan {
        /// Target amount
        #[arg(long)]
        target: f64,

        /// Current savings
        #[arg(long, default_value = "0")]
        savings: f64,

        /// Years until the goal
        #[arg(long, allow_negative_numbers = true)]
        years: i64,
    },

    /// Risk-tiered investment suggestions
    Advise {
        /// Risk tolerance: high, medium, low (anything else is treated as conservative)
        #[arg(short, long)]
        risk: String,

        /// Current savings
        #[arg(long, default_value = "0")]
        savings: f64,

        /// Current investments
        #[arg(long, default_value = "0")]
        investments: f64,
    },

    /// Savings model management
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Allowed CORS origin (repeatable)
        #[arg(long = "cors-origin")]
        cors_origins: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// List users (default)
    List,

    /// Add a user
    Add {
        /// Username
        username: String,
    },
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// Show the cached model
    Status,

    /// Train the model and write the cache
    Train {
        /// Retrain even if a matching cache exists
        #[arg(long)]
        force: bool,
    },
}
