//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use subtrack_core::Frequency;

/// SubTrack - Keep track of recurring subscriptions
#[derive(Parser)]
#[command(name = "subtrack")]
#[command(about = "Track subscriptions, upcoming payments and reminders", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "subtrack.db", global = true)]
    pub db: PathBuf,

    /// Config file (defaults to ~/.local/share/subtrack/config.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Account ID whose subscriptions to operate on (see `subtrack login`)
    #[arg(long, default_value = "1", global = true)]
    pub user: i64,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Create an account
    ///
    /// The password is read from SUBTRACK_PASSWORD, or prompted for.
    Register {
        /// Account email
        #[arg(short, long)]
        email: String,
    },

    /// Check a login and show the account ID to pass as --user
    ///
    /// The password is read from SUBTRACK_PASSWORD, or prompted for.
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,
    },

    /// Add a subscription
    Add {
        /// Subscription name
        #[arg(short, long)]
        name: String,

        /// Amount charged per payment
        #[arg(short, long)]
        amount: f64,

        /// Category (e.g., Streaming, Utilities)
        #[arg(short, long, default_value = "")]
        category: String,

        /// First billing date (YYYY-MM-DD)
        #[arg(short, long)]
        start: String,

        /// Billing frequency: weekly, biweekly, monthly, quarterly,
        /// semiannually, annually, or a number of days
        #[arg(short, long, default_value = "monthly")]
        frequency: Frequency,

        /// Days before each payment to remind (defaults to config value)
        #[arg(long)]
        remind_days: Option<u32>,
    },

    /// List subscriptions, soonest payment first
    List {
        /// Only show subscriptions whose name contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark the current payment of a subscription as paid
    Paid {
        /// Subscription ID
        id: i64,
    },

    /// Advance overdue payment dates to their next occurrence
    Refresh,

    /// Cancel (delete) a subscription
    Cancel {
        /// Subscription ID
        id: i64,
    },

    /// Show payments due soon
    Upcoming {
        /// Window in days (defaults to config value)
        #[arg(short, long)]
        days: Option<u32>,
    },

    /// Show spending overview by billing frequency
    Overview {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show subscriptions whose payment reminder is due
    Reminders,

    /// Project upcoming payment dates for a start date and frequency
    Schedule {
        /// First billing date (YYYY-MM-DD)
        #[arg(short, long)]
        start: String,

        /// Billing frequency (name or number of days)
        #[arg(short, long, default_value = "monthly")]
        frequency: Frequency,

        /// Number of payments to show
        #[arg(short = 'n', long, default_value = "5")]
        count: usize,
    },

    /// Print a calendar event (ICS) for a subscription
    Calendar {
        /// Subscription ID
        id: i64,
    },

    /// Delete subscriptions for the current user
    Clear {
        /// Delete subscriptions for every user
        #[arg(long)]
        all: bool,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}
