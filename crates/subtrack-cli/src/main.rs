//! SubTrack CLI - Subscription tracker
//!
//! Usage:
//!   subtrack init                                   Initialize database
//!   subtrack register -e you@example.com            Create an account
//!   subtrack add -n Netflix -a 15.49 -s 2024-01-31  Track a subscription
//!   subtrack list                                   Show subscriptions
//!   subtrack overview                               Spending by frequency

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use clap::Parser;
use subtrack_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = Config::load(cli.config.as_deref()).context("Failed to load config")?;

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Register { email } => {
            let db = commands::open_db(&cli.db)?;
            let password = commands::read_password()?;
            commands::cmd_register(&db, &email, &password).map(|_| ())
        }
        Commands::Login { email } => {
            let db = commands::open_db(&cli.db)?;
            let password = commands::read_password()?;
            commands::cmd_login(&db, &email, &password).map(|_| ())
        }
        Commands::Add {
            name,
            amount,
            category,
            start,
            frequency,
            remind_days,
        } => {
            let db = commands::open_user_db(&cli.db, cli.user)?;
            commands::cmd_add(
                &db,
                &config,
                cli.user,
                &name,
                amount,
                &category,
                &start,
                frequency,
                remind_days,
            )
        }
        Commands::List { search, json } => {
            let db = commands::open_user_db(&cli.db, cli.user)?;
            commands::cmd_list(&db, cli.user, search.as_deref(), json)
        }
        Commands::Paid { id } => {
            let db = commands::open_user_db(&cli.db, cli.user)?;
            commands::cmd_paid(&db, cli.user, id)
        }
        Commands::Refresh => {
            let db = commands::open_user_db(&cli.db, cli.user)?;
            commands::cmd_refresh(&db, cli.user)
        }
        Commands::Cancel { id } => {
            let db = commands::open_user_db(&cli.db, cli.user)?;
            commands::cmd_cancel(&db, cli.user, id)
        }
        Commands::Upcoming { days } => {
            let db = commands::open_user_db(&cli.db, cli.user)?;
            commands::cmd_upcoming(&db, cli.user, days.unwrap_or(config.upcoming_days))
        }
        Commands::Overview { json } => {
            let db = commands::open_user_db(&cli.db, cli.user)?;
            commands::cmd_overview(&db, &config, cli.user, json)
        }
        Commands::Reminders => {
            let db = commands::open_user_db(&cli.db, cli.user)?;
            commands::cmd_reminders(&db, cli.user)
        }
        Commands::Schedule {
            start,
            frequency,
            count,
        } => commands::cmd_schedule(&start, frequency, count),
        Commands::Calendar { id } => {
            let db = commands::open_user_db(&cli.db, cli.user)?;
            commands::cmd_calendar(&db, &config, cli.user, id)
        }
        Commands::Clear { all, yes } => {
            let db = if all {
                commands::open_db(&cli.db)?
            } else {
                commands::open_user_db(&cli.db, cli.user)?
            };
            commands::cmd_clear(&db, cli.user, all, yes)
        }
    }
}
