//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `open_user_db` - Open the database and check the `--user` account exists
//! - `cmd_init` - Initialize the database
//! - `cmd_schedule` - Project payment dates without touching the database

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use subtrack_core::{db::Database, schedule, Frequency};
use tracing::debug;

pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", db_path.display()))?;
    debug!(path = path_str, "Opening database");
    Database::new(path_str).context("Failed to open database")
}

pub fn open_user_db(db_path: &Path, user_id: i64) -> Result<Database> {
    let db = open_db(db_path)?;
    super::require_account(&db, user_id)?;
    Ok(db)
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path)?;

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Create an account:  subtrack register -e you@example.com");
    println!("  2. Add a subscription: subtrack --user <ID> add -n Netflix -a 15.49 -s 2024-01-31");
    println!("  3. See what's due:     subtrack --user <ID> upcoming");

    Ok(())
}

pub fn cmd_schedule(start: &str, frequency: Frequency, count: usize) -> Result<()> {
    let now = Local::now();
    let payments = schedule::project_payments(start, i64::from(frequency.days()), count, &now)
        .context("Failed to project payments")?;

    println!();
    println!("📅 Payment schedule");
    println!("   Start:     {}", start);
    println!("   Frequency: {}", frequency);
    println!("   ─────────────────────────────");

    for (i, payment) in payments.iter().enumerate() {
        println!(
            "   {:>3}. {:<10} ({} days)",
            i + 1,
            schedule::format_date_for_display(payment),
            schedule::get_days_until_payment_at(payment, &now)
        );
    }

    Ok(())
}
