//! Subscription command implementations

use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::Local;
use subtrack_core::db::Database;
use subtrack_core::{schedule, Config, Frequency, NewSubscription, Subscription};

use super::truncate;

/// Load a subscription and check it belongs to `user_id`
pub fn find_user_subscription(db: &Database, user_id: i64, id: i64) -> Result<Subscription> {
    db.get_subscription(id)?
        .filter(|s| s.user_id == user_id)
        .ok_or_else(|| anyhow::anyhow!("Subscription not found: {}", id))
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_add(
    db: &Database,
    config: &Config,
    user_id: i64,
    name: &str,
    amount: f64,
    category: &str,
    start: &str,
    frequency: Frequency,
    remind_days: Option<u32>,
) -> Result<()> {
    if name.trim().is_empty() {
        anyhow::bail!("Subscription name is required");
    }
    if !amount.is_finite() || amount < 0.0 {
        anyhow::bail!("Amount must be a non-negative number");
    }

    let start_date =
        schedule::parse_start_date(start).context("Invalid --start date (use YYYY-MM-DD)")?;

    let new = NewSubscription {
        user_id,
        name: name.trim().to_string(),
        amount,
        category: category.trim().to_string(),
        start_date,
        frequency,
        remind_days_before: remind_days.unwrap_or(config.remind_days_before),
    };

    let id = db.insert_subscription(&new, &Local::now())?;
    let sub = find_user_subscription(db, user_id, id)?;
    let next = sub.next_payment_date.with_timezone(&Local);

    println!(
        "✅ Added {} (ID: {}) - ${:.2} {}",
        sub.name, id, sub.amount, sub.frequency
    );
    println!(
        "   Next payment: {} ({} days)",
        schedule::format_date_for_display(&next),
        schedule::get_days_until_payment(&next)
    );

    Ok(())
}

pub fn cmd_list(db: &Database, user_id: i64, search: Option<&str>, json: bool) -> Result<()> {
    let subscriptions = match search {
        Some(query) => db.search_subscriptions(Some(user_id), query)?,
        None => db.list_subscriptions(Some(user_id))?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&subscriptions)?);
        return Ok(());
    }

    if subscriptions.is_empty() {
        println!("No subscriptions yet. Add one with:");
        println!("  subtrack add -n Netflix -a 15.49 -s 2024-01-31");
        return Ok(());
    }

    let now = Local::now();

    println!();
    println!("📋 Subscriptions");
    println!("   ─────────────────────────────────────────────────────────────────────");

    for sub in subscriptions {
        let next = sub.next_payment_date.with_timezone(&Local);
        let days = schedule::get_days_until_payment_at(&next, &now);
        let (icon, due) = if schedule::is_payment_date_passed_at(&next, &now) {
            ("⚠️ ", format!("overdue by {} days", -days))
        } else {
            ("✅", format!("due in {} days", days))
        };

        println!(
            "   {} {:>4} {:20} │ {:>9} │ {:<12} │ {:>10} │ {}",
            icon,
            sub.id,
            truncate(&sub.name, 20),
            format!("${:.2}", sub.amount),
            sub.frequency.label(),
            schedule::format_date_for_display(&next),
            due
        );
    }

    Ok(())
}

pub fn cmd_paid(db: &Database, user_id: i64, id: i64) -> Result<()> {
    let sub = find_user_subscription(db, user_id, id)?;
    let next = db.mark_payment_completed(id, &Local)?;
    let next = next.with_timezone(&Local);

    println!("✅ Marked {} as paid", sub.name);
    println!(
        "   Next payment: {} ({} days)",
        schedule::format_date_for_display(&next),
        schedule::get_days_until_payment(&next)
    );

    Ok(())
}

pub fn cmd_refresh(db: &Database, user_id: i64) -> Result<()> {
    let updated = db.refresh_overdue_payments(Some(user_id), &Local::now())?;

    if updated == 0 {
        println!("✅ All payment dates are current");
    } else {
        println!("🔄 Advanced {} overdue payment date(s)", updated);
    }

    Ok(())
}

pub fn cmd_cancel(db: &Database, user_id: i64, id: i64) -> Result<()> {
    let sub = find_user_subscription(db, user_id, id)?;
    db.delete_subscription(id)?;

    println!("❌ Cancelled {} (ID: {})", sub.name, id);
    Ok(())
}

pub fn cmd_clear(db: &Database, user_id: i64, all: bool, yes: bool) -> Result<()> {
    if !yes {
        if all {
            print!("⚠️  This will delete subscriptions for ALL users.\n\n");
        } else {
            print!("⚠️  This will delete all subscriptions for user {}.\n\n", user_id);
        }
        print!("Are you sure? [y/N] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let deleted = if all {
        db.clear_all()?
    } else {
        db.clear_user(user_id)?
    };

    println!("✅ Deleted {} subscription(s)", deleted);
    Ok(())
}
