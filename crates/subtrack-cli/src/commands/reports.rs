//! Report command implementations

use anyhow::Result;
use chrono::{Duration, Local, Utc};
use subtrack_core::db::Database;
use subtrack_core::overview::{self, SpendingOverview};
use subtrack_core::{schedule, CalendarEvent, Config};

use super::{find_user_subscription, truncate};

pub fn cmd_upcoming(db: &Database, user_id: i64, days: u32) -> Result<()> {
    let now = Local::now();
    let until = now.with_timezone(&Utc) + Duration::days(i64::from(days));
    let payments = db.upcoming_payments(Some(user_id), until)?;

    if payments.is_empty() {
        println!("No payments due in the next {} days.", days);
        return Ok(());
    }

    println!();
    println!("📅 Payments due in the next {} days", days);
    println!("   ─────────────────────────────────────────────────────");

    for sub in payments {
        let next = sub.next_payment_date.with_timezone(&Local);
        let days_until = schedule::get_days_until_payment_at(&next, &now);
        let when = if schedule::is_payment_date_passed_at(&next, &now) {
            format!("OVERDUE by {} days", -days_until)
        } else {
            format!("in {} days", days_until)
        };

        println!(
            "   {:20} │ {:>9} │ {:>10} │ {}",
            truncate(&sub.name, 20),
            format!("${:.2}", sub.amount),
            schedule::format_date_for_display(&next),
            when
        );
    }

    Ok(())
}

pub fn cmd_overview(db: &Database, config: &Config, user_id: i64, json: bool) -> Result<()> {
    let subscriptions = db.list_subscriptions(Some(user_id))?;
    let report = SpendingOverview::build(&subscriptions, &Local::now(), config.upcoming_days);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("💰 Monthly Overview");
    println!("   ─────────────────────────────");
    println!("   Total Subscriptions: {}", report.subscription_count);
    println!("   Monthly Cost:        ${:.2}", report.monthly_total);
    println!("   Annual Cost:         ${:.2}", report.annual_total);
    if report.overdue_count > 0 {
        println!(
            "   ⚠️  Overdue: {} (run 'subtrack refresh')",
            report.overdue_count
        );
    }

    if !report.by_frequency.is_empty() {
        println!();
        println!("   Recurring Cost:");
        for total in &report.by_frequency {
            println!(
                "   • {:<14} ${:>9.2}  ({} subscription(s))",
                total.label, total.total, total.count
            );
        }
    }

    if !report.upcoming.is_empty() {
        println!();
        println!("   Due in the next {} days:", config.upcoming_days);
        for payment in &report.upcoming {
            println!(
                "   • {:20} ${:>9.2}  {}",
                truncate(&payment.name, 20),
                payment.amount,
                schedule::format_date_for_display(&payment.next_payment_date.with_timezone(&Local))
            );
        }
    }

    Ok(())
}

pub fn cmd_reminders(db: &Database, user_id: i64) -> Result<()> {
    let subscriptions = db.list_subscriptions(Some(user_id))?;
    let now = Local::now();
    let due = overview::due_reminders(&subscriptions, &now);

    if due.is_empty() {
        println!("🔕 No reminders due.");
        return Ok(());
    }

    println!();
    println!("🔔 Subscription Payment Reminders");
    for sub in due {
        let next = sub.next_payment_date.with_timezone(&Local);
        println!(
            "   Incoming payment for {} (${:.2}) due {} - in {} days",
            sub.name,
            sub.amount,
            schedule::format_date_for_display(&next),
            schedule::get_days_until_payment_at(&next, &now)
        );
    }

    Ok(())
}

pub fn cmd_calendar(db: &Database, config: &Config, user_id: i64, id: i64) -> Result<()> {
    let sub = find_user_subscription(db, user_id, id)?;
    let event = CalendarEvent::for_subscription(&sub, config, &Local);
    print!("{}", event.to_ics(Utc::now()));
    Ok(())
}
