//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use chrono::{Duration, Local, Utc};
use clap::Parser;
use subtrack_core::db::Database;
use subtrack_core::{schedule, Config, Frequency};

use crate::cli::{Cli, Commands};
use crate::commands::{self, truncate};

fn setup_test_db() -> Database {
    Database::in_memory().unwrap()
}

/// Add a subscription for user 1 and return its ID
fn add(db: &Database, name: &str, start: &str, frequency: Frequency) -> i64 {
    commands::cmd_add(
        db,
        &Config::default(),
        1,
        name,
        9.99,
        "Streaming",
        start,
        frequency,
        None,
    )
    .unwrap();
    db.search_subscriptions(Some(1), name).unwrap()[0].id
}

// ========== Account Command Tests ==========

#[test]
fn test_cmd_register_and_login() {
    let db = setup_test_db();
    let id = commands::cmd_register(&db, "Ada@Example.com", "secret").unwrap();

    assert_eq!(commands::cmd_login(&db, "ada@example.com", "secret").unwrap(), id);
    assert!(commands::cmd_login(&db, "ada@example.com", "nope").is_err());
    assert!(commands::cmd_register(&db, "ada@example.com", "again").is_err());
}

#[test]
fn test_require_account() {
    let db = setup_test_db();
    assert!(commands::require_account(&db, 1).is_err());

    let id = commands::cmd_register(&db, "ada@example.com", "secret").unwrap();
    let account = commands::require_account(&db, id).unwrap();
    assert_eq!(account.email, "ada@example.com");
    assert!(commands::require_account(&db, id + 1).is_err());
}

#[test]
fn test_open_user_db_checks_account() {
    let db = setup_test_db();
    let path = std::path::PathBuf::from(db.path());

    assert!(commands::open_user_db(&path, 1).is_err());
    let id = commands::cmd_register(&db, "ada@example.com", "secret").unwrap();
    assert!(commands::open_user_db(&path, id).is_ok());
}

// ========== Add Command Tests ==========

#[test]
fn test_cmd_add_computes_future_payment() {
    let db = setup_test_db();
    let id = add(&db, "Netflix", "2020-01-15", Frequency::Monthly);

    let sub = db.get_subscription(id).unwrap().unwrap();
    assert!(!schedule::is_payment_date_passed(&sub.next_payment_date));
    assert!(schedule::get_days_until_payment(&sub.next_payment_date) <= 31);
    assert_eq!(sub.remind_days_before, 1);
    assert_eq!(sub.category, "Streaming");
}

#[test]
fn test_cmd_add_uses_remind_days_override() {
    let db = setup_test_db();
    commands::cmd_add(
        &db,
        &Config::default(),
        1,
        "Gym",
        30.0,
        "Health",
        "2024-01-01",
        Frequency::Monthly,
        Some(5),
    )
    .unwrap();

    let subs = db.list_subscriptions(Some(1)).unwrap();
    assert_eq!(subs[0].remind_days_before, 5);
}

#[test]
fn test_cmd_add_rejects_bad_input() {
    let db = setup_test_db();
    let config = Config::default();

    let bad_date = commands::cmd_add(
        &db, &config, 1, "X", 1.0, "", "31/01/2024", Frequency::Monthly, None,
    );
    assert!(bad_date.is_err());

    let blank_name = commands::cmd_add(
        &db, &config, 1, " ", 1.0, "", "2024-01-31", Frequency::Monthly, None,
    );
    assert!(blank_name.is_err());

    let negative = commands::cmd_add(
        &db, &config, 1, "X", -1.0, "", "2024-01-31", Frequency::Monthly, None,
    );
    assert!(negative.is_err());

    assert!(db.list_subscriptions(None).unwrap().is_empty());
}

// ========== List Command Tests ==========

#[test]
fn test_cmd_list_empty() {
    let db = setup_test_db();
    assert!(commands::cmd_list(&db, 1, None, false).is_ok());
}

#[test]
fn test_cmd_list_with_search_and_json() {
    let db = setup_test_db();
    add(&db, "Spotify", "2024-01-10", Frequency::Monthly);
    add(&db, "Newspaper", "2024-01-10", Frequency::Weekly);

    assert!(commands::cmd_list(&db, 1, Some("spot"), false).is_ok());
    assert!(commands::cmd_list(&db, 1, None, true).is_ok());
}

// ========== Paid / Refresh / Cancel Tests ==========

#[test]
fn test_cmd_paid_advances_one_step() {
    let db = setup_test_db();
    let id = add(&db, "Paper", "2024-01-01", Frequency::Weekly);
    let before = db.get_subscription(id).unwrap().unwrap().next_payment_date;

    commands::cmd_paid(&db, 1, id).unwrap();

    let after = db.get_subscription(id).unwrap().unwrap().next_payment_date;
    let expected = schedule::advance(&before.with_timezone(&Local), Frequency::Weekly).unwrap();
    assert_eq!(after, expected.with_timezone(&Utc));
}

#[test]
fn test_cmd_paid_other_user_not_found() {
    let db = setup_test_db();
    let id = add(&db, "Private", "2024-01-01", Frequency::Weekly);
    assert!(commands::cmd_paid(&db, 2, id).is_err());
    assert!(commands::cmd_paid(&db, 1, 9999).is_err());
}

#[test]
fn test_cmd_refresh_advances_overdue() {
    let db = setup_test_db();
    let id = add(&db, "Cloud", "2023-01-01", Frequency::Monthly);

    // Force the payment into the past
    let past = Utc::now() - Duration::days(40);
    db.update_next_payment_date(id, &past).unwrap();
    assert_eq!(db.overdue_subscriptions(Some(1), Utc::now()).unwrap().len(), 1);

    commands::cmd_refresh(&db, 1).unwrap();

    let sub = db.get_subscription(id).unwrap().unwrap();
    assert!(!schedule::is_payment_date_passed(&sub.next_payment_date));
    assert!(db.overdue_subscriptions(Some(1), Utc::now()).unwrap().is_empty());
}

#[test]
fn test_cmd_cancel() {
    let db = setup_test_db();
    let id = add(&db, "Trial", "2024-01-01", Frequency::Monthly);

    commands::cmd_cancel(&db, 1, id).unwrap();
    assert!(db.get_subscription(id).unwrap().is_none());
    assert!(commands::cmd_cancel(&db, 1, id).is_err());
}

#[test]
fn test_cmd_clear_with_yes() {
    let db = setup_test_db();
    add(&db, "A", "2024-01-01", Frequency::Monthly);
    add(&db, "B", "2024-01-01", Frequency::Monthly);

    commands::cmd_clear(&db, 1, false, true).unwrap();
    assert!(db.list_subscriptions(Some(1)).unwrap().is_empty());
}

// ========== Report Command Tests ==========

#[test]
fn test_report_commands_run() {
    let db = setup_test_db();
    let config = Config::default();
    let id = add(&db, "Music", "2024-02-29", Frequency::Monthly);
    add(&db, "Domain", "2023-06-01", Frequency::Annually);

    assert!(commands::cmd_upcoming(&db, 1, 31).is_ok());
    assert!(commands::cmd_overview(&db, &config, 1, false).is_ok());
    assert!(commands::cmd_overview(&db, &config, 1, true).is_ok());
    assert!(commands::cmd_reminders(&db, 1).is_ok());
    assert!(commands::cmd_calendar(&db, &config, 1, id).is_ok());
    assert!(commands::cmd_calendar(&db, &config, 2, id).is_err());
}

#[test]
fn test_cmd_schedule() {
    assert!(commands::cmd_schedule("2024-01-31", Frequency::Monthly, 5).is_ok());
    assert!(commands::cmd_schedule("not-a-date", Frequency::Monthly, 5).is_err());
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_add_arguments() {
    let cli = Cli::try_parse_from([
        "subtrack", "add", "-n", "Netflix", "-a", "15.49", "-s", "2024-01-31", "-f", "quarterly",
    ])
    .unwrap();

    match cli.command {
        Commands::Add {
            name,
            amount,
            frequency,
            remind_days,
            ..
        } => {
            assert_eq!(name, "Netflix");
            assert!((amount - 15.49).abs() < 1e-9);
            assert_eq!(frequency, Frequency::Quarterly);
            assert_eq!(remind_days, None);
        }
        _ => panic!("expected add command"),
    }
    assert_eq!(cli.user, 1);
}

#[test]
fn test_parse_numeric_frequency() {
    let cli = Cli::try_parse_from(["subtrack", "schedule", "-s", "2024-01-01", "-f", "10"]).unwrap();
    match cli.command {
        Commands::Schedule {
            frequency, count, ..
        } => {
            assert_eq!(frequency, Frequency::from_days(10).unwrap());
            assert_eq!(count, 5);
        }
        _ => panic!("expected schedule command"),
    }
}

#[test]
fn test_parse_rejects_zero_frequency() {
    let result = Cli::try_parse_from(["subtrack", "schedule", "-s", "2024-01-01", "-f", "0"]);
    assert!(result.is_err());
}

#[test]
fn test_parse_register() {
    let cli = Cli::try_parse_from(["subtrack", "register", "-e", "ada@example.com"]).unwrap();
    match cli.command {
        Commands::Register { email } => assert_eq!(email, "ada@example.com"),
        _ => panic!("expected register command"),
    }
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a very long subscription", 10), "a very ...");
    assert_eq!(truncate("ünïcödé names", 8), "ünïcö...");
}
