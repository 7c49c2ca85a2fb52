//! SubTrack Core Library
//!
//! Shared functionality for the SubTrack subscription tracker:
//! - Payment scheduling (recurring payment-date advancement)
//! - Domain models for subscriptions and billing frequencies
//! - SQLite-backed subscription store
//! - Calendar recurrence rules and ICS event export
//! - Spending overview and reminder selection
//! - TOML configuration with embedded defaults

pub mod calendar;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod overview;
pub mod schedule;

pub use calendar::{recurrence_rule, CalendarEvent};
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use models::{Account, CustomDays, Frequency, NewSubscription, Subscription};
pub use overview::{FrequencyTotal, SpendingOverview, UpcomingPayment};
