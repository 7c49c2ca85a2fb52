//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `accounts` - Register, login, and the `--user` check
//! - `core` - Init, schedule projection, and shared utilities (open_db)
//! - `subscriptions` - Subscription commands (add, list, paid, refresh, cancel, clear)
//! - `reports` - Upcoming payments, overview, reminders, calendar export

pub mod accounts;
pub mod core;
pub mod reports;
pub mod subscriptions;

// Re-export command functions for main.rs
pub use self::core::*;
pub use accounts::*;
pub use reports::*;
pub use subscriptions::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
