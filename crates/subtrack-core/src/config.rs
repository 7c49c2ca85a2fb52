//! Configuration for reminders, calendar export and the overview
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/subtrack/config.toml)
//! 2. Fall back to embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/subtrack.toml");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Default reminder offset for new subscriptions
    pub remind_days_before: u32,
    /// Calendar alarm lead time
    pub reminder_lead_minutes: u32,
    pub event_duration_minutes: u32,
    /// Occurrences in exported recurrence rules
    pub occurrence_count: u32,
    /// Upcoming-payments window
    pub upcoming_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remind_days_before: 1,
            reminder_lead_minutes: 1440,
            event_duration_minutes: 60,
            occurrence_count: 60,
            upcoming_days: 7,
        }
    }
}

impl Config {
    /// Load from `path` if given, else the default override location
    ///
    /// A missing file falls back to the embedded defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let candidate = path.map(Path::to_path_buf).or_else(default_config_path);

        let content = match candidate {
            Some(ref p) if p.exists() => {
                debug!(path = %p.display(), "Loading config override");
                fs::read_to_string(p)
                    .map_err(|e| Error::Config(format!("Failed to read {}: {}", p.display(), e)))?
            }
            _ => DEFAULT_CONFIG.to_string(),
        };

        Self::parse(&content)
    }

    /// Parse config from TOML content, filling unset keys with defaults
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Config::default();

        if let Some(reminders) = raw.reminders {
            if let Some(days) = reminders.remind_days_before {
                config.remind_days_before = days;
            }
            if let Some(minutes) = reminders.lead_minutes {
                config.reminder_lead_minutes = minutes;
            }
            if let Some(minutes) = reminders.event_duration_minutes {
                config.event_duration_minutes = minutes;
            }
        }

        if let Some(calendar) = raw.calendar {
            if let Some(count) = calendar.occurrence_count {
                if count == 0 {
                    return Err(Error::Config(
                        "calendar.occurrence_count must be positive".to_string(),
                    ));
                }
                config.occurrence_count = count;
            }
        }

        if let Some(overview) = raw.overview {
            if let Some(days) = overview.upcoming_days {
                config.upcoming_days = days;
            }
        }

        Ok(config)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("subtrack").join("config.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    reminders: Option<RawReminders>,
    calendar: Option<RawCalendar>,
    overview: Option<RawOverview>,
}

#[derive(Debug, Deserialize)]
struct RawReminders {
    remind_days_before: Option<u32>,
    lead_minutes: Option<u32>,
    event_duration_minutes: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawCalendar {
    occurrence_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawOverview {
    upcoming_days: Option<u32>,
}
