//! # Configuration
//!
//! Environment-driven settings for the tracker. The binary loads `.env` with
//! dotenvy before calling [`Config::from_env`].
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Added notification platform, permission and delivery poll settings
//! - 1.0.0: Initial release with data path, log level and debounce window

use crate::notifications::{PermissionStatus, TriggerStyle};
use anyhow::{anyhow, Result};
use std::env;
use std::time::Duration;

/// Default location of the key-value data file
pub const DEFAULT_DATA_PATH: &str = "tracker_data.json";

/// Quiet window before a reminder change is written and rescheduled
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// How often the watch loop checks for due notifications
pub const DEFAULT_DELIVERY_POLL_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: String,
    pub log_level: String,
    pub debounce: Duration,
    /// Trigger shape the notification platform supports
    pub trigger_style: TriggerStyle,
    /// Answer the simulated platform gives to permission prompts
    pub notification_permission: PermissionStatus,
    pub delivery_poll: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_path: DEFAULT_DATA_PATH.to_string(),
            log_level: "info".to_string(),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            trigger_style: TriggerStyle::DailyChannel,
            notification_permission: PermissionStatus::Granted,
            delivery_poll: Duration::from_secs(DEFAULT_DELIVERY_POLL_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup; missing keys fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let data_path = lookup("TRACKER_DATA_PATH").unwrap_or(defaults.data_path);
        let log_level = lookup("LOG_LEVEL").unwrap_or(defaults.log_level);

        let debounce = match lookup("REMINDER_DEBOUNCE_MS") {
            Some(raw) => Duration::from_millis(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|e| anyhow!("Invalid REMINDER_DEBOUNCE_MS '{}': {}", raw, e))?,
            ),
            None => defaults.debounce,
        };

        let trigger_style = match lookup("NOTIFICATION_PLATFORM") {
            Some(raw) => TriggerStyle::for_platform(&raw)?,
            None => defaults.trigger_style,
        };

        let notification_permission = match lookup("NOTIFICATION_PERMISSION") {
            Some(raw) => raw.parse::<PermissionStatus>()?,
            None => defaults.notification_permission,
        };

        let delivery_poll = match lookup("DELIVERY_POLL_SECS") {
            Some(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| anyhow!("Invalid DELIVERY_POLL_SECS '{}': {}", raw, e))?;
                if secs == 0 {
                    return Err(anyhow!("DELIVERY_POLL_SECS must be at least 1"));
                }
                Duration::from_secs(secs)
            }
            None => defaults.delivery_poll,
        };

        Ok(Config {
            data_path,
            log_level,
            debounce,
            trigger_style,
            notification_permission,
            delivery_poll,
        })
    }
}
