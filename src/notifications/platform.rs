//! # Notification Platform Contract
//!
//! What the reminder core needs from a local-notification backend: a
//! permission answer, cancel-all, schedule one recurring alert, and list what
//! is currently scheduled.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.3.0
//!
//! ## Changelog
//! - 1.1.0: Added notification channels and foreground presentation options
//! - 1.0.0: Initial release with permission, cancel, schedule and list

use super::trigger::Trigger;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// The user has not been asked yet
    Undetermined,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

impl std::fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionStatus::Granted => write!(f, "granted"),
            PermissionStatus::Denied => write!(f, "denied"),
            PermissionStatus::Undetermined => write!(f, "undetermined"),
        }
    }
}

impl std::str::FromStr for PermissionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "granted" => Ok(PermissionStatus::Granted),
            "denied" => Ok(PermissionStatus::Denied),
            "undetermined" => Ok(PermissionStatus::Undetermined),
            _ => Err(anyhow!("Invalid permission status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationPriority {
    Default,
    High,
}

/// What the user sees when an alert fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub sound: Option<String>,
    pub priority: NotificationPriority,
}

/// Opaque platform identifier for a scheduled alert
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationHandle(pub String);

impl std::fmt::Display for NotificationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledNotification {
    pub handle: NotificationHandle,
    pub content: NotificationContent,
    pub trigger: Trigger,
    /// Next time the platform will deliver this alert
    pub next_fire: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelImportance {
    Low,
    Default,
    High,
}

/// Delivery channel for platforms that group alerts by channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
    pub importance: ChannelImportance,
    pub sound: Option<String>,
    /// Alternating off/on durations in milliseconds
    pub vibration_pattern: Vec<u64>,
    pub light_color: Option<String>,
}

impl NotificationChannel {
    /// The channel daily reminders are posted to
    pub fn reminders() -> Self {
        Self {
            id: super::trigger::REMINDER_CHANNEL_ID.to_string(),
            name: "Reminders".to_string(),
            importance: ChannelImportance::High,
            sound: Some("default".to_string()),
            vibration_pattern: vec![0, 250, 250, 250],
            light_color: Some("#FF231F7C".to_string()),
        }
    }
}

/// How an alert is presented while the app is in the foreground
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationOptions {
    pub show_alert: bool,
    pub play_sound: bool,
    pub set_badge: bool,
    pub show_banner: bool,
    pub show_list: bool,
}

impl Default for PresentationOptions {
    fn default() -> Self {
        Self {
            show_alert: true,
            play_sound: true,
            set_badge: true,
            show_banner: true,
            show_list: false,
        }
    }
}

/// An alert the platform has delivered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceivedNotification {
    pub handle: NotificationHandle,
    pub content: NotificationContent,
    pub delivered_at: NaiveDateTime,
    pub presentation: PresentationOptions,
}

#[async_trait]
pub trait NotificationPlatform: Send + Sync {
    /// Prompt the user for permission. One-shot; callers do not retry.
    async fn request_permission(&self) -> PermissionStatus;

    /// Current permission without prompting
    async fn permission_status(&self) -> PermissionStatus;

    /// Register a delivery channel. Platforms without channels ignore this.
    async fn configure_channel(&self, _channel: &NotificationChannel) -> Result<()> {
        Ok(())
    }

    async fn cancel_all(&self) -> Result<()>;

    async fn schedule(
        &self,
        content: NotificationContent,
        trigger: Trigger,
    ) -> Result<NotificationHandle>;

    async fn list_scheduled(&self) -> Result<Vec<ScheduledNotification>>;
}
