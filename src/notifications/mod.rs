//! # Notifications
//!
//! Local-notification scheduling: the platform contract, per-platform trigger
//! construction, the received-notification observer, and an in-process
//! simulated platform.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.3.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Added received-notification hub and logger
//! - 1.0.0: Initial release

pub mod listener;
pub mod platform;
pub mod simulated;
pub mod trigger;

pub use listener::{NotificationHub, ReceivedLogger};
pub use platform::{
    ChannelImportance, NotificationChannel, NotificationContent, NotificationHandle,
    NotificationPlatform, NotificationPriority, PermissionStatus, PresentationOptions,
    ReceivedNotification, ScheduledNotification,
};
pub use simulated::SimulatedPlatform;
pub use trigger::{Trigger, TriggerStyle, REMINDER_CHANNEL_ID};
