//! # Feature: Reminders
//!
//! Daily intake reminders delivered as local notifications. A fixed set of
//! reminders is toggled and retimed by the user; changes are debounced,
//! persisted, and reconciled against the notification platform.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.2.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 1.2.0: Flush reports and write-failure degradation
//! - 1.1.0: Platform-specific trigger shapes resolved from configuration
//! - 1.0.0: Initial release with three default reminders

pub mod manager;
pub mod model;
pub mod reconcile;

pub use manager::ReminderManager;
pub use model::{default_reminders, Reminder, TimeOfDay, DEFAULT_TITLE, REMINDER_BODY};
pub use reconcile::{ReconcileReport, Reconciler};
