//! # Features
//!
//! User-facing feature modules.

pub mod intake;
pub mod reminders;

pub use intake::{calendar_days, CalendarDay, IntakeLog, Month, MonthlyStats};
pub use reminders::{ReconcileReport, Reconciler, Reminder, ReminderManager, TimeOfDay};
