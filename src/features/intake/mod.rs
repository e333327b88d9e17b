//! # Feature: Intake Log
//!
//! Records the days the dose was taken and summarises each month.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Past-date toggling from the calendar grid
//! - 1.0.0: Initial release with today toggle and monthly completion rate

pub mod calendar;
pub mod history;

pub use calendar::{calendar_days, CalendarDay, Month, MonthlyStats};
pub use history::IntakeLog;
