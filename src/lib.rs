// Core layer - shared configuration
pub mod core;

// Features layer - reminders and intake log
pub mod features;

// Notification platform layer
pub mod notifications;

// Key-value persistence
pub mod storage;

pub use crate::core::Config;

pub use features::{
    // Intake
    calendar_days, CalendarDay, IntakeLog, Month, MonthlyStats,
    // Reminders
    ReconcileReport, Reconciler, Reminder, ReminderManager, TimeOfDay,
};

pub use notifications::{
    NotificationHub, NotificationPlatform, PermissionStatus, ReceivedLogger, SimulatedPlatform,
    Trigger, TriggerStyle,
};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
