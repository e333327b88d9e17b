//! # Reconciliation
//!
//! Makes the platform's scheduled alerts match the enabled reminders:
//! cancel everything, check permission, then schedule one daily trigger per
//! enabled reminder. Each reminder is scheduled independently; a failure is
//! logged and the rest continue. Duplicate times are scheduled twice.
//!
//! Cancel-all leaves a short window with nothing scheduled. No per-reminder
//! handles are tracked between runs.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0

use super::model::{Reminder, REMINDER_BODY};
use crate::notifications::{
    NotificationContent, NotificationHandle, NotificationPlatform, NotificationPriority,
    PermissionStatus, Trigger, TriggerStyle,
};
use log::{debug, error, info, warn};
use std::sync::Arc;

/// Outcome of one persist + reconcile pass
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileReport {
    /// Whether the reminder set was written to the store
    pub persisted: bool,
    pub permission: PermissionStatus,
    /// Reminder id and platform handle for each scheduled alert
    pub scheduled: Vec<(String, NotificationHandle)>,
    /// Reminder id and error message for each failed schedule
    pub failed: Vec<(String, String)>,
}

impl ReconcileReport {
    pub fn scheduled_count(&self) -> usize {
        self.scheduled.len()
    }
}

#[derive(Clone)]
pub struct Reconciler {
    platform: Arc<dyn NotificationPlatform>,
    style: TriggerStyle,
}

impl Reconciler {
    pub fn new(platform: Arc<dyn NotificationPlatform>, style: TriggerStyle) -> Self {
        Self { platform, style }
    }

    pub fn content_for(reminder: &Reminder) -> NotificationContent {
        NotificationContent {
            title: reminder.title.clone(),
            body: REMINDER_BODY.to_string(),
            sound: Some("default".to_string()),
            priority: NotificationPriority::High,
        }
    }

    /// Reconcile the platform against `reminders`. Never fails; problems are
    /// logged and reflected in the report.
    pub async fn reconcile(&self, reminders: &[Reminder]) -> ReconcileReport {
        if let Err(e) = self.platform.cancel_all().await {
            warn!("Failed to cancel scheduled notifications: {e}");
        }

        let permission = self.platform.permission_status().await;
        let mut report = ReconcileReport {
            persisted: false,
            permission,
            scheduled: Vec::new(),
            failed: Vec::new(),
        };

        if !permission.is_granted() {
            debug!("Notification permission {permission}, skipping scheduling");
            return report;
        }

        for reminder in reminders.iter().filter(|r| r.enabled) {
            let trigger = Trigger::daily(
                self.style,
                reminder.time_of_day.hour,
                reminder.time_of_day.minute,
            );

            match self
                .platform
                .schedule(Self::content_for(reminder), trigger)
                .await
            {
                Ok(handle) => {
                    debug!(
                        "Scheduled reminder {} at {} ({})",
                        reminder.id, reminder.time_of_day, handle
                    );
                    report.scheduled.push((reminder.id.clone(), handle));
                }
                Err(e) => {
                    error!(
                        "Failed to schedule reminder {} at {}: {}",
                        reminder.id, reminder.time_of_day, e
                    );
                    report.failed.push((reminder.id.clone(), e.to_string()));
                }
            }
        }

        info!(
            "Reconciled reminders: {} scheduled, {} failed",
            report.scheduled.len(),
            report.failed.len()
        );
        report
    }

    /// Log what the platform currently has scheduled and return the count
    pub async fn log_scheduled(&self) -> usize {
        match self.platform.list_scheduled().await {
            Ok(scheduled) => {
                debug!("{} notifications scheduled", scheduled.len());
                for alert in &scheduled {
                    debug!("  '{}' next at {}", alert.content.title, alert.next_fire);
                }
                scheduled.len()
            }
            Err(e) => {
                warn!("Failed to list scheduled notifications: {e}");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reminders::model::{default_reminders, TimeOfDay};
    use crate::notifications::SimulatedPlatform;

    fn enabled(mut reminders: Vec<Reminder>, ids: &[&str]) -> Vec<Reminder> {
        for r in reminders.iter_mut() {
            r.enabled = ids.contains(&r.id.as_str());
        }
        reminders
    }

    #[tokio::test]
    async fn test_schedules_only_enabled() {
        let platform = Arc::new(SimulatedPlatform::granted());
        let reconciler = Reconciler::new(platform.clone(), TriggerStyle::Calendar);

        let report = reconciler
            .reconcile(&enabled(default_reminders(), &["1", "3"]))
            .await;

        assert_eq!(report.scheduled_count(), 2);
        assert!(report.failed.is_empty());
        let ids: Vec<&str> = report.scheduled.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        let listed = platform.list_scheduled().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed
            .iter()
            .all(|s| matches!(s.trigger, Trigger::Calendar { repeats: true, .. })));
        assert!(listed.iter().all(|s| s.content.body == REMINDER_BODY));
    }

    #[tokio::test]
    async fn test_replaces_previous_alerts() {
        let platform = Arc::new(SimulatedPlatform::granted());
        let reconciler = Reconciler::new(platform.clone(), TriggerStyle::DailyChannel);

        reconciler
            .reconcile(&enabled(default_reminders(), &["1", "2", "3"]))
            .await;
        reconciler
            .reconcile(&enabled(default_reminders(), &["2"]))
            .await;

        let listed = platform.list_scheduled().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].trigger.hour(), 13);
        assert_eq!(listed[0].trigger.channel_id(), Some("reminders"));
    }

    #[tokio::test]
    async fn test_permission_denied_schedules_nothing() {
        let platform = Arc::new(SimulatedPlatform::granted());
        let reconciler = Reconciler::new(platform.clone(), TriggerStyle::Calendar);

        reconciler
            .reconcile(&enabled(default_reminders(), &["1"]))
            .await;
        platform.set_permission(PermissionStatus::Denied);

        let report = reconciler
            .reconcile(&enabled(default_reminders(), &["1", "2", "3"]))
            .await;

        assert_eq!(report.permission, PermissionStatus::Denied);
        assert_eq!(report.scheduled_count(), 0);
        assert_eq!(platform.schedule_calls(), 1);
        // Cancel still ran before the permission check
        assert_eq!(platform.scheduled_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_siblings() {
        let platform = Arc::new(SimulatedPlatform::granted());
        platform.reject_time(13, 0);
        let reconciler = Reconciler::new(platform.clone(), TriggerStyle::Calendar);

        let report = reconciler
            .reconcile(&enabled(default_reminders(), &["1", "2", "3"]))
            .await;

        assert_eq!(report.scheduled_count(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "2");
        assert_eq!(platform.scheduled_count(), 2);
    }

    #[tokio::test]
    async fn test_identical_times_are_not_merged() {
        let platform = Arc::new(SimulatedPlatform::granted());
        let reconciler = Reconciler::new(platform.clone(), TriggerStyle::Calendar);

        let mut reminders = enabled(default_reminders(), &["1", "2"]);
        reminders[1].time_of_day = TimeOfDay::new(8, 0);

        let report = reconciler.reconcile(&reminders).await;

        assert_eq!(report.scheduled_count(), 2);
        let listed = platform.list_scheduled().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|s| s.trigger.hour() == 8));
    }

    #[tokio::test]
    async fn test_log_scheduled_counts_platform_alerts() {
        let platform = Arc::new(SimulatedPlatform::granted());
        let reconciler = Reconciler::new(platform.clone(), TriggerStyle::DailyChannel);
        assert_eq!(reconciler.log_scheduled().await, 0);

        reconciler
            .reconcile(&enabled(default_reminders(), &["1", "3"]))
            .await;
        assert_eq!(reconciler.log_scheduled().await, 2);
    }
}
