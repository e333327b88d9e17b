//! # Simulated Platform
//!
//! In-process notification platform. Scheduled alerts live in a DashMap and
//! are delivered by polling [`SimulatedPlatform::deliver_due`], which fires
//! each alert at most once per day and publishes it on the notification hub.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.3.0
//!
//! ## Changelog
//! - 1.1.0: Added delivery polling and failure injection
//! - 1.0.0: Initial release

use super::listener::NotificationHub;
use super::platform::{
    NotificationChannel, NotificationContent, NotificationHandle, NotificationPlatform,
    PermissionStatus, PresentationOptions, ReceivedNotification, ScheduledNotification,
};
use super::trigger::Trigger;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDateTime};
use dashmap::{DashMap, DashSet};
use log::{debug, info};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

pub struct SimulatedPlatform {
    scheduled: DashMap<NotificationHandle, ScheduledNotification>,
    channels: DashMap<String, NotificationChannel>,
    /// Answer given when the user is prompted
    prompt_answer: PermissionStatus,
    permission: RwLock<PermissionStatus>,
    presentation: PresentationOptions,
    /// (hour, minute) pairs whose schedule calls are rejected
    rejected_times: DashSet<(u32, u32)>,
    schedule_calls: AtomicUsize,
    hub: NotificationHub,
}

impl SimulatedPlatform {
    /// New platform that has not prompted yet and answers prompts with `prompt_answer`
    pub fn new(prompt_answer: PermissionStatus) -> Self {
        Self {
            scheduled: DashMap::new(),
            channels: DashMap::new(),
            prompt_answer,
            permission: RwLock::new(PermissionStatus::Undetermined),
            presentation: PresentationOptions::default(),
            rejected_times: DashSet::new(),
            schedule_calls: AtomicUsize::new(0),
            hub: NotificationHub::new(),
        }
    }

    /// Platform on which permission was already granted
    pub fn granted() -> Self {
        let platform = Self::new(PermissionStatus::Granted);
        platform.set_permission(PermissionStatus::Granted);
        platform
    }

    pub fn with_presentation(mut self, presentation: PresentationOptions) -> Self {
        self.presentation = presentation;
        self
    }

    pub fn hub(&self) -> &NotificationHub {
        &self.hub
    }

    /// Override the current permission, as if changed in system settings
    pub fn set_permission(&self, status: PermissionStatus) {
        if let Ok(mut permission) = self.permission.write() {
            *permission = status;
        }
    }

    /// Reject future schedule calls for alerts at `hour:minute`
    pub fn reject_time(&self, hour: u32, minute: u32) {
        self.rejected_times.insert((hour, minute));
    }

    pub fn channel(&self, id: &str) -> Option<NotificationChannel> {
        self.channels.get(id).map(|c| c.clone())
    }

    /// Total schedule calls, successful or not
    pub fn schedule_calls(&self) -> usize {
        self.schedule_calls.load(Ordering::SeqCst)
    }

    pub fn scheduled_count(&self) -> usize {
        self.scheduled.len()
    }

    fn current_permission(&self) -> PermissionStatus {
        self.permission
            .read()
            .map(|p| *p)
            .unwrap_or(PermissionStatus::Undetermined)
    }

    /// Deliver every alert due at `now` and roll it forward to its next day.
    pub fn deliver_due(&self, now: NaiveDateTime) -> Vec<ReceivedNotification> {
        let mut delivered = Vec::new();

        for mut entry in self.scheduled.iter_mut() {
            if entry.next_fire > now {
                continue;
            }

            delivered.push(ReceivedNotification {
                handle: entry.handle.clone(),
                content: entry.content.clone(),
                delivered_at: now,
                presentation: self.presentation,
            });

            // Missed days are skipped; one delivery per day at most
            while entry.next_fire <= now {
                entry.next_fire += Duration::days(1);
            }
        }

        delivered.sort_by(|a, b| a.content.title.cmp(&b.content.title));
        for notification in &delivered {
            self.hub.publish(notification.clone());
        }

        if !delivered.is_empty() {
            debug!("Delivered {} notifications at {}", delivered.len(), now);
        }
        delivered
    }
}

#[async_trait]
impl NotificationPlatform for SimulatedPlatform {
    async fn request_permission(&self) -> PermissionStatus {
        let current = self.current_permission();
        if current != PermissionStatus::Undetermined {
            return current;
        }

        self.set_permission(self.prompt_answer);
        info!("Notification permission prompt answered: {}", self.prompt_answer);
        self.prompt_answer
    }

    async fn permission_status(&self) -> PermissionStatus {
        self.current_permission()
    }

    async fn configure_channel(&self, channel: &NotificationChannel) -> Result<()> {
        debug!("Configured notification channel '{}'", channel.id);
        self.channels.insert(channel.id.clone(), channel.clone());
        Ok(())
    }

    async fn cancel_all(&self) -> Result<()> {
        let count = self.scheduled.len();
        self.scheduled.clear();
        debug!("Cancelled {count} scheduled notifications");
        Ok(())
    }

    async fn schedule(
        &self,
        content: NotificationContent,
        trigger: Trigger,
    ) -> Result<NotificationHandle> {
        self.schedule_calls.fetch_add(1, Ordering::SeqCst);

        if self
            .rejected_times
            .contains(&(trigger.hour(), trigger.minute()))
        {
            return Err(anyhow!(
                "Platform rejected alert at {:02}:{:02}",
                trigger.hour(),
                trigger.minute()
            ));
        }

        if let Some(channel_id) = trigger.channel_id() {
            if !self.channels.contains_key(channel_id) {
                debug!("Channel '{channel_id}' not configured, using platform default");
            }
        }

        let next_fire = trigger
            .next_fire(Local::now().naive_local())
            .ok_or_else(|| {
                anyhow!(
                    "Invalid trigger time {}:{}",
                    trigger.hour(),
                    trigger.minute()
                )
            })?;

        let handle = NotificationHandle(uuid::Uuid::new_v4().to_string());
        self.scheduled.insert(
            handle.clone(),
            ScheduledNotification {
                handle: handle.clone(),
                content,
                trigger,
                next_fire,
            },
        );

        Ok(handle)
    }

    async fn list_scheduled(&self) -> Result<Vec<ScheduledNotification>> {
        let mut scheduled: Vec<_> = self.scheduled.iter().map(|s| s.clone()).collect();
        scheduled.sort_by(|a, b| a.next_fire.cmp(&b.next_fire));
        Ok(scheduled)
    }
}
