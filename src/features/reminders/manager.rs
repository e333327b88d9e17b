//! # Reminder Set Manager
//!
//! Owns the ordered reminder list, the "currently editing" marker and the
//! debounced persist + reconcile path. Every mutation re-arms a single timer;
//! when the quiet window elapses the latest in-memory snapshot is written to
//! the store and reconciled against the notification platform.
//!
//! Overlapping reconciliations are not serialized. A manual [`flush`] racing
//! a timer-driven one may briefly leave the platform out of step; the next
//! mutation corrects it.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.2.0: Added flush reports and write-failure degradation
//! - 1.1.0: Debounce timer tracked by generation so a running flush is never cancelled
//! - 1.0.0: Initial release with load, toggle and set_time
//!
//! [`flush`]: ReminderManager::flush

use super::model::{decode_reminders, default_reminders, encode_reminders, Reminder, TimeOfDay};
use super::reconcile::{ReconcileReport, Reconciler};
use crate::core::Config;
use crate::notifications::{NotificationPlatform, TriggerStyle};
use crate::storage::{KeyValueStore, REMINDERS_KEY};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Pending-write state: at most one armed timer
#[derive(Default)]
struct DebounceState {
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

#[derive(Clone)]
pub struct ReminderManager {
    reminders: Arc<RwLock<Vec<Reminder>>>,
    editing: Arc<RwLock<Option<String>>>,
    debounce_state: Arc<Mutex<DebounceState>>,
    last_report: Arc<RwLock<Option<ReconcileReport>>>,
    flush_count: Arc<AtomicUsize>,
    store: Arc<dyn KeyValueStore>,
    reconciler: Reconciler,
    debounce: Duration,
}

impl ReminderManager {
    /// Create a manager seeded with the default reminders. Call [`load`] to
    /// pick up a saved set.
    ///
    /// [`load`]: ReminderManager::load
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        platform: Arc<dyn NotificationPlatform>,
        style: TriggerStyle,
        debounce: Duration,
    ) -> Self {
        Self {
            reminders: Arc::new(RwLock::new(default_reminders())),
            editing: Arc::new(RwLock::new(None)),
            debounce_state: Arc::new(Mutex::new(DebounceState::default())),
            last_report: Arc::new(RwLock::new(None)),
            flush_count: Arc::new(AtomicUsize::new(0)),
            store,
            reconciler: Reconciler::new(platform, style),
            debounce,
        }
    }

    pub fn from_config(
        store: Arc<dyn KeyValueStore>,
        platform: Arc<dyn NotificationPlatform>,
        config: &Config,
    ) -> Self {
        Self::new(store, platform, config.trigger_style, config.debounce)
    }

    /// Load the saved reminder set, falling back to the defaults when it is
    /// missing or unreadable.
    pub async fn load(&self) -> Vec<Reminder> {
        let loaded = match self.store.get(REMINDERS_KEY).await {
            Ok(Some(raw)) => match decode_reminders(&raw) {
                Ok(reminders) if !reminders.is_empty() => {
                    debug!("Loaded {} saved reminders", reminders.len());
                    reminders
                }
                Ok(_) => {
                    warn!("Saved reminder set is empty, using defaults");
                    default_reminders()
                }
                Err(e) => {
                    warn!("Failed to parse saved reminders, using defaults: {e}");
                    default_reminders()
                }
            },
            Ok(None) => {
                debug!("No saved reminders, using defaults");
                default_reminders()
            }
            Err(e) => {
                warn!("Failed to read saved reminders, using defaults: {e}");
                default_reminders()
            }
        };

        *self.reminders.write().await = loaded.clone();
        loaded
    }

    /// Current reminders in display order
    pub async fn reminders(&self) -> Vec<Reminder> {
        self.reminders.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Reminder> {
        self.reminders
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Flip a reminder's enabled flag. Returns the new state, or `None` for an
    /// unknown id (nothing changes and no write is scheduled).
    pub async fn toggle(&self, id: &str) -> Option<bool> {
        let enabled = {
            let mut reminders = self.reminders.write().await;
            match reminders.iter_mut().find(|r| r.id == id) {
                Some(reminder) => {
                    reminder.enabled = !reminder.enabled;
                    reminder.enabled
                }
                None => {
                    debug!("Toggle ignored for unknown reminder {id}");
                    return None;
                }
            }
        };

        debug!("Reminder {id} enabled = {enabled}");
        self.persist_and_reconcile();
        Some(enabled)
    }

    /// Replace a reminder's time of day. Range checking belongs to the time
    /// picker. Closes the editing marker.
    pub async fn set_time(&self, id: &str, hour: u32, minute: u32) -> bool {
        *self.editing.write().await = None;

        let time = TimeOfDay::new(hour, minute);
        {
            let mut reminders = self.reminders.write().await;
            match reminders.iter_mut().find(|r| r.id == id) {
                Some(reminder) => reminder.time_of_day = time,
                None => {
                    debug!("Time change ignored for unknown reminder {id}");
                    return false;
                }
            }
        }

        debug!("Reminder {id} time set to {time}");
        self.persist_and_reconcile();
        true
    }

    /// Open the time picker for `id`, replacing any other open picker
    pub async fn begin_edit(&self, id: &str) -> bool {
        if self.get(id).await.is_none() {
            return false;
        }
        *self.editing.write().await = Some(id.to_string());
        true
    }

    pub async fn end_edit(&self) {
        *self.editing.write().await = None;
    }

    pub async fn editing(&self) -> Option<String> {
        self.editing.read().await.clone()
    }

    /// Arm (or re-arm) the debounce timer. Only the last call inside the quiet
    /// window writes and reconciles, using whatever state is current then.
    ///
    /// Must be called from within a tokio runtime.
    pub fn persist_and_reconcile(&self) {
        let mut state = self.lock_debounce();

        if let Some(previous) = state.pending.take() {
            previous.abort();
            debug!("Debounce timer re-armed");
        }

        state.generation += 1;
        let generation = state.generation;
        let manager = self.clone();
        let debounce = self.debounce;

        // Spawned while the lock is held so the task cannot claim before it is registered
        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if manager.claim_pending(generation) {
                manager.run_flush().await;
            }
        });
        state.pending = Some(handle);
    }

    /// Cancel any armed timer and write + reconcile immediately
    pub async fn flush(&self) -> ReconcileReport {
        self.cancel_pending();
        self.run_flush().await
    }

    pub fn has_pending_flush(&self) -> bool {
        self.lock_debounce().pending.is_some()
    }

    /// Number of completed flushes
    pub fn flush_count(&self) -> usize {
        self.flush_count.load(Ordering::SeqCst)
    }

    pub async fn last_report(&self) -> Option<ReconcileReport> {
        self.last_report.read().await.clone()
    }

    fn lock_debounce(&self) -> MutexGuard<'_, DebounceState> {
        self.debounce_state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Take ownership of the pending slot if `generation` is still the armed timer
    fn claim_pending(&self, generation: u64) -> bool {
        let mut state = self.lock_debounce();
        if state.generation == generation && state.pending.is_some() {
            state.pending = None;
            true
        } else {
            false
        }
    }

    fn cancel_pending(&self) {
        if let Some(pending) = self.lock_debounce().pending.take() {
            pending.abort();
            debug!("Pending debounce timer cancelled");
        }
    }

    async fn run_flush(&self) -> ReconcileReport {
        let snapshot = self.reminders.read().await.clone();

        let persisted = match encode_reminders(&snapshot) {
            Ok(json) => match self.store.set(REMINDERS_KEY, &json).await {
                Ok(()) => true,
                Err(e) => {
                    error!("Failed to save reminders: {e}");
                    false
                }
            },
            Err(e) => {
                error!("Failed to encode reminders: {e}");
                false
            }
        };

        let mut report = self.reconciler.reconcile(&snapshot).await;
        report.persisted = persisted;
        self.reconciler.log_scheduled().await;

        info!(
            "Reminders flushed: {} enabled, {} scheduled, permission {}",
            snapshot.iter().filter(|r| r.enabled).count(),
            report.scheduled_count(),
            report.permission
        );

        *self.last_report.write().await = Some(report.clone());
        self.flush_count.fetch_add(1, Ordering::SeqCst);
        report
    }
}
