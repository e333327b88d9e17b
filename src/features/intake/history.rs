//! Intake log: the set of dates the daily dose was taken.

use super::calendar::{Month, MonthlyStats};
use crate::storage::{KeyValueStore, INTAKE_LOG_KEY};
use anyhow::Result;
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Storage format for a logged date
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct IntakeLog {
    store: Arc<dyn KeyValueStore>,
    dates: RwLock<BTreeSet<NaiveDate>>,
}

impl IntakeLog {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            dates: RwLock::new(BTreeSet::new()),
        }
    }

    /// Load the saved log. Missing or unreadable data yields an empty log.
    pub async fn load(&self) -> usize {
        let raw = match self.store.get(INTAKE_LOG_KEY).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to read intake log: {e}");
                None
            }
        };

        let entries: Vec<String> = match raw {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Failed to parse intake log, starting empty: {e}");
                Vec::new()
            }),
            None => Vec::new(),
        };

        let mut dates = BTreeSet::new();
        for entry in &entries {
            match NaiveDate::parse_from_str(entry, DATE_FORMAT) {
                Ok(date) => {
                    dates.insert(date);
                }
                Err(_) => warn!("Skipping malformed intake date '{entry}'"),
            }
        }

        let count = dates.len();
        *self.dates.write().await = dates;
        debug!("Loaded {count} intake dates");
        count
    }

    pub async fn is_taken(&self, date: NaiveDate) -> bool {
        self.dates.read().await.contains(&date)
    }

    pub async fn taken_dates(&self) -> BTreeSet<NaiveDate> {
        self.dates.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.dates.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.dates.read().await.is_empty()
    }

    /// Flip `date` and persist. Memory is only updated once the write succeeds.
    pub async fn toggle(&self, date: NaiveDate) -> Result<bool> {
        let mut dates = self.dates.write().await;
        let mut updated = dates.clone();

        let taken = if updated.remove(&date) {
            false
        } else {
            updated.insert(date);
            true
        };

        let encoded: Vec<String> = updated
            .iter()
            .map(|d| d.format(DATE_FORMAT).to_string())
            .collect();
        self.store
            .set(INTAKE_LOG_KEY, &serde_json::to_string(&encoded)?)
            .await?;

        *dates = updated;
        info!("Intake for {} marked {}", date, if taken { "taken" } else { "not taken" });
        Ok(taken)
    }

    pub async fn toggle_today(&self, today: NaiveDate) -> Result<bool> {
        self.toggle(today).await
    }

    /// Calendar-cell toggle: future dates are ignored and return `None`
    pub async fn toggle_past(&self, date: NaiveDate, today: NaiveDate) -> Result<Option<bool>> {
        if date > today {
            debug!("Ignoring toggle for future date {date}");
            return Ok(None);
        }
        self.toggle(date).await.map(Some)
    }

    pub async fn monthly_stats(&self, month: Month) -> MonthlyStats {
        MonthlyStats::compute(&*self.dates.read().await, month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_toggle_persists_and_reloads() {
        let store = Arc::new(MemoryStore::new());
        let log = IntakeLog::new(store.clone());
        assert_eq!(log.load().await, 0);

        assert!(log.toggle(date(2024, 5, 2)).await.unwrap());
        assert!(log.toggle(date(2024, 5, 1)).await.unwrap());
        assert!(log.is_taken(date(2024, 5, 1)).await);

        let raw = store.get(INTAKE_LOG_KEY).await.unwrap().unwrap();
        assert_eq!(raw, "[\"2024-05-01\",\"2024-05-02\"]");

        let reloaded = IntakeLog::new(store);
        assert_eq!(reloaded.load().await, 2);
        assert!(!reloaded.toggle(date(2024, 5, 2)).await.unwrap());
        assert!(!reloaded.is_taken(date(2024, 5, 2)).await);
    }

    #[tokio::test]
    async fn test_load_skips_malformed_entries() {
        let store = Arc::new(MemoryStore::new());
        store.insert(INTAKE_LOG_KEY, "[\"2024-05-01\",\"yesterday\",\"2024-02-30\"]");

        let log = IntakeLog::new(store);
        assert_eq!(log.load().await, 1);
        assert!(log.is_taken(date(2024, 5, 1)).await);
    }

    #[tokio::test]
    async fn test_load_garbage_is_empty() {
        let store = Arc::new(MemoryStore::new());
        store.insert(INTAKE_LOG_KEY, "not json");

        let log = IntakeLog::new(store);
        assert_eq!(log.load().await, 0);
        assert!(log.is_empty().await);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_log_unchanged() {
        let store = Arc::new(MemoryStore::new());
        let log = IntakeLog::new(store.clone());
        store.set_fail_writes(true);

        assert!(log.toggle_today(date(2024, 5, 1)).await.is_err());
        assert!(!log.is_taken(date(2024, 5, 1)).await);
    }

    #[tokio::test]
    async fn test_toggle_past_ignores_future() {
        let log = IntakeLog::new(Arc::new(MemoryStore::new()));
        let today = date(2024, 5, 10);

        assert_eq!(log.toggle_past(date(2024, 5, 11), today).await.unwrap(), None);
        assert_eq!(log.toggle_past(date(2024, 5, 10), today).await.unwrap(), Some(true));
        assert_eq!(log.toggle_past(date(2024, 4, 30), today).await.unwrap(), Some(true));
        assert_eq!(log.len().await, 2);
    }

    #[tokio::test]
    async fn test_monthly_stats_from_log() {
        let log = IntakeLog::new(Arc::new(MemoryStore::new()));
        for d in 1..=15 {
            log.toggle(date(2024, 6, d)).await.unwrap();
        }
        log.toggle(date(2024, 7, 1)).await.unwrap();

        let stats = log.monthly_stats(Month::new(2024, 6).unwrap()).await;
        assert_eq!(stats.days_tracked, 15);
        assert_eq!(stats.days_in_month, 30);
        assert_eq!(stats.completion_rate, 50);
    }
}
