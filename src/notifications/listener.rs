//! # Received-Notification Observer
//!
//! Delivered alerts are published on a broadcast hub owned by the platform.
//! One logging listener is registered at startup and unregistered at
//! shutdown; received alerts are logged and otherwise ignored.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.4.0

use super::platform::ReceivedNotification;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Broadcast channel capacity for delivered notifications
const HUB_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct NotificationHub {
    tx: broadcast::Sender<ReceivedNotification>,
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(HUB_CAPACITY);
        Self { tx }
    }

    /// Publish a delivered notification, returning how many listeners saw it
    pub fn publish(&self, notification: ReceivedNotification) -> usize {
        // No listeners is not an error
        self.tx.send(notification).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReceivedNotification> {
        self.tx.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Background task that logs every delivered notification
pub struct ReceivedLogger {
    handle: JoinHandle<()>,
    received: Arc<AtomicUsize>,
}

impl ReceivedLogger {
    pub fn register(hub: &NotificationHub) -> Self {
        let mut rx = hub.subscribe();
        let received = Arc::new(AtomicUsize::new(0));
        let counter = received.clone();

        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(notification) => {
                        counter.fetch_add(1, Ordering::SeqCst);
                        info!(
                            "🔔 Notification received: {} ({}) at {}",
                            notification.content.title,
                            notification.handle,
                            notification.delivered_at
                        );
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Notification logger lagged, skipped {skipped} notifications");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("Notification logger stopped");
        });

        debug!("Notification logger registered");
        Self { handle, received }
    }

    /// Notifications logged so far
    pub fn received_count(&self) -> usize {
        self.received.load(Ordering::SeqCst)
    }

    pub async fn unregister(self) {
        self.handle.abort();
        // Cancellation is the expected outcome
        let _ = self.handle.await;
        debug!("Notification logger unregistered");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::platform::{
        NotificationContent, NotificationHandle, NotificationPriority, PresentationOptions,
    };
    use chrono::NaiveDate;

    fn received(title: &str) -> ReceivedNotification {
        ReceivedNotification {
            handle: NotificationHandle("h-1".to_string()),
            content: NotificationContent {
                title: title.to_string(),
                body: "body".to_string(),
                sound: None,
                priority: NotificationPriority::Default,
            },
            delivered_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            presentation: PresentationOptions::default(),
        }
    }

    #[tokio::test]
    async fn test_publish_without_listeners() {
        let hub = NotificationHub::new();
        assert_eq!(hub.publish(received("nobody")), 0);
    }

    #[tokio::test]
    async fn test_subscribers_receive_published() {
        let hub = NotificationHub::new();
        let mut rx = hub.subscribe();

        assert_eq!(hub.publish(received("hello")), 1);
        assert_eq!(rx.recv().await.unwrap().content.title, "hello");
    }

    #[tokio::test]
    async fn test_logger_lifecycle() {
        let hub = NotificationHub::new();
        let logger = ReceivedLogger::register(&hub);
        assert_eq!(hub.listener_count(), 1);

        hub.publish(received("first"));
        hub.publish(received("second"));

        for _ in 0..100 {
            if logger.received_count() == 2 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(logger.received_count(), 2);

        logger.unregister().await;
        assert_eq!(hub.listener_count(), 0);
    }
}
