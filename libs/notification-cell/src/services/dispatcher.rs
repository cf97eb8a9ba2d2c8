// libs/notification-cell/src/services/dispatcher.rs
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::models::RescheduleNotice;
use crate::services::notifier::Notifier;

/// Decouples booking from delivery: `dispatch` enqueues and returns
/// immediately, a spawned worker drains the queue and calls the notifier.
pub struct NotificationDispatcher {
    tx: mpsc::Sender<RescheduleNotice>,
}

impl NotificationDispatcher {
    /// Spawn the delivery worker and hand back the queue handle.
    pub fn start(notifier: Arc<dyn Notifier>, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<RescheduleNotice>(capacity);

        tokio::spawn(async move {
            while let Some(notice) = rx.recv().await {
                if let Err(e) = notifier.notify(&notice).await {
                    warn!("Failed to deliver notice to {}: {}", notice.recipient, e);
                }
            }
            debug!("Notification queue closed, delivery worker exiting");
        });

        Self { tx }
    }

    /// Fire-and-forget enqueue. Notices are best-effort and must never
    /// block or fail a committed booking, so a full queue drops the notice.
    pub fn dispatch(&self, notice: RescheduleNotice) {
        if let Err(e) = self.tx.try_send(notice) {
            warn!("Notification queue full, dropping notice: {}", e);
        }
    }
}
