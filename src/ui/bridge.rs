// Notification bridge - carries job state transitions to the interactive thread
//
// This is the only path between the background job and the GUI:
// 1. The job task (producer) emits a JobNotification per state transition
// 2. The Slint event loop (consumer) drains pending notifications on its own timer
//
// The channel is unbounded so a producer never waits on a slow consumer, and
// draining never waits on the producer.

use crate::metrics::JobMetrics;
use crate::models::{JobEvent, JobId, JobNotification};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Create a connected sender/receiver pair
///
/// # Example
/// ```ignore
/// let (notifier, mut receiver) = bridge::channel(metrics);
///
/// // Job task
/// notifier.emit(job_id, JobEvent::Cancelled);
///
/// // GUI timer tick
/// for notification in receiver.drain() {
///     apply(&ui, &notification);
/// }
/// ```
pub fn channel(metrics: Arc<JobMetrics>) -> (NotificationSender, NotificationReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        NotificationSender {
            tx,
            metrics: Arc::clone(&metrics),
        },
        NotificationReceiver { rx, metrics },
    )
}

/// Producer half, cloned into every job task
#[derive(Debug, Clone)]
pub struct NotificationSender {
    tx: mpsc::UnboundedSender<JobNotification>,
    metrics: Arc<JobMetrics>,
}

impl NotificationSender {
    /// Queue a notification. Never blocks; silently dropped once the receiver is gone.
    pub fn emit(&self, job: JobId, event: JobEvent) {
        tracing::trace!("Job {} notification: {:?}", job, event);

        match self.tx.send(JobNotification { job, event }) {
            Ok(()) => self.metrics.record_notification_emitted(),
            Err(_) => {
                self.metrics.record_notification_dropped();
                tracing::debug!("Notification for job {} dropped - receiver has closed", job);
            }
        }
    }

    pub fn metrics(&self) -> &Arc<JobMetrics> {
        &self.metrics
    }

    /// True once the consuming side has been dropped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half, owned by the interactive thread
#[derive(Debug)]
pub struct NotificationReceiver {
    rx: mpsc::UnboundedReceiver<JobNotification>,
    metrics: Arc<JobMetrics>,
}

impl NotificationReceiver {
    /// Take every notification queued so far, in emission order, without waiting
    pub fn drain(&mut self) -> Vec<JobNotification> {
        let mut drained = Vec::new();
        while let Ok(notification) = self.rx.try_recv() {
            drained.push(notification);
        }

        if !drained.is_empty() {
            self.metrics.record_notifications_drained(drained.len());
        }
        drained
    }

    /// Take the next queued notification, if any, without waiting
    pub fn try_next(&mut self) -> Option<JobNotification> {
        let next = self.rx.try_recv().ok();
        if next.is_some() {
            self.metrics.record_notifications_drained(1);
        }
        next
    }

    /// Wait for the next notification; `None` once every sender is gone
    pub async fn recv(&mut self) -> Option<JobNotification> {
        let next = self.rx.recv().await;
        if next.is_some() {
            self.metrics.record_notifications_drained(1);
        }
        next
    }
}
