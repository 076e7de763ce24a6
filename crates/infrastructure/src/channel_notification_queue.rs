//! Bounded in-process notification queue and its delivery worker.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use formwell_application::{NotificationQueue, NotificationService, SubmissionNotification};
use formwell_core::{AppError, AppResult};

/// Sending half of the notification channel.
///
/// Enqueueing never waits. A full or closed channel drops the job with an
/// error the caller logs.
#[derive(Clone)]
pub struct ChannelNotificationQueue {
    sender: mpsc::Sender<SubmissionNotification>,
}

impl ChannelNotificationQueue {
    /// Creates a queue holding at most `capacity` pending jobs.
    #[must_use]
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<SubmissionNotification>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl NotificationQueue for ChannelNotificationQueue {
    async fn enqueue(&self, notification: SubmissionNotification) -> AppResult<()> {
        self.sender
            .try_send(notification)
            .map_err(|error| match error {
                TrySendError::Full(job) => AppError::Internal(format!(
                    "notification queue is full, dropping notification for submission '{}'",
                    job.submission_id
                )),
                TrySendError::Closed(job) => AppError::Internal(format!(
                    "notification queue is closed, dropping notification for submission '{}'",
                    job.submission_id
                )),
            })
    }
}

/// Spawns the worker delivering queued notifications one at a time.
///
/// The task ends once every sender has been dropped.
pub fn spawn_notification_worker(
    mut receiver: mpsc::Receiver<SubmissionNotification>,
    service: NotificationService,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("notification worker started");
        while let Some(notification) = receiver.recv().await {
            service.deliver(&notification).await;
        }
        warn!("notification worker stopped, channel closed");
    })
}
