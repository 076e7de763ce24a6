use std::sync::Arc;

use formwell_application::{EmailService, NotificationQueue, NotificationService};
use formwell_infrastructure::{ChannelNotificationQueue, spawn_notification_worker};

/// Starts the notification worker and returns the queue feeding it.
///
/// Must run inside the tokio runtime.
pub(super) fn start_notification_pipeline(
    capacity: usize,
    email_service: Arc<dyn EmailService>,
) -> Arc<dyn NotificationQueue> {
    let (queue, receiver) = ChannelNotificationQueue::bounded(capacity);
    // Detached: the worker exits once the last queue handle is dropped.
    let _worker = spawn_notification_worker(receiver, NotificationService::new(email_service));
    Arc::new(queue)
}
