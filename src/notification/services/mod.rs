//! Application services for the notification outbox.

mod dispatcher;
mod outbox;
mod processor;

pub use dispatcher::{NotificationDispatch, NotificationDispatcher};
pub use outbox::{EnqueueOutcome, NotificationOutbox};
pub use processor::{EmailQueueProcessor, QueueReport, QueueSettings};
