//! Port contracts for the notification outbox.

pub mod gateway;
pub mod queue;

#[cfg(test)]
pub use gateway::MockNotificationGateway;
pub use gateway::{NotificationGateway, NotificationGatewayError, NotificationGatewayResult};
pub use queue::{EmailQueueError, EmailQueueRepository, EmailQueueResult};
