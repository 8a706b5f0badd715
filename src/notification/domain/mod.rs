//! Domain model for queued candidate emails.

mod email;
mod error;
mod payload;

pub use email::{
    DeliveryWindow, EmailKind, EmailStatus, PersistedQueuedEmailData, QueuedEmail, QueuedEmailId,
};
pub use error::{ParseEmailKindError, ParseEmailStatusError};
pub use payload::EmailPayload;
