//! Application services for interview scheduling and completion.

mod completion;
mod error;
mod scheduler;

pub use completion::{CompletedInterview, InterviewCompletionService, TokenValidation};
pub use error::{InterviewServiceError, InterviewServiceResult};
pub use scheduler::{InterviewScheduler, ScheduledInterview, SchedulerSettings};
