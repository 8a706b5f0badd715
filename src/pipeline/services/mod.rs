//! Application services for the candidate pipeline.

mod ai_screening;
mod error;
mod intake;
mod screening;

pub use ai_screening::{AiScreeningOutcome, AiScreeningService, PendingScreeningResult};
pub use error::{ApplicationServiceError, ApplicationServiceResult};
pub use intake::{ApplicationService, SubmitApplicationRequest};
pub use screening::{DecisionOutcome, ScreeningService};
