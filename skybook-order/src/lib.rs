pub mod models;
pub mod assistance;
pub mod passengers;
pub mod payment_form;
pub mod session;
pub mod orchestrator;
pub mod confirmation;
pub mod workflow;

pub use models::{BookingConfirmation, BookingSession, PassengerDetails, PassengerField, PassengerRecord, SeatSelection, Step};
pub use passengers::{FieldErrors, PassengerForm};
pub use payment_form::{CardField, PaymentSelector};
pub use orchestrator::{PaymentOrchestrator, RetryPolicy, SimulatedGateway};
pub use workflow::{BookingWorkflow, StepEntry};

use skybook_core::payment::PaymentError;
use skybook_core::{CoreError, SessionKey};

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// The visitor must restart from search.
    #[error("Step {step} requires {key} in the session")]
    PrerequisiteMissing { step: Step, key: SessionKey },

    #[error("{} field(s) need attention", .0.len())]
    ValidationFailed(FieldErrors),

    #[error("Terms and conditions must be accepted")]
    TermsNotAccepted,

    #[error("Invalid step transition from {from} to {to}")]
    InvalidTransition { from: Step, to: Step },

    #[error("No passenger at index {0}")]
    UnknownPassenger(usize),

    #[error("Passenger {index} has no {field} field")]
    UnknownField { index: usize, field: PassengerField },

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Core(#[from] CoreError),
}
