pub mod search;
pub mod repository;
pub mod payment;
pub mod validation;

pub use repository::{SessionBatch, SessionKey, SessionStore};
pub use search::{FlightSelection, PriceComponent, PricingBlock, SearchCriteria};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Session payload could not be encoded: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
