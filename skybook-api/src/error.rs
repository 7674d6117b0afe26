use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use skybook_core::payment::PaymentError;
use skybook_core::{CoreError, SessionKey};
use skybook_order::{FieldErrors, WorkflowError};

#[derive(Debug)]
pub enum AppError {
    NotFoundError(String),
    ValidationError(FieldErrors),
    BadRequestError(String),
    ConflictError(String),
    CapacityError(String),
    PaymentError(PaymentError),
    /// Guard failure: the visitor starts over from search.
    Redirect(SessionKey),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": "Validation failed", "errors": errors }),
            ),
            AppError::BadRequestError(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::CapacityError(msg) => (StatusCode::SERVICE_UNAVAILABLE, json!({ "error": msg })),
            AppError::PaymentError(err) => {
                let status = match err {
                    PaymentError::Declined(_) => StatusCode::PAYMENT_REQUIRED,
                    PaymentError::GatewayUnavailable(_) => StatusCode::BAD_GATEWAY,
                    PaymentError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                };
                (status, json!({ "error": err.to_string() }))
            }
            AppError::Redirect(missing) => (
                StatusCode::OK,
                json!({ "redirect": "search", "missing": missing.as_str() }),
            ),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "Internal Server Error" }))
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::PrerequisiteMissing { key, .. } => AppError::Redirect(key),
            WorkflowError::ValidationFailed(errors) => AppError::ValidationError(errors),
            WorkflowError::TermsNotAccepted => AppError::ConflictError(err.to_string()),
            WorkflowError::InvalidTransition { .. } => AppError::ConflictError(err.to_string()),
            WorkflowError::UnknownPassenger(_) | WorkflowError::UnknownField { .. } => {
                AppError::BadRequestError(err.to_string())
            }
            WorkflowError::Payment(payment) => AppError::PaymentError(payment),
            WorkflowError::Core(CoreError::ValidationError(msg)) => AppError::BadRequestError(msg),
            WorkflowError::Core(other) => AppError::InternalServerError(other.to_string()),
        }
    }
}
