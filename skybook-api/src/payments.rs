use axum::{
    extract::{Path, State},
    routing::{patch, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use skybook_core::payment::PaymentMethod;
use skybook_order::payment_form::AlternativeDetails;
use skybook_order::{CardField, Step};
use tracing::info;
use uuid::Uuid;
use crate::error::AppError;
use crate::state::{AppState, SharedWorkflow};
use crate::view::StepView;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/sessions/{id}/payment/method", put(select_method))
        .route("/v1/sessions/{id}/payment/card", patch(update_card))
        .route("/v1/sessions/{id}/payment/alternative", patch(update_alternative))
        .route("/v1/sessions/{id}/payment/terms", put(set_terms))
        .route("/v1/sessions/{id}/payment/confirm", post(confirm_payment))
}

#[derive(Debug, Deserialize)]
pub struct MethodChoice {
    pub method: PaymentMethod,
}

#[derive(Debug, Deserialize)]
pub struct CardInput {
    pub field: CardField,
    pub value: String,
}

/// Inputs of the non-card methods; absent keys are left as they were.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeInput {
    pub upi_id: Option<String>,
    pub bank: Option<String>,
    pub wallet: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TermsInput {
    pub accepted: bool,
}

/// Payment inputs only apply while the payment step is showing.
async fn payment_step(state: &AppState, id: Uuid) -> Result<SharedWorkflow, AppError> {
    let session = state.session(id).await?;
    if session.lock().await.step() != Step::Payment {
        return Err(AppError::ConflictError("Payment step is not active".to_string()));
    }
    Ok(session)
}

async fn select_method(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(choice): Json<MethodChoice>,
) -> Result<Json<StepView>, AppError> {
    let session = payment_step(&state, id).await?;
    let mut workflow = session.lock().await;
    workflow.payment_mut().select(choice.method);
    Ok(Json(StepView::of(&workflow)))
}

async fn update_card(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<CardInput>,
) -> Result<Json<Value>, AppError> {
    let session = payment_step(&state, id).await?;
    let mut workflow = session.lock().await;
    let value = workflow.payment_mut().update_card(input.field, &input.value);
    Ok(Json(json!({ "field": input.field, "value": value })))
}

async fn update_alternative(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<AlternativeInput>,
) -> Result<Json<AlternativeDetails>, AppError> {
    let session = payment_step(&state, id).await?;
    let mut workflow = session.lock().await;
    let selector = workflow.payment_mut();
    if let Some(upi_id) = &input.upi_id {
        selector.set_upi_id(upi_id);
    }
    if let Some(bank) = &input.bank {
        selector.set_bank(bank);
    }
    if let Some(wallet) = &input.wallet {
        selector.set_wallet(wallet);
    }
    Ok(Json(selector.alternatives().clone()))
}

async fn set_terms(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<TermsInput>,
) -> Result<Json<StepView>, AppError> {
    let session = payment_step(&state, id).await?;
    let mut workflow = session.lock().await;
    workflow.payment_mut().set_terms_accepted(input.accepted);
    Ok(Json(StepView::of(&workflow)))
}

async fn confirm_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let session = state.session(id).await?;
    let mut workflow = session.lock().await;
    let event = workflow.confirm_payment().await?;
    info!(
        "Session {} confirmed booking {} ({} {})",
        id, event.booking_reference, event.total_amount, event.currency
    );
    Ok(Json(json!({ "event": event, "view": StepView::of(&workflow) })))
}
