use axum::{
    extract::{Path, State},
    routing::{patch, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use skybook_order::assistance::{AssistanceType, CloseReason};
use skybook_order::{PassengerField, SeatSelection};
use uuid::Uuid;
use crate::error::AppError;
use crate::state::AppState;
use crate::view::StepView;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/sessions/{id}/passengers/{index}", patch(update_passenger))
        .route("/v1/sessions/{id}/passengers/{index}/assistance", post(toggle_assistance))
        .route("/v1/sessions/{id}/passengers/{index}/assistance/open", post(open_assistance))
        .route("/v1/sessions/{id}/assistance/close", post(close_assistance))
        .route("/v1/sessions/{id}/continue", post(continue_to_seats))
        .route("/v1/sessions/{id}/skip-seats", post(skip_seats))
        .route("/v1/sessions/{id}/seats", put(save_seats))
}

#[derive(Debug, Deserialize)]
pub struct FieldUpdate {
    pub field: PassengerField,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct AssistanceToggle {
    pub kind: AssistanceType,
}

async fn update_passenger(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(update): Json<FieldUpdate>,
) -> Result<Json<StepView>, AppError> {
    let session = state.session(id).await?;
    let mut workflow = session.lock().await;
    workflow.update_passenger(index, update.field, &update.value)?;
    Ok(Json(StepView::of(&workflow)))
}

async fn toggle_assistance(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(toggle): Json<AssistanceToggle>,
) -> Result<Json<Value>, AppError> {
    let session = state.session(id).await?;
    let mut workflow = session.lock().await;
    let selected = workflow.toggle_assistance(index, toggle.kind)?;
    Ok(Json(json!({ "kind": toggle.kind, "selected": selected })))
}

#[derive(Debug, Deserialize)]
pub struct OverlayClose {
    pub reason: CloseReason,
}

/// Opens the overlay for one passenger and lists every assistance type with its current state.
async fn open_assistance(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<Value>, AppError> {
    let session = state.session(id).await?;
    let mut workflow = session.lock().await;
    let scroll = workflow.open_assistance(index)?;

    let selected = workflow
        .passenger_form()
        .map(|form| form.special_assistance().for_passenger(index))
        .unwrap_or_default();
    let options: Vec<Value> = AssistanceType::ALL
        .iter()
        .map(|kind| {
            json!({
                "kind": kind,
                "label": kind.label(),
                "selected": selected.contains(kind),
            })
        })
        .collect();

    Ok(Json(json!({ "passenger": index, "scroll": scroll, "options": options })))
}

async fn close_assistance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(close): Json<OverlayClose>,
) -> Result<Json<Value>, AppError> {
    let session = state.session(id).await?;
    let mut workflow = session.lock().await;
    let scroll = workflow.close_assistance(close.reason);
    Ok(Json(json!({ "scroll": scroll })))
}

async fn continue_to_seats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let session = state.session(id).await?;
    let mut workflow = session.lock().await;
    let event = workflow.continue_to_seats()?;
    Ok(Json(json!({ "event": event, "view": StepView::of(&workflow) })))
}

async fn skip_seats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let session = state.session(id).await?;
    let mut workflow = session.lock().await;
    let event = workflow.skip_to_payment()?;
    Ok(Json(json!({ "event": event, "view": StepView::of(&workflow) })))
}

async fn save_seats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(selection): Json<SeatSelection>,
) -> Result<Json<StepView>, AppError> {
    let session = state.session(id).await?;
    let mut workflow = session.lock().await;
    workflow.save_seats(selection)?;
    Ok(Json(StepView::of(&workflow)))
}
