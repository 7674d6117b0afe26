use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use skybook_catalog::PriceBreakdown;
use skybook_core::FlightSelection;
use skybook_order::{Step, StepEntry};
use tracing::info;
use uuid::Uuid;
use crate::error::AppError;
use crate::state::AppState;
use crate::view::StepView;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/sessions", post(create_session))
        .route("/v1/sessions/{id}", delete(end_session))
        .route("/v1/sessions/{id}/restart", post(restart_session))
        .route("/v1/sessions/{id}/flight", put(select_flight))
        .route("/v1/sessions/{id}/steps/{step}", get(enter_step))
        .route("/v1/sessions/{id}/back", post(go_back))
        .route("/v1/sessions/{id}/pricing", get(get_pricing))
}

/// Renders a step entry, or the redirect body when a guard sent the visitor back to search.
pub fn entry_response(entry: StepEntry, view: StepView) -> Json<Value> {
    match entry {
        StepEntry::Rendered(_) => Json(json!(view)),
        StepEntry::Redirected { requested, missing } => Json(json!({
            "redirect": Step::Search.as_str(),
            "requested": requested.as_str(),
            "missing": missing.as_str(),
        })),
    }
}

async fn create_session(State(state): State<AppState>) -> Result<(StatusCode, Json<Value>), AppError> {
    let id = state.create_session().await?;
    info!("Created visitor session {}", id);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "sessionId": id, "step": Step::Search.as_str() })),
    ))
}

async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.remove_session(id).await?;
    info!("Ended visitor session {}", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn restart_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StepView>, AppError> {
    let session = state.session(id).await?;
    let mut workflow = session.lock().await;
    workflow.restart();
    Ok(Json(StepView::of(&workflow)))
}

async fn select_flight(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(flight): Json<FlightSelection>,
) -> Result<Json<StepView>, AppError> {
    let session = state.session(id).await?;
    let mut workflow = session.lock().await;
    workflow.select_flight(flight)?;
    Ok(Json(StepView::of(&workflow)))
}

async fn enter_step(
    State(state): State<AppState>,
    Path((id, step)): Path<(Uuid, String)>,
) -> Result<Json<Value>, AppError> {
    let step = Step::parse(&step)
        .ok_or_else(|| AppError::NotFoundError(format!("Unknown step '{}'", step)))?;
    let session = state.session(id).await?;
    let mut workflow = session.lock().await;
    let entry = workflow.enter(step)?;
    Ok(entry_response(entry, StepView::of(&workflow)))
}

async fn go_back(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let session = state.session(id).await?;
    let mut workflow = session.lock().await;
    let entry = workflow.back()?;
    Ok(entry_response(entry, StepView::of(&workflow)))
}

async fn get_pricing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PriceBreakdown>, AppError> {
    let session = state.session(id).await?;
    let workflow = session.lock().await;
    workflow
        .price_summary()
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError("No flight selected".to_string()))
}
