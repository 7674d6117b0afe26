use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use skybook_api::{app, AppState};
use skybook_order::SimulatedGateway;
use skybook_store::Config;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn test_state(config: Config) -> AppState {
    let gateway = Arc::new(SimulatedGateway::new(Duration::from_millis(0)));
    AppState::with_gateway(config, gateway)
}

fn test_app() -> Router {
    app(test_state(Config::default()))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn flight(travellers: u32) -> Value {
    json!({
        "carrier": "IndiGo",
        "flightNumber": "6E-201",
        "origin": "DEL",
        "destination": "BOM",
        "departureTime": "06:10",
        "arrivalTime": "08:25",
        "searchCriteria": {"origin": "DEL", "destination": "BOM", "date": "2025-03-14", "travellers": travellers},
        "finalPrice": 1000
    })
}

async fn new_session(app: &Router) -> String {
    let (status, body) = call(app, "POST", "/v1/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["step"], "search");
    body["sessionId"].as_str().unwrap().to_string()
}

async fn fill_passenger(app: &Router, id: &str, index: usize) {
    let fields = [
        ("firstName", "Asha"),
        ("lastName", "Rao"),
        ("gender", "female"),
        ("age", "30"),
    ];
    for (field, value) in fields {
        let (status, _) = call(
            app,
            "PATCH",
            &format!("/v1/sessions/{}/passengers/{}", id, index),
            Some(json!({"field": field, "value": value})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}

/// Session with a flight selected and the passenger step filled in.
async fn at_passenger_details(app: &Router) -> String {
    let id = new_session(app).await;
    let (status, _) = call(app, "PUT", &format!("/v1/sessions/{}/flight", id), Some(flight(1))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = call(app, "GET", &format!("/v1/sessions/{}/steps/passenger-details", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "passenger-details");

    fill_passenger(app, &id, 0).await;
    for (field, value) in [("email", "asha@example.com"), ("phone", "98765-43210")] {
        call(
            app,
            "PATCH",
            &format!("/v1/sessions/{}/passengers/0", id),
            Some(json!({"field": field, "value": value})),
        )
        .await;
    }
    id
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let app = test_app();
    let uri = format!("/v1/sessions/{}/pricing", uuid::Uuid::new_v4());
    let (status, _) = call(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_entering_step_without_flight_redirects_to_search() {
    let app = test_app();
    let id = new_session(&app).await;

    let (status, body) = call(&app, "GET", &format!("/v1/sessions/{}/steps/payment", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["redirect"], "search");
    assert_eq!(body["missing"], "selectedFlight");
}

#[tokio::test]
async fn test_unknown_step_name() {
    let app = test_app();
    let id = new_session(&app).await;
    let (status, _) = call(&app, "GET", &format!("/v1/sessions/{}/steps/boarding", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pricing_for_legacy_fare() {
    let app = test_app();
    let id = new_session(&app).await;
    call(&app, "PUT", &format!("/v1/sessions/{}/flight", id), Some(flight(1))).await;

    let (status, body) = call(&app, "GET", &format!("/v1/sessions/{}/pricing", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["base"]["amount"], 1000.0);
    assert_eq!(body["taxes"]["amount"], 180.0);
    assert_eq!(body["total"]["formatted"], "₹1,180");
}

#[tokio::test]
async fn test_continue_with_empty_form_returns_field_errors() {
    let app = test_app();
    let id = new_session(&app).await;
    call(&app, "PUT", &format!("/v1/sessions/{}/flight", id), Some(flight(2))).await;
    call(&app, "GET", &format!("/v1/sessions/{}/steps/passenger-details", id), None).await;

    let (status, body) = call(&app, "POST", &format!("/v1/sessions/{}/continue", id), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["0-firstName"], "First name is required");
    assert_eq!(body["errors"]["1-lastName"], "Last name is required");
    assert_eq!(body["errors"]["0-email"], "Email is required");
    assert!(body["errors"].get("1-email").is_none());
}

#[tokio::test]
async fn test_contact_fields_only_on_primary_passenger() {
    let app = test_app();
    let id = new_session(&app).await;
    call(&app, "PUT", &format!("/v1/sessions/{}/flight", id), Some(flight(2))).await;
    call(&app, "GET", &format!("/v1/sessions/{}/steps/passenger-details", id), None).await;

    let (status, _) = call(
        &app,
        "PATCH",
        &format!("/v1/sessions/{}/passengers/1", id),
        Some(json!({"field": "email", "value": "kid@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_assistance_toggle() {
    let app = test_app();
    let id = at_passenger_details(&app).await;
    let uri = format!("/v1/sessions/{}/passengers/0/assistance", id);

    let (_, body) = call(&app, "POST", &uri, Some(json!({"kind": "mobility"}))).await;
    assert_eq!(body["selected"], true);
    let (_, body) = call(&app, "POST", &uri, Some(json!({"kind": "mobility"}))).await;
    assert_eq!(body["selected"], false);
}

#[tokio::test]
async fn test_seat_selection_then_payment() {
    let app = test_app();
    let id = at_passenger_details(&app).await;

    let (status, body) = call(&app, "POST", &format!("/v1/sessions/{}/continue", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["view"]["step"], "seat-selection");

    let (status, body) = call(
        &app,
        "PUT",
        &format!("/v1/sessions/{}/seats", id),
        Some(json!({"seats": {"0": "99Z"}})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["0-seat"].is_string());

    let (status, body) = call(
        &app,
        "PUT",
        &format!("/v1/sessions/{}/seats", id),
        Some(json!({"seats": {"0": "12A"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "payment");

    let (_, body) = call(&app, "POST", &format!("/v1/sessions/{}/back", id), None).await;
    assert_eq!(body["step"], "seat-selection");
}

#[tokio::test]
async fn test_payment_requires_terms() {
    let app = test_app();
    let id = at_passenger_details(&app).await;
    call(&app, "POST", &format!("/v1/sessions/{}/skip-seats", id), None).await;

    let (status, _) = call(&app, "POST", &format!("/v1/sessions/{}/payment/confirm", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = call(
        &app,
        "PUT",
        &format!("/v1/sessions/{}/payment/terms", id),
        Some(json!({"accepted": true})),
    )
    .await;
    assert_eq!(body["payment"]["canProceed"], true);
}

#[tokio::test]
async fn test_card_input_is_masked() {
    let app = test_app();
    let id = at_passenger_details(&app).await;
    call(&app, "POST", &format!("/v1/sessions/{}/skip-seats", id), None).await;

    let (status, body) = call(
        &app,
        "PATCH",
        &format!("/v1/sessions/{}/payment/card", id),
        Some(json!({"field": "number", "value": "4111-1111-1111-1111-99"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], "4111111111111111");

    let (_, body) = call(
        &app,
        "PATCH",
        &format!("/v1/sessions/{}/payment/card", id),
        Some(json!({"field": "expiry", "value": "1227"})),
    )
    .await;
    assert_eq!(body["value"], "12/27");
}

#[tokio::test]
async fn test_card_input_outside_payment_step() {
    let app = test_app();
    let id = at_passenger_details(&app).await;
    let (status, _) = call(
        &app,
        "PATCH",
        &format!("/v1/sessions/{}/payment/card", id),
        Some(json!({"field": "cvv", "value": "123"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_full_booking_flow() {
    let app = test_app();
    let id = at_passenger_details(&app).await;

    let (status, body) = call(&app, "POST", &format!("/v1/sessions/{}/skip-seats", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["view"]["step"], "payment");
    assert_eq!(body["view"]["pricing"]["total"]["formatted"], "₹1,180");

    call(
        &app,
        "PUT",
        &format!("/v1/sessions/{}/payment/method", id),
        Some(json!({"method": "UPI"})),
    )
    .await;
    call(
        &app,
        "PUT",
        &format!("/v1/sessions/{}/payment/terms", id),
        Some(json!({"accepted": true})),
    )
    .await;

    let (status, body) = call(&app, "POST", &format!("/v1/sessions/{}/payment/confirm", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["event"]["total_amount"], 1180.0);
    assert_eq!(body["view"]["step"], "confirmation");
    let reference = body["event"]["booking_reference"].as_str().unwrap().to_string();
    assert_eq!(reference.len(), 6);

    // Re-entering the confirmation step shows the same booking.
    let (_, body) = call(&app, "GET", &format!("/v1/sessions/{}/steps/confirmation", id), None).await;
    assert_eq!(body["confirmation"]["bookingReference"], reference);

    // Restart wipes everything but keeps the session.
    let (status, body) = call(&app, "POST", &format!("/v1/sessions/{}/restart", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "search");
    let (_, body) = call(&app, "GET", &format!("/v1/sessions/{}/steps/confirmation", id), None).await;
    assert_eq!(body["redirect"], "search");
}

#[tokio::test]
async fn test_delete_drops_session() {
    let state = test_state(Config::default());
    let app = app(state.clone());
    let id = new_session(&app).await;
    let _other = new_session(&app).await;
    assert_eq!(state.session_count().await, 2);

    let (status, _) = call(&app, "DELETE", &format!("/v1/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(state.session_count().await, 1);

    let (status, _) = call(&app, "GET", &format!("/v1/sessions/{}/steps/search", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, "DELETE", &format!("/v1/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_idle_sessions_are_swept() {
    let mut config = Config::default();
    config.sessions.idle_ttl_secs = 0;
    let state = test_state(config);
    let app = app(state.clone());
    let id = new_session(&app).await;

    assert_eq!(state.sweep_idle().await, 1);
    assert_eq!(state.session_count().await, 0);
    let (status, _) = call(&app, "GET", &format!("/v1/sessions/{}/pricing", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_limit() {
    let mut config = Config::default();
    config.sessions.max_sessions = 2;
    let state = test_state(config);
    let app = app(state.clone());
    new_session(&app).await;
    new_session(&app).await;

    let (status, _) = call(&app, "POST", "/v1/sessions", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(state.session_count().await, 2);
}

#[tokio::test]
async fn test_passenger_step_shows_pricing() {
    let app = test_app();
    let id = new_session(&app).await;
    call(&app, "PUT", &format!("/v1/sessions/{}/flight", id), Some(flight(1))).await;

    let (_, body) = call(&app, "GET", &format!("/v1/sessions/{}/steps/passenger-details", id), None).await;
    assert_eq!(body["pricing"]["total"]["formatted"], "₹1,180");
}

#[tokio::test]
async fn test_assistance_overlay_open_and_close() {
    let app = test_app();
    let id = at_passenger_details(&app).await;
    call(
        &app,
        "POST",
        &format!("/v1/sessions/{}/passengers/0/assistance", id),
        Some(json!({"kind": "elderly"})),
    )
    .await;

    let (status, body) = call(&app, "POST", &format!("/v1/sessions/{}/passengers/0/assistance/open", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scroll"], "suppress");
    let options = body["options"].as_array().unwrap();
    assert_eq!(options.len(), 6);
    let elderly = options.iter().find(|o| o["kind"] == "elderly").unwrap();
    assert_eq!(elderly["selected"], true);
    assert!(elderly["label"].is_string());

    let (_, body) = call(&app, "GET", &format!("/v1/sessions/{}/steps/passenger-details", id), None).await;
    assert_eq!(body["assistanceOpenFor"], 0);

    let close_uri = format!("/v1/sessions/{}/assistance/close", id);
    let (_, body) = call(&app, "POST", &close_uri, Some(json!({"reason": "escape"}))).await;
    assert_eq!(body["scroll"], "restore");
    let (_, body) = call(&app, "POST", &close_uri, Some(json!({"reason": "backdrop"}))).await;
    assert_eq!(body["scroll"], "unchanged");

    let (status, _) = call(&app, "POST", &format!("/v1/sessions/{}/passengers/5/assistance/open", id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_alternative_method_inputs_are_stored() {
    let app = test_app();
    let id = at_passenger_details(&app).await;
    call(&app, "POST", &format!("/v1/sessions/{}/skip-seats", id), None).await;

    let uri = format!("/v1/sessions/{}/payment/alternative", id);
    let (status, body) = call(&app, "PATCH", &uri, Some(json!({"upiId": " asha@upi "}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["upiId"], "asha@upi");

    let (_, body) = call(&app, "PATCH", &uri, Some(json!({"wallet": "Paytm"}))).await;
    assert_eq!(body["upiId"], "asha@upi");
    assert_eq!(body["wallet"], "Paytm");
    assert_eq!(body["bank"], "");
}
