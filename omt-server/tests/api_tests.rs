//! Integration tests for the omt-server HTTP API
//!
//! Uses tower::ServiceExt::oneshot to test routes directly without binding a port.

use axum::body::Body;
use http_body_util::BodyExt;
use hyper::Request;
use omt_core::fault::FaultRules;
use omt_core::model::BikeData;
use omt_server::{api::create_router, state::AppState};
use omt_sim::{SimConfig, Simulator, DEFAULT_TICK_INTERVAL};
use tower::ServiceExt;

/// Helper: build a router with fresh default AppState
fn app() -> axum::Router {
    let state = AppState::new().expect("default state should build");
    create_router(state)
}

/// Helper: build a router with AppState returned for further manipulation
fn app_with_state() -> (axum::Router, AppState) {
    let state = AppState::new().expect("default state should build");
    let router = create_router(state.clone());
    (router, state)
}

/// Helper: router whose simulator starts from a given snapshot, parked
fn app_with_snapshot(snapshot: BikeData) -> (axum::Router, AppState) {
    let config = SimConfig {
        seed: Some(99),
        ..SimConfig::default()
    };
    let sim = Simulator::from_snapshot(snapshot, config).expect("snapshot should be valid");
    let state = AppState::with_source(Box::new(sim), FaultRules::default(), DEFAULT_TICK_INTERVAL)
        .expect("state should build");
    let router = create_router(state.clone());
    (router, state)
}

/// Helper: collect response body into a string
async fn body_string(body: Body) -> String {
    let collected = body.collect().await.unwrap();
    String::from_utf8(collected.to_bytes().to_vec()).unwrap()
}

async fn get(app: axum::Router, uri: &str) -> hyper::Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn send_json(
    app: axum::Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> hyper::Response<Body> {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

// ==================== GET / ====================

#[tokio::test]
async fn test_get_root_returns_200_with_html() {
    let response = get(app(), "/").await;
    assert_eq!(response.status(), 200);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(
        content_type.contains("text/html"),
        "Expected text/html content-type, got: {}",
        content_type
    );

    let body = body_string(response.into_body()).await;
    assert!(
        body.contains("<!DOCTYPE") || body.contains("<html"),
        "Response should contain HTML markup"
    );
}

// ==================== GET /api/telemetry ====================

#[tokio::test]
async fn test_get_telemetry_returns_initial_frame() {
    let response = get(app(), "/api/telemetry").await;
    assert_eq!(response.status(), 200);

    let body = body_string(response.into_body()).await;
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();

    assert_eq!(parsed["tick"], 0);
    assert_eq!(parsed["riding"], false);
    assert_eq!(parsed["data"]["speed"], 0.0);
    assert_eq!(parsed["data"]["gear"], 0);
    assert!(parsed["faults"].as_array().unwrap().is_empty());
    assert_eq!(parsed["gauges"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_get_telemetry_respects_field_mask() {
    let response = get(app(), "/api/telemetry?fields=speed,faults").await;
    assert_eq!(response.status(), 200);

    let body = body_string(response.into_body()).await;
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();

    assert!(parsed.get("timestamp").is_some());
    assert!(parsed["data"].get("speed").is_some());
    assert!(parsed["data"].get("engine_temp").is_none());
    assert!(parsed.get("faults").is_some());
    assert!(parsed.get("gauges").is_none());
}

// ==================== Faults ====================

#[tokio::test]
async fn test_get_faults_initially_empty() {
    let response = get(app(), "/api/faults").await;
    assert_eq!(response.status(), 200);

    let body = body_string(response.into_body()).await;
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_dismiss_unknown_fault_id_returns_404() {
    let (router, _) = app_with_state();
    let response = router
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/faults/engine-explosion")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_dismiss_inactive_fault_returns_404() {
    let (router, _) = app_with_state();
    let response = router
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/faults/engine-overheat")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_dismiss_active_fault_removes_it() {
    let snapshot = BikeData {
        fuel_level: 3.0,
        ..BikeData::default()
    };
    let (router, state) = app_with_snapshot(snapshot);

    // One manual tick: parked, so fuel holds at 3.0 and low-fuel triggers
    state.dashboard.write().await.tick();

    let response = get(router.clone(), "/api/faults").await;
    let body = body_string(response.into_body()).await;
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 1);
    assert_eq!(parsed[0]["id"], "low-fuel");
    assert_eq!(parsed[0]["severity"], "critical");

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/faults/low-fuel")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let response = get(router, "/api/faults").await;
    let body = body_string(response.into_body()).await;
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(parsed.as_array().unwrap().is_empty());
}

// ==================== Ride toggle ====================

#[tokio::test]
async fn test_ride_toggle_roundtrip() {
    let (router, _) = app_with_state();

    let response = get(router.clone(), "/api/ride").await;
    let body = body_string(response.into_body()).await;
    assert_eq!(body, r#"{"riding":false}"#);

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/ride/toggle")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body = body_string(response.into_body()).await;
    assert_eq!(body, r#"{"riding":true}"#);

    let response = get(router, "/api/ride").await;
    let body = body_string(response.into_body()).await;
    assert_eq!(body, r#"{"riding":true}"#);
}

// ==================== Settings ====================

#[tokio::test]
async fn test_get_settings_returns_factory_thresholds() {
    let response = get(app(), "/api/settings").await;
    assert_eq!(response.status(), 200);

    let body = body_string(response.into_body()).await;
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed["overheat_temp"], 110.0);
    assert_eq!(parsed["low_fuel"], 15.0);
    assert_eq!(parsed["high_vibration"], 60.0);
}

#[tokio::test]
async fn test_put_settings_partial_update_persists() {
    let (router, _) = app_with_state();

    let response = send_json(
        router.clone(),
        "PUT",
        "/api/settings",
        serde_json::json!({ "overheat_temp": 100.0 }),
    )
    .await;
    assert_eq!(response.status(), 200);

    let response = get(router, "/api/settings").await;
    let body = body_string(response.into_body()).await;
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed["overheat_temp"], 100.0);
    // Unspecified thresholds keep their factory values
    assert_eq!(parsed["low_fuel"], 15.0);
}

#[tokio::test]
async fn test_put_settings_rejects_inverted_thresholds() {
    let (router, state) = app_with_state();

    let response = send_json(
        router,
        "PUT",
        "/api/settings",
        serde_json::json!({ "critical_fuel": 50.0 }),
    )
    .await;
    assert_eq!(response.status(), 422);

    // Rejected update must not stick
    assert_eq!(state.dashboard.read().await.rules(), FaultRules::default());
}

// ==================== Assistant ====================

#[tokio::test]
async fn test_assistant_answers_safety_question() {
    let response = send_json(
        app(),
        "POST",
        "/api/assistant",
        serde_json::json!({ "message": "Is it safe to ride?" }),
    )
    .await;
    assert_eq!(response.status(), 200);

    let body = body_string(response.into_body()).await;
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(parsed["reply"].as_str().unwrap().contains("safe to ride"));
}

#[tokio::test]
async fn test_assistant_rejects_empty_message() {
    let response = send_json(
        app(),
        "POST",
        "/api/assistant",
        serde_json::json!({ "message": "   " }),
    )
    .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_assistant_quick_questions() {
    let response = get(app(), "/api/assistant/questions").await;
    assert_eq!(response.status(), 200);

    let body = body_string(response.into_body()).await;
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 5);
}

// ==================== SSE stream ====================

#[tokio::test]
async fn test_telemetry_stream_is_server_sent_events() {
    let response = get(app(), "/api/telemetry/stream").await;
    assert_eq!(response.status(), 200);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(
        content_type.starts_with("text/event-stream"),
        "Expected SSE content-type, got: {}",
        content_type
    );
}
