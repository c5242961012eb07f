//! REST API and SSE routes

use crate::assistant;
use crate::state::AppState;
use crate::web_ui;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{delete, get, post},
    Json, Router,
};
use futures::stream::{Stream, StreamExt as FuturesStreamExt};
use omt_core::fault::{Fault, FaultKind, FaultRules};
use omt_core::model::FieldMask;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tower_http::cors::CorsLayer;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(web_ui::serve_ui))
        .route("/api/telemetry", get(telemetry_snapshot))
        .route("/api/telemetry/stream", get(telemetry_stream))
        .route("/api/faults", get(list_faults))
        .route("/api/faults/:id", delete(dismiss_fault))
        .route("/api/ride", get(ride_status))
        .route("/api/ride/toggle", post(toggle_ride))
        .route("/api/settings", get(get_settings).put(put_settings))
        .route("/api/assistant", post(ask_assistant))
        .route("/api/assistant/questions", get(quick_questions))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// === Telemetry Endpoints ===

#[derive(Deserialize)]
struct FieldsQuery {
    fields: Option<String>,
}

async fn telemetry_snapshot(
    State(state): State<AppState>,
    Query(query): Query<FieldsQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let frame = state.dashboard.read().await.frame();
    let mask = query.fields.map(|f| FieldMask::parse(&f));

    let json = frame.to_json_filtered(mask.as_ref()).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to serialize frame: {}", e),
        )
    })?;

    Ok(([(header::CONTENT_TYPE, "application/json")], json))
}

async fn telemetry_stream(
    State(state): State<AppState>,
    Query(query): Query<FieldsQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe();
    let field_mask = query.fields.map(|f| FieldMask::parse(&f));

    let stream = BroadcastStream::new(rx).filter_map(move |result| {
        let mask = field_mask.clone();
        async move {
            match result {
                Ok(frame) => {
                    // Serialize with field mask
                    match frame.to_json_filtered(mask.as_ref()) {
                        Ok(json) => Some(Ok(Event::default().data(json))),
                        Err(e) => {
                            tracing::error!("Failed to serialize frame: {}", e);
                            None
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Broadcast stream error: {}", e);
                    None
                }
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

// === Fault Endpoints ===

async fn list_faults(State(state): State<AppState>) -> Json<Vec<Fault>> {
    let dashboard = state.dashboard.read().await;
    Json(dashboard.frame().faults)
}

async fn dismiss_fault(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let kind: FaultKind = id
        .parse()
        .map_err(|e| (StatusCode::NOT_FOUND, format!("{}", e)))?;

    let mut dashboard = state.dashboard.write().await;
    if dashboard.dismiss(kind) {
        tracing::info!(fault = %kind, "fault dismissed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((
            StatusCode::NOT_FOUND,
            format!("fault {} is not active", kind),
        ))
    }
}

// === Ride Toggle Endpoints ===

#[derive(Serialize)]
struct RideStatus {
    riding: bool,
}

async fn ride_status(State(state): State<AppState>) -> Json<RideStatus> {
    let dashboard = state.dashboard.read().await;
    Json(RideStatus {
        riding: dashboard.riding(),
    })
}

async fn toggle_ride(State(state): State<AppState>) -> Json<RideStatus> {
    let mut dashboard = state.dashboard.write().await;
    let riding = dashboard.toggle_riding();
    tracing::info!(riding, "ride toggled");
    Json(RideStatus { riding })
}

// === Settings Endpoints ===

async fn get_settings(State(state): State<AppState>) -> Json<FaultRules> {
    let dashboard = state.dashboard.read().await;
    Json(dashboard.rules())
}

async fn put_settings(
    State(state): State<AppState>,
    Json(rules): Json<FaultRules>,
) -> Result<Json<FaultRules>, (StatusCode, String)> {
    let mut dashboard = state.dashboard.write().await;
    dashboard
        .set_rules(rules)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, format!("{}", e)))?;
    tracing::info!("fault thresholds updated");
    Ok(Json(rules))
}

// === Assistant Endpoints ===

#[derive(Deserialize)]
struct AssistantRequest {
    message: String,
}

#[derive(Serialize)]
struct AssistantReply {
    reply: String,
}

async fn ask_assistant(
    State(state): State<AppState>,
    Json(request): Json<AssistantRequest>,
) -> Result<Json<AssistantReply>, (StatusCode, String)> {
    if request.message.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Empty message".to_string()));
    }

    let data = state.dashboard.read().await.frame().data;
    Ok(Json(AssistantReply {
        reply: assistant::respond(&request.message, &data),
    }))
}

async fn quick_questions() -> Json<Vec<&'static str>> {
    Json(assistant::QUICK_QUESTIONS.to_vec())
}
