//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use impact_ledger::Receipt;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db;
use crate::db::EventRecord;
use crate::decode;
use crate::host::LedgerHost;

pub struct ApiState {
    pub host: LedgerHost,
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/invoke", post(invoke))
        .route("/events", get(get_all_events))
        .route("/projects/:id/events", get(get_project_events))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Request / response shapes
// ─────────────────────────────────────────────────────────

/// An invocation as it arrives on the wire: name, raw literal arguments and
/// the (already authenticated) sender.
#[derive(Debug, Deserialize)]
pub struct InvokeRequest {
    pub function: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub caller: Option<String>,
}

#[derive(Serialize)]
pub struct EventsResponse {
    pub project_id: u64,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct AllEventsResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn internal_error(e: impl ToString) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /invoke`
///
/// Decodes the raw arguments and runs the operation. A ledger-level failure
/// is still a `200` with `success: false`.
pub async fn invoke(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<InvokeRequest>,
) -> impl IntoResponse {
    let op = match decode::decode(&request.function, &request.args, request.caller.as_deref()) {
        Ok(op) => op,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(Receipt::failure(e.to_string()))).into_response()
        }
    };

    match state.host.invoke(op).await {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(e) => internal_error(e),
    }
}

/// `GET /projects/:id/events`
///
/// Returns the impact journal for one project.
pub async fn get_project_events(
    State(state): State<Arc<ApiState>>,
    Path(project_id): Path<u64>,
) -> impl IntoResponse {
    match db::get_events_for_project(state.host.pool(), project_id).await {
        Ok(events) => {
            let count = events.len();
            (
                StatusCode::OK,
                Json(EventsResponse {
                    project_id,
                    count,
                    events,
                }),
            )
                .into_response()
        }
        Err(e) => internal_error(e),
    }
}

/// `GET /events`
///
/// Returns the whole journal.
pub async fn get_all_events(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    match db::get_all_events(state.host.pool()).await {
        Ok(events) => {
            let count = events.len();
            (StatusCode::OK, Json(AllEventsResponse { count, events })).into_response()
        }
        Err(e) => internal_error(e),
    }
}
