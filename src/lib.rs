// RikTech HTTP boundary.
//
// Thin axum layer over `riktech_core::Responder`: validate input, run the
// (synchronous, file-backed) engine on the blocking pool, map errors to
// status codes. No business logic lives here.
//
//   POST /api/message    {sessionId?, userId?, message}       → Reply
//   POST /api/feedback   {userMessage, assistantReply, ...}   → {ok: true}
//   GET  /api/train      ?limit=                              → {count, sample}
//   GET  /api/history    ?sessionId=                          → {sessionId, history}
//   GET  /api/sessions                                        → [SessionSummary]
//   GET  /health                                              → {status, version}

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, warn};
use riktech_core::{EngineError, EngineResult, FeedbackRequest, MessageRequest, Responder};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub struct AppState {
    pub responder: Arc<Responder>,
}

impl AppState {
    pub fn new(responder: Responder) -> Self {
        Self { responder: Arc::new(responder) }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/message", post(message_handler))
        .route("/api/feedback", post(feedback_handler))
        .route("/api/train", get(train_handler))
        .route("/api/history", get(history_handler))
        .route("/api/sessions", get(sessions_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Errors ─────────────────────────────────────────────────────────────────

pub struct ApiError(EngineError);

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        ApiError(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError(EngineError::validation(e.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            EngineError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            other => {
                error!("[server] Request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "server_error" })))
                    .into_response()
            }
        }
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Run engine work on the blocking pool; the stores do synchronous file I/O.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> EngineResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(ApiError),
        Err(e) => Err(ApiError(EngineError::Other(format!("worker task failed: {e}")))),
    }
}

// ── Handlers ───────────────────────────────────────────────────────────────

async fn message_handler(
    State(state): State<AppState>,
    body: Result<Json<MessageRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(req) = body?;
    if req.message.trim().is_empty() {
        return Err(EngineError::validation("message required").into());
    }
    let responder = state.responder.clone();
    let reply = blocking(move || Ok(responder.respond(&req))).await?;
    Ok(Json(serde_json::to_value(reply).map_err(EngineError::from)?))
}

async fn feedback_handler(
    State(state): State<AppState>,
    body: Result<Json<FeedbackRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(req) = body?;
    let responder = state.responder.clone();
    blocking(move || responder.record_feedback(req)).await?;
    Ok(Json(json!({ "ok": true })))
}

#[derive(Debug, Deserialize)]
struct TrainQuery {
    limit: Option<usize>,
}

async fn train_handler(
    State(state): State<AppState>,
    Query(q): Query<TrainQuery>,
) -> ApiResult<Value> {
    let responder = state.responder.clone();
    let snapshot = blocking(move || responder.train_sample(q.limit)).await?;
    Ok(Json(serde_json::to_value(snapshot).map_err(EngineError::from)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryQuery {
    session_id: Option<String>,
}

async fn history_handler(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> ApiResult<Value> {
    let Some(session_id) = q.session_id.filter(|s| !s.trim().is_empty()) else {
        warn!("[server] History requested without sessionId");
        return Err(EngineError::validation("sessionId required").into());
    };
    let responder = state.responder.clone();
    let id = session_id.clone();
    let history = blocking(move || responder.history(&id)).await?;
    Ok(Json(json!({ "sessionId": session_id, "history": history })))
}

async fn sessions_handler(State(state): State<AppState>) -> ApiResult<Value> {
    let responder = state.responder.clone();
    let sessions = blocking(move || responder.sessions()).await?;
    Ok(Json(serde_json::to_value(sessions).map_err(EngineError::from)?))
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}
