//! API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<ApiState>`.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::warn;

use crate::analysis::progression::ProgressionEntry;
use crate::analysis::report::AnalysisResult;
use crate::session::{HistorySnapshot, Session};
use crate::types::WheelError;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
///
/// `latest` is only written while `session` is locked, so readers never
/// see an analysis that belongs to another history.
pub struct ApiState {
    pub session: Mutex<Session>,
    pub latest: RwLock<Option<AnalysisResult>>,
}

impl ApiState {
    pub fn new(session: Session) -> Self {
        Self {
            session: Mutex::new(session),
            latest: RwLock::new(None),
        }
    }
}

pub type AppState = Arc<ApiState>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct HistoryRequest {
    pub draws: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DrawRequest {
    pub number: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct RandomRequest {
    pub count: Option<usize>,
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxStakeRequest {
    pub max_stake: u32,
}

/// History plus the analysis it produced.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub history: HistorySnapshot,
    pub analysis: AnalysisResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Handler error; every engine rejection is a 422.
#[derive(Debug)]
pub struct ApiError(WheelError);

impl From<WheelError> for ApiError {
    fn from(err: WheelError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(error = %self.0, "Request rejected");
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /api/history
pub async fn get_history(State(state): State<AppState>) -> Json<HistorySnapshot> {
    let session = state.session.lock().await;
    Json(session.snapshot())
}

/// PUT /api/history
///
/// Replacing the history is one analysis step, like a new spin. Sending
/// the same body twice therefore steps a pursued target twice (a second
/// loss on the series). Use `GET /api/analysis` to re-read the result.
pub async fn put_history(
    State(state): State<AppState>,
    Json(req): Json<HistoryRequest>,
) -> ApiResult<SessionResponse> {
    let mut session = state.session.lock().await;
    let analysis = session.replace_history(&req.draws)?;
    Ok(Json(publish(&state, &session, analysis).await))
}

/// DELETE /api/history
pub async fn delete_history(State(state): State<AppState>) -> ApiResult<SessionResponse> {
    let mut session = state.session.lock().await;
    session.clear();
    let analysis = session.analyze()?;
    Ok(Json(publish(&state, &session, analysis).await))
}

/// POST /api/draws
pub async fn post_draw(
    State(state): State<AppState>,
    Json(req): Json<DrawRequest>,
) -> ApiResult<SessionResponse> {
    let mut session = state.session.lock().await;
    let analysis = session.add_draw(req.number)?;
    Ok(Json(publish(&state, &session, analysis).await))
}

/// POST /api/random
///
/// The body is optional; when present it must be a valid `RandomRequest`.
pub async fn post_random(State(state): State<AppState>, body: Bytes) -> ApiResult<SessionResponse> {
    let req = parse_optional_body::<RandomRequest>(&body)?;
    let mut rng = match req.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut session = state.session.lock().await;
    let analysis = session.randomize(&mut rng, req.count)?;
    Ok(Json(publish(&state, &session, analysis).await))
}

/// GET /api/analysis
///
/// Returns the analysis of the last history change. After a max-stake
/// change or a progression reset it is recomputed as a preview. Reading it
/// never advances the progression.
pub async fn get_analysis(State(state): State<AppState>) -> ApiResult<AnalysisResult> {
    let session = state.session.lock().await;
    if let Some(latest) = state.latest.read().await.clone() {
        return Ok(Json(latest));
    }
    Ok(Json(session.preview()?))
}

/// GET /api/progression
pub async fn get_progression(State(state): State<AppState>) -> Json<Vec<ProgressionEntry>> {
    let session = state.session.lock().await;
    Json(session.progression())
}

/// PUT /api/max-stake
pub async fn put_max_stake(
    State(state): State<AppState>,
    Json(req): Json<MaxStakeRequest>,
) -> ApiResult<HistorySnapshot> {
    let mut session = state.session.lock().await;
    session.set_max_stake(req.max_stake)?;
    invalidate(&state).await;
    Ok(Json(session.snapshot()))
}

/// POST /api/reset
pub async fn post_reset(State(state): State<AppState>) -> Json<HistorySnapshot> {
    let mut session = state.session.lock().await;
    session.reset_progression();
    invalidate(&state).await;
    Json(session.snapshot())
}

/// Empty body means defaults; anything else must deserialize.
fn parse_optional_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| WheelError::InvalidRequest(e.to_string()).into())
}

/// Drop the cached analysis; the next read recomputes it.
async fn invalidate(state: &ApiState) {
    *state.latest.write().await = None;
}

async fn publish(state: &ApiState, session: &Session, analysis: AnalysisResult) -> SessionResponse {
    *state.latest.write().await = Some(analysis.clone());
    SessionResponse {
        history: session.snapshot(),
        analysis,
    }
}
