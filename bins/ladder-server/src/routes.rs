//! Axum router and HTTP handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use ladder_core::error::{LadderError, ScoreError};
use ladder_core::validation::{parse_customer_id, parse_delta};
use ladder_core::RankedScore;

use crate::AppState;

// ── Error helper ─────────────────────────────────────────────────────────────

/// Validation failures become 400; anything else 500.
struct ApiError(LadderError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            LadderError::Score(e) => {
                debug!(input = e.input(), "rejected request: {e}");
                StatusCode::BAD_REQUEST
            }
            LadderError::Task(e) => {
                error!("request failed: {e}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

impl From<LadderError> for ApiError {
    fn from(e: LadderError) -> Self {
        ApiError(e)
    }
}

impl From<ScoreError> for ApiError {
    fn from(e: ScoreError) -> Self {
        ApiError(LadderError::Score(e))
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ── Router ───────────────────────────────────────────────────────────────────

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/customer/:customer_id/score/:score", post(submit_score))
        .route("/leaderboard", get(leaderboard_by_rank))
        .route("/leaderboard/:customer_id", get(leaderboard_by_customer))
        .route("/status", get(status))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Optional integer query bounds, kept as text so malformed values get the
/// same 400 body as every other validation failure.
#[derive(Deserialize, Default)]
struct WindowQuery {
    start: Option<String>,
    end: Option<String>,
}

impl WindowQuery {
    fn bounds(&self) -> Result<(Option<i64>, Option<i64>), ScoreError> {
        Ok((parse_bound(self.start.as_deref())?, parse_bound(self.end.as_deref())?))
    }
}

fn parse_bound(raw: Option<&str>) -> Result<Option<i64>, ScoreError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| ScoreError::Invalid(s.to_string())),
    }
}

// ── POST /customer/:customer_id/score/:score ────────────────────────────────

async fn submit_score(
    State(state): State<AppState>,
    Path((customer_id, score)): Path<(String, String)>,
) -> ApiResult<bool> {
    let customer_id = parse_customer_id(&customer_id)?;
    let delta = parse_delta(&score)?;
    let accepted = state.service.submit(customer_id, delta)?;
    debug!(%customer_id, %delta, "score delta accepted");
    Ok(Json(accepted))
}

// ── GET /leaderboard?start=&end= ─────────────────────────────────────────────

async fn leaderboard_by_rank(
    State(state): State<AppState>,
    Query(q): Query<WindowQuery>,
) -> ApiResult<Vec<RankedScore>> {
    let (start, end) = q.bounds()?;
    Ok(Json(
        state
            .service
            .query_by_rank(start.unwrap_or(0), end.unwrap_or(0)),
    ))
}

// ── GET /leaderboard/:customer_id?start=&end= ────────────────────────────────

/// `start` is the number of ranks above the customer, `end` the number below.
async fn leaderboard_by_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
    Query(q): Query<WindowQuery>,
) -> ApiResult<Vec<RankedScore>> {
    let customer_id = parse_customer_id(&customer_id)?;
    let (before, after) = q.bounds()?;
    Ok(Json(state.service.query_by_customer(customer_id, before, after)))
}

// ── GET /status ──────────────────────────────────────────────────────────────

async fn status(State(state): State<AppState>) -> Json<Value> {
    let service = &state.service;
    Json(json!({
        "ranked":          service.len(),
        "pending":         service.pending(),
        "batchIntervalMs": service.config().batch_interval.as_millis() as u64,
    }))
}
