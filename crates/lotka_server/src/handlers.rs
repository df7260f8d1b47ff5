//! Request handlers. Each one decodes, calls the core, and encodes.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::Uri;
use axum::Json;
use lotka_core::analysis::{analyze_fixed_points, summarize, FixedPoints, TrajectorySummary};
use lotka_core::info::{model_info, ModelInfo};
use lotka_core::{ModelParameters, SimulationOutput, SimulationRequest};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for `POST /simulate`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SimulateQuery {
    /// Attach extrema and peak statistics to the response.
    pub summary: bool,
}

#[derive(Debug, Serialize)]
pub struct SimulateResponse {
    #[serde(flatten)]
    pub output: SimulationOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<TrajectorySummary>,
}

fn decode<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::MalformedRequest(rejection.body_text()))
}

/// A JSON body or, when no JSON body was sent, the same fields as query
/// parameters (`?x0=10&y0=5&...&T=50`).
fn decode_request(
    uri: &Uri,
    payload: Result<Json<SimulationRequest>, JsonRejection>,
) -> Result<SimulationRequest, ApiError> {
    match payload {
        Err(JsonRejection::MissingJsonContentType(_)) if uri.query().is_some() => {
            Query::<SimulationRequest>::try_from_uri(uri)
                .map(|Query(request)| request)
                .map_err(|rejection| ApiError::MalformedRequest(rejection.body_text()))
        }
        other => decode(other),
    }
}

/// `GET /`
pub async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Welcome to the Lotka-Volterra Simulator!",
    }))
}

/// `GET /health`
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `GET /info`
pub async fn get_info() -> Json<ModelInfo> {
    Json(model_info())
}

/// `POST /simulate`
///
/// The request comes from the JSON body or, without one, from the query string.
/// The integration runs on the blocking pool and is abandoned (from the
/// client's point of view) once the configured budget elapses.
pub async fn simulate(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    query: Result<Query<SimulateQuery>, QueryRejection>,
    payload: Result<Json<SimulationRequest>, JsonRejection>,
) -> Result<Json<SimulateResponse>, ApiError> {
    let Query(query) =
        query.map_err(|rejection| ApiError::MalformedRequest(rejection.body_text()))?;
    let request = decode_request(&uri, payload)?;
    let limits = state.limits;
    let settings = state.settings;

    let task =
        tokio::task::spawn_blocking(move || lotka_core::simulate(&request, &limits, &settings));
    let joined = tokio::time::timeout(state.timeout, task).await.map_err(|_| {
        warn!(timeout_ms = state.timeout.as_millis() as u64, "Simulation timed out");
        ApiError::Timeout(state.timeout)
    })?;
    let result = joined.map_err(|e| ApiError::Internal(format!("simulation task failed: {e}")))?;
    let output = result.map_err(|err| {
        warn!(error = %err, "Simulation rejected");
        ApiError::from(err)
    })?;

    info!(
        duration = request.duration,
        samples = output.time.len(),
        warnings = output.warnings.len(),
        "Simulation served"
    );

    let summary = query.summary.then(|| summarize(&output));
    Ok(Json(SimulateResponse { output, summary }))
}

/// `POST /equilibrium`
pub async fn equilibrium(
    payload: Result<Json<ModelParameters>, JsonRejection>,
) -> Result<Json<FixedPoints>, ApiError> {
    let params = decode(payload)?;
    analyze_fixed_points(&params)
        .map(Json)
        .map_err(|e| ApiError::Analysis(e.to_string()))
}
