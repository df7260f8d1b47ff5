//! Error types for the HTTP layer.
//!
//! [`ApiError`] folds core failures and transport failures into one enum whose
//! [`IntoResponse`] implementation decides the status code.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lotka_core::error::{DivergenceCause, ParameterViolation};
use lotka_core::SimulationError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A request field violated its constraint.
    #[error(transparent)]
    InvalidParameter(#[from] ParameterViolation),

    /// Integration produced non-finite values.
    #[error("computation failed at t = {time}: {cause}")]
    ComputationFailed { time: f64, cause: DivergenceCause },

    /// The body could not be decoded into the expected shape.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// Parameters rejected by the equilibrium analysis.
    #[error("{0}")]
    Analysis(String),

    /// The simulation did not finish within the wall-clock budget.
    #[error("simulation exceeded the {}ms time budget", .0.as_millis())]
    Timeout(Duration),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<SimulationError> for ApiError {
    fn from(err: SimulationError) -> Self {
        match err {
            SimulationError::InvalidParameter(violation) => Self::InvalidParameter(violation),
            SimulationError::NumericalDivergence { time, cause } => {
                Self::ComputationFailed { time, cause }
            }
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidParameter(_) | Self::MalformedRequest(_) | Self::Analysis(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::ComputationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::InvalidParameter(_) | Self::Analysis(_) => "invalid_parameter",
            Self::ComputationFailed { .. } => "computation_failed",
            Self::MalformedRequest(_) => "malformed_request",
            Self::Timeout(_) => "timeout",
            Self::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
            "status": status.as_u16(),
        });
        match &self {
            Self::InvalidParameter(violation) => {
                body["field"] = serde_json::json!(violation.field);
            }
            Self::ComputationFailed { time, .. } => {
                body["time"] = serde_json::json!(time);
            }
            _ => {}
        }

        (status, axum::Json(body)).into_response()
    }
}
