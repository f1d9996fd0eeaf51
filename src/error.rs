use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDateTime;
use serde_json::json;
use thiserror::Error;

use crate::geo::ProviderError;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("route infeasible: {0}")]
    InfeasibleRoute(#[from] ProviderError),

    #[error("invalid stop order: {0}")]
    InvalidStopOrder(String),

    #[error("invalid hours-of-service rules: {0}")]
    InvalidRules(String),

    #[error("start time {0} is outside the supported range")]
    StartOutOfRange(NaiveDateTime),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Plan(PlanError::StartOutOfRange(_)) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Plan(PlanError::InfeasibleRoute(ProviderError::UnknownLocation(_))) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Plan(PlanError::InfeasibleRoute(ProviderError::Unavailable(_))) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Plan(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
