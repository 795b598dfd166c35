//! API error type and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use wxgate_weather::UpstreamError;

use crate::validation::FieldErrors;

pub const RATE_LIMITED_MESSAGE: &str = "Too many requests, please try again later.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request parameters")]
    Validation(FieldErrors),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("{}", RATE_LIMITED_MESSAGE)]
    RateLimited,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            Self::Validation(errors) => {
                tracing::debug!(?errors, "rejected request parameters");
                serde_json::json!({ "error": errors })
            }
            Self::Upstream(e) => {
                tracing::error!(error = %e, status = ?e.status(), "upstream request failed");
                serde_json::json!({ "error": e.public_message() })
            }
            Self::RateLimited => serde_json::json!({ "error": RATE_LIMITED_MESSAGE }),
        };
        (status, Json(body)).into_response()
    }
}
