use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use crate::api::RouteError;
use crate::domain::CoordinateError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("ORS_API_KEY not configured")]
    MissingApiKey,

    #[error("invalid {field}: {source}")]
    InvalidCoordinate {
        field: &'static str,
        source: CoordinateError,
    },

    #[error(transparent)]
    Route(#[from] RouteError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidCoordinate { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Route(e) => match e {
                RouteError::Upstream { .. } | RouteError::Transport(_) => StatusCode::BAD_GATEWAY,
                RouteError::NoRoute(_) => StatusCode::NOT_FOUND,
                RouteError::EmptyGeometry => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(%status, error = %self, "Request failed");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
