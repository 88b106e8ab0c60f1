//! HTTP wiring for the runnable service.

mod config;
mod handlers;

pub use config::{ManagementConfig, WatcherConfig};
pub use handlers::{warden_router, AppState};

use crate::core::WardenError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for WardenError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            WardenError::InvalidArgument(_) | WardenError::MalformedCursor(_) => {
                (StatusCode::BAD_REQUEST, "invalid_argument")
            }
            WardenError::WrongKind(_) => (StatusCode::BAD_REQUEST, "wrong_kind"),
            WardenError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            WardenError::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream_failure"),
            WardenError::SchemaParse(_) | WardenError::Serialization(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };
        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });
        (status, body).into_response()
    }
}
