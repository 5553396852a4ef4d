use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use service::errors::CatalogueError;

/// Error response in the `{"error": ...}` shape the frontend expects.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Generic 500; internals go to the log, never into the body.
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

impl From<CatalogueError> for ApiError {
    fn from(err: CatalogueError) -> Self {
        match err {
            CatalogueError::ImageNotFound(_) => Self::new(StatusCode::NOT_FOUND, "Image not found"),
            CatalogueError::MissingParameter(name) => {
                Self::bad_request(format!("missing parameter: {name}"))
            }
            other => {
                error!(error = %other, "catalogue operation failed");
                Self::internal()
            }
        }
    }
}
