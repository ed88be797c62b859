use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// ApiError
///
/// The request-level error taxonomy. Every handler returns `Result<_, ApiError>`
/// and the conversion to an HTTP response happens in one place.
///
/// Note on `NotAllowed`: ownership mismatches and category-link conflicts are
/// reported as 405, reproducing the upstream API's status-code contract. Clients
/// depend on the literal code, so it is kept rather than corrected to 403/409.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The referenced resource does not exist (404).
    #[error("{0}")]
    NotFound(&'static str),
    /// The resolved identity is not the owner/author, or a category link is in
    /// a conflicting state (405).
    #[error("{0}")]
    NotAllowed(&'static str),
    /// Payload-level uniqueness violation, e.g. a taken username (400).
    #[error("{0}")]
    Conflict(&'static str),
    /// Missing, malformed, or expired bearer token, or bad login credentials (401).
    #[error("Could not validate credentials")]
    Unauthenticated,
    /// Storage-layer failure (500). The underlying error is logged, never exposed.
    #[error("database error")]
    Database(#[from] sqlx::Error),
    /// Password hashing or token encoding failure (500).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::NotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal details go to the log, not to the client.
        let detail = match &self {
            ApiError::Database(e) => {
                tracing::error!("database error: {e:?}");
                "Internal server error".to_string()
            }
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
