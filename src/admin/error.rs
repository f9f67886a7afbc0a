use axum::{
    http::{header::InvalidHeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::error;

/// Failures behind an admin request. Details are logged, never returned.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("invalid response header: {0}")]
    Header(#[from] InvalidHeaderValue),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        error!("Admin request failed: {self:#}");

        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}
