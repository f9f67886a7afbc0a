use crate::admin::{monitor::ServerState, Access, AdminError, AdminState};
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct StatusResponse {
    /// Whole seconds since the admin gate started.
    pub uptime_seconds: u64,
    pub port: u16,
    /// Connected WebSocket clients, not admin sessions.
    pub session_count: usize,
    pub state: ServerState,
    pub device_lock: bool,
    pub tls_enabled: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

#[utoipa::path(
    get,
    path= "/admin/api/status",
    responses (
        (status = 200, description = "Server status", body = StatusResponse),
        (status = 401, description = "Missing or invalid admin session", body = ErrorResponse)
    ),
    tag= "admin"
)]
// axum handler for the dashboard status poll
pub async fn status(
    headers: HeaderMap,
    state: Extension<Arc<AdminState>>,
) -> Result<Response, AdminError> {
    if state.access(&headers).await == Access::AwaitingCredential {
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Unauthorized".to_string(),
            }),
        )
            .into_response());
    }

    let snapshot = state.monitor().snapshot()?;
    let config = state.config();

    Ok(Json(StatusResponse {
        uptime_seconds: state.uptime().as_secs(),
        port: config.port,
        session_count: snapshot.sessions.len(),
        state: snapshot.state,
        device_lock: config.device_lock,
        tls_enabled: config.tls_enabled,
    })
    .into_response())
}
