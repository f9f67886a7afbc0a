use super::HTML;
use crate::admin::{
    pages::{dashboard_page, login_page, DashboardView},
    Access, AdminError, AdminState,
};
use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, HeaderMap},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// `GET /admin`: dashboard with a valid session, login page otherwise.
#[instrument(skip_all)]
pub async fn dashboard(
    headers: HeaderMap,
    state: Extension<Arc<AdminState>>,
) -> Result<Response, AdminError> {
    let page = match state.access(&headers).await {
        Access::Authenticated { .. } => {
            let snapshot = state.monitor().snapshot()?;
            dashboard_page(&DashboardView {
                config: state.config(),
                snapshot: &snapshot,
                uptime: state.uptime(),
            })
        }
        Access::AwaitingCredential => {
            debug!("No admin session, showing login");
            login_page(state.credentials().scheme(), None)
        }
    };

    Ok(([(CONTENT_TYPE, HTML)], page).into_response())
}
