use crate::{
    admin::{Access, AdminState},
    auth::session::clear_session_cookie,
};
use axum::{
    extract::Extension,
    http::{
        header::{LOCATION, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// `GET /admin/logout`: revoke the session if any, always redirect to login.
#[instrument(skip_all)]
pub async fn logout(headers: HeaderMap, state: Extension<Arc<AdminState>>) -> impl IntoResponse {
    if let Access::Authenticated { session_id } = state.access(&headers).await {
        state.sessions().revoke(&session_id).await;
        info!("Admin logged out");
    }

    (
        StatusCode::FOUND,
        [
            (LOCATION, HeaderValue::from_static("/admin")),
            (SET_COOKIE, clear_session_cookie()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use crate::admin::handlers::test_support::{app, body_string, get, get_with_session, pin_state};
    use axum::http::{
        header::{LOCATION, SET_COOKIE},
        StatusCode,
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn logout_revokes_session() -> anyhow::Result<()> {
        let state = pin_state();
        let session_id = state.sessions().mint().await?;

        let response = app(&state)
            .oneshot(get_with_session("/admin/logout", &session_id))
            .await?;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/admin")
        );
        assert!(response
            .headers()
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("Max-Age=0")));
        assert!(!state.sessions().is_valid(&session_id).await);

        let response = app(&state)
            .oneshot(get_with_session("/admin", &session_id))
            .await?;
        assert!(body_string(response).await?.contains("Admin Login"));
        Ok(())
    }

    #[tokio::test]
    async fn logout_is_idempotent() -> anyhow::Result<()> {
        let state = pin_state();
        let session_id = state.sessions().mint().await?;
        for _ in 0..2 {
            let response = app(&state)
                .oneshot(get_with_session("/admin/logout", &session_id))
                .await?;
            assert_eq!(response.status(), StatusCode::FOUND);
        }
        let response = app(&state).oneshot(get("/admin/logout")).await?;
        assert_eq!(response.status(), StatusCode::FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn logout_leaves_other_sessions() -> anyhow::Result<()> {
        let state = pin_state();
        let first = state.sessions().mint().await?;
        let second = state.sessions().mint().await?;
        app(&state)
            .oneshot(get_with_session("/admin/logout", &first))
            .await?;
        assert!(state.sessions().is_valid(&second).await);
        Ok(())
    }
}
