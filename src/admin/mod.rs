//! HTTP surface of the admin gate.
//!
//! Every `/admin` route passes through [`AdminState::access`] first. A request
//! either carries a cookie naming a live session or it is treated as a
//! visitor who still has to present the credential.

use crate::{
    auth::{
        session::extract_session_id, CredentialStore, NoopRateLimiter, RateLimiter, SessionStore,
    },
    config::ServerConfig,
};
use anyhow::Result;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderMap, HeaderName, HeaderValue, Request},
    routing::get,
    Extension, Router,
};
use std::{
    future::Future,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

pub mod error;
pub(crate) mod handlers;
pub mod monitor;
mod openapi;
pub mod pages;

pub use error::AdminError;
pub use monitor::{ClientSession, ServerMonitor, ServerSnapshot, ServerState, StandaloneMonitor};
pub use openapi::openapi;

/// Outcome of inspecting an incoming admin request.
#[derive(Debug, PartialEq, Eq)]
pub enum Access {
    AwaitingCredential,
    Authenticated { session_id: String },
}

/// Shared state behind every admin route.
pub struct AdminState {
    config: ServerConfig,
    credentials: CredentialStore,
    sessions: SessionStore,
    rate_limiter: Arc<dyn RateLimiter>,
    monitor: Arc<dyn ServerMonitor>,
    started_at: Instant,
}

impl AdminState {
    #[must_use]
    pub fn new(config: ServerConfig, credentials: CredentialStore) -> Self {
        Self {
            config,
            credentials,
            sessions: SessionStore::new(),
            rate_limiter: Arc::new(NoopRateLimiter),
            monitor: Arc::new(StandaloneMonitor),
            started_at: Instant::now(),
        }
    }

    #[must_use]
    pub fn with_rate_limiter(mut self, rate_limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    #[must_use]
    pub fn with_monitor(mut self, monitor: Arc<dyn ServerMonitor>) -> Self {
        self.monitor = monitor;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    #[must_use]
    pub const fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    #[must_use]
    pub const fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    #[must_use]
    pub fn rate_limiter(&self) -> &dyn RateLimiter {
        self.rate_limiter.as_ref()
    }

    #[must_use]
    pub fn monitor(&self) -> &dyn ServerMonitor {
        self.monitor.as_ref()
    }

    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Decide whether the request already holds a valid admin session.
    pub async fn access(&self, headers: &HeaderMap) -> Access {
        match extract_session_id(headers) {
            Some(session_id) if self.sessions.is_valid(&session_id).await => {
                Access::Authenticated { session_id }
            }
            _ => Access::AwaitingCredential,
        }
    }
}

/// Build the admin router.
///
/// A known path hit with an unsupported method gets the same 404 as an
/// unknown path, never a 405 with an `Allow` header.
#[must_use]
pub fn router(state: Arc<AdminState>) -> Router {
    Router::new()
        .route("/admin", get(handlers::dashboard::dashboard).fallback(handlers::not_found))
        .route("/admin/", get(handlers::dashboard::dashboard).fallback(handlers::not_found))
        .route(
            "/admin/login",
            get(handlers::login::login)
                .post(handlers::login::login)
                .fallback(handlers::not_found),
        )
        .route(
            "/admin/logout",
            get(handlers::logout::logout)
                .post(handlers::logout::logout)
                .fallback(handlers::not_found),
        )
        .route(
            "/admin/api/status",
            get(handlers::status::status).fallback(handlers::not_found),
        )
        .route(
            "/admin/logo",
            get(handlers::assets::logo).fallback(handlers::not_found),
        )
        .route(
            "/favicon.ico",
            get(handlers::assets::favicon).fallback(handlers::not_found),
        )
        .route(
            "/health",
            get(handlers::health::health)
                .options(handlers::health::health)
                .fallback(handlers::not_found),
        )
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(state)),
        )
}

/// Serve the admin router until `shutdown` resolves.
///
/// # Errors
/// Returns an error if the listener fails.
pub async fn serve<F>(listener: TcpListener, state: Arc<AdminState>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(state);

    if let Ok(addr) = listener.local_addr() {
        info!("Admin listening on http://{addr}/admin");
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown.await;
        info!("Gracefully shutdown");
    })
    .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::{session::session_cookie, Credential};
    use axum::http::header::COOKIE;

    fn state() -> AdminState {
        AdminState::new(
            ServerConfig::default(),
            CredentialStore::new(Credential::pin("482913").unwrap()),
        )
    }

    fn cookie_headers(session_id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let set_cookie = session_cookie(session_id).unwrap();
        let pair = set_cookie.to_str().unwrap().split(';').next().unwrap().to_string();
        headers.insert(COOKIE, HeaderValue::from_str(&pair).unwrap());
        headers
    }

    #[tokio::test]
    async fn access_without_cookie_awaits_credential() {
        assert_eq!(
            state().access(&HeaderMap::new()).await,
            Access::AwaitingCredential
        );
    }

    #[tokio::test]
    async fn access_with_minted_session_is_authenticated() {
        let state = state();
        let session_id = state.sessions().mint().await.unwrap();
        assert_eq!(
            state.access(&cookie_headers(&session_id)).await,
            Access::Authenticated { session_id }
        );
    }

    #[tokio::test]
    async fn access_uses_last_duplicate_cookie() {
        let state = state();
        let session_id = state.sessions().mint().await.unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!(
                "darkcode_admin_session=stale; darkcode_admin_session={session_id}"
            ))
            .unwrap(),
        );
        assert_eq!(
            state.access(&headers).await,
            Access::Authenticated { session_id }
        );
    }

    #[tokio::test]
    async fn access_with_unknown_or_revoked_session_awaits_credential() {
        let state = state();
        assert_eq!(
            state.access(&cookie_headers("forged")).await,
            Access::AwaitingCredential
        );

        let session_id = state.sessions().mint().await.unwrap();
        state.sessions().revoke(&session_id).await;
        assert_eq!(
            state.access(&cookie_headers(&session_id)).await,
            Access::AwaitingCredential
        );
    }

    #[tokio::test]
    async fn sessions_do_not_survive_a_new_state() {
        let first = state();
        let session_id = first.sessions().mint().await.unwrap();
        let restarted = state();
        assert_eq!(
            restarted.access(&cookie_headers(&session_id)).await,
            Access::AwaitingCredential
        );
    }
}
