use super::HTML;
use crate::{
    admin::{pages::login_page, AdminError, AdminState},
    auth::{session::session_cookie, RateLimitDecision},
};
use axum::{
    body::Bytes,
    extract::{ConnectInfo, Extension, RawQuery},
    http::{
        header::{CONTENT_TYPE, LOCATION, SET_COOKIE},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, instrument, warn};
use url::form_urlencoded;

const DASHBOARD_PATH: &str = "/admin";

/// `GET|POST /admin/login`.
///
/// The credential is read from the query string first, then from an
/// `application/x-www-form-urlencoded` body. Blank values are skipped, so an
/// empty `?pin=` does not hide the form field. Without one the bare login page
/// is returned. A wrong, malformed or throttled attempt gets the same generic
/// message.
#[instrument(skip_all)]
pub async fn login(
    connect_info: Option<ConnectInfo<SocketAddr>>,
    state: Extension<Arc<AdminState>>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Response, AdminError> {
    let scheme = state.credentials().scheme();
    let candidate = query
        .as_deref()
        .and_then(|query| find_param(query.as_bytes(), scheme.param()))
        .or_else(|| find_param(&body, scheme.param()));

    let Some(candidate) = candidate.filter(|value| !value.trim().is_empty()) else {
        return Ok(html(login_page(scheme, None)));
    };

    let client = connect_info.map_or_else(
        || "unknown".to_string(),
        |ConnectInfo(addr)| addr.ip().to_string(),
    );

    if state.rate_limiter().check(&client) == RateLimitDecision::Limited {
        warn!("Admin login throttled for {client}");
        return Ok(html(login_page(scheme, Some(scheme.invalid_message()))));
    }

    if !state.credentials().verify(&candidate).await {
        state.rate_limiter().record_failure(&client);
        warn!("Failed admin login from {client}");
        return Ok(html(login_page(scheme, Some(scheme.invalid_message()))));
    }

    state.rate_limiter().record_success(&client);
    let session_id = state.sessions().mint().await?;
    let cookie = session_cookie(&session_id)?;

    info!("Admin login from {client}");

    Ok((
        StatusCode::FOUND,
        [
            (LOCATION, HeaderValue::from_static(DASHBOARD_PATH)),
            (SET_COOKIE, cookie),
        ],
    )
        .into_response())
}

fn html(page: String) -> Response {
    ([(CONTENT_TYPE, HTML)], page).into_response()
}

fn find_param(input: &[u8], name: &str) -> Option<String> {
    form_urlencoded::parse(input)
        .find(|(key, value)| key == name && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        admin::handlers::test_support::{app, body_string, get, pin_state, PIN},
        auth::{Credential, CredentialStore, MemoryRateLimiter},
        config::ServerConfig,
    };
    use axum::{body::Body, http::Request};
    use secrecy::SecretString;
    use std::time::Duration;
    use tower::ServiceExt;

    fn post_form(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/admin/login")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap_or_default()
    }

    #[test]
    fn find_param_decodes_values() {
        assert_eq!(
            find_param(b"a=1&pin=48%2029+13", "pin"),
            Some("48 29 13".to_string())
        );
        assert_eq!(find_param(b"a=1", "pin"), None);
        assert_eq!(find_param(b"pin=&pin=123456", "pin"), Some("123456".to_string()));
        assert_eq!(find_param(b"pin=", "pin"), None);
    }

    #[tokio::test]
    async fn login_with_correct_pin_redirects_with_cookie() -> anyhow::Result<()> {
        let state = pin_state();
        let response = app(&state)
            .oneshot(get(&format!("/admin/login?pin={PIN}")))
            .await?;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/admin")
        );
        let cookie = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(cookie.starts_with("darkcode_admin_session="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Path=/admin"));
        assert_eq!(state.sessions().len().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn login_with_form_body() -> anyhow::Result<()> {
        let state = pin_state();
        let response = app(&state).oneshot(post_form(&format!("pin={PIN}"))).await?;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert!(response.headers().contains_key(SET_COOKIE));
        Ok(())
    }

    #[tokio::test]
    async fn query_takes_precedence_over_body() -> anyhow::Result<()> {
        let state = pin_state();
        let request = Request::builder()
            .method("POST")
            .uri("/admin/login?pin=000000")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("pin={PIN}")))?;
        let response = app(&state).oneshot(request).await?;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await?.contains("Invalid PIN"));
        Ok(())
    }

    #[tokio::test]
    async fn blank_query_param_falls_through_to_body() -> anyhow::Result<()> {
        let state = pin_state();
        let request = Request::builder()
            .method("POST")
            .uri("/admin/login?pin=")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("pin={PIN}")))?;
        let response = app(&state).oneshot(request).await?;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert!(response.headers().contains_key(SET_COOKIE));
        Ok(())
    }

    #[tokio::test]
    async fn login_with_wrong_or_malformed_pin_is_generic() -> anyhow::Result<()> {
        let state = pin_state();
        for pin in ["000000", "48291", "abcdef", "4829130"] {
            let response = app(&state)
                .oneshot(get(&format!("/admin/login?pin={pin}")))
                .await?;
            assert_eq!(response.status(), StatusCode::OK, "{pin}");
            assert!(!response.headers().contains_key(SET_COOKIE));
            let body = body_string(response).await?;
            assert!(body.contains("Invalid PIN"), "{pin}");
        }
        assert!(state.sessions().is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn login_without_credential_shows_page() -> anyhow::Result<()> {
        let state = pin_state();
        for request in [get("/admin/login"), get("/admin/login?pin="), post_form("")] {
            let response = app(&state).oneshot(request).await?;
            assert_eq!(response.status(), StatusCode::OK);
            let body = body_string(response).await?;
            assert!(body.contains("Admin Login"));
            assert!(!body.contains("Invalid PIN"));
        }
        Ok(())
    }

    #[tokio::test]
    async fn token_scheme_reads_token_param() -> anyhow::Result<()> {
        let credential = Credential::token(SecretString::from("s3cr3t-token".to_string()))?;
        let state = Arc::new(AdminState::new(
            ServerConfig::default(),
            CredentialStore::new(credential),
        ));

        let response = app(&state).oneshot(get("/admin/login?pin=482913")).await?;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!body_string(response).await?.contains("Invalid"));

        let response = app(&state).oneshot(get("/admin/login?token=wrong")).await?;
        assert!(body_string(response).await?.contains("Invalid token"));

        let response = app(&state).oneshot(post_form("token=s3cr3t-token")).await?;
        assert_eq!(response.status(), StatusCode::FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn throttled_login_is_refused_even_with_correct_pin() -> anyhow::Result<()> {
        let credential = Credential::pin(PIN)?;
        let state = Arc::new(
            AdminState::new(ServerConfig::default(), CredentialStore::new(credential))
                .with_rate_limiter(Arc::new(MemoryRateLimiter::new(2, Duration::from_secs(60)))),
        );

        for _ in 0..2 {
            let response = app(&state).oneshot(get("/admin/login?pin=000000")).await?;
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app(&state)
            .oneshot(get(&format!("/admin/login?pin={PIN}")))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await?.contains("Invalid PIN"));
        assert!(state.sessions().is_empty().await);
        Ok(())
    }
}
