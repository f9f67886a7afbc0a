//! In-memory admin sessions and the cookie that carries them.

use anyhow::{Context, Result};
use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use std::{collections::HashSet, sync::Arc};
use tokio::sync::Mutex;

pub const SESSION_COOKIE_NAME: &str = "darkcode_admin_session";
pub const SESSION_COOKIE_PATH: &str = "/admin";
const SESSION_BYTES: usize = 32;

type SessionHash = [u8; 32];

/// Set of currently valid admin sessions.
///
/// Only SHA-256 hashes of the session IDs are kept. Nothing is persisted, so
/// a process restart invalidates every cookie. Sessions have no expiry; they
/// end on logout.
#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashSet<SessionHash>>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session and record it as valid before returning its ID.
    ///
    /// # Errors
    /// Returns an error if the OS random source fails.
    pub async fn mint(&self) -> Result<String> {
        let session_id = generate_session_id()?;
        self.sessions.lock().await.insert(hash_session_id(&session_id));
        Ok(session_id)
    }

    pub async fn is_valid(&self, session_id: &str) -> bool {
        self.sessions
            .lock()
            .await
            .contains(&hash_session_id(session_id))
    }

    /// Revoke a session. Returns whether it was valid; revoking twice is fine.
    pub async fn revoke(&self, session_id: &str) -> bool {
        self.sessions
            .lock()
            .await
            .remove(&hash_session_id(session_id))
    }

    /// Drop every session, as a process restart would.
    pub async fn clear(&self) {
        self.sessions.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

/// 32 random bytes, URL-safe base64 without padding.
fn generate_session_id() -> Result<String> {
    let mut bytes = [0u8; SESSION_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session id")?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

fn hash_session_id(session_id: &str) -> SessionHash {
    Sha256::digest(session_id.as_bytes()).into()
}

/// `Set-Cookie` value for a freshly minted session.
///
/// # Errors
/// Returns an error if the session ID is not a valid header value.
pub fn session_cookie(session_id: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE_NAME}={session_id}; HttpOnly; SameSite=Strict; Path={SESSION_COOKIE_PATH}"
    ))
}

/// `Set-Cookie` value that makes the browser drop the session cookie.
#[must_use]
pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static(
        "darkcode_admin_session=; HttpOnly; SameSite=Strict; Path=/admin; Max-Age=0",
    )
}

/// Read the admin session ID from the `Cookie` header. No other header is trusted.
///
/// When the cookie is repeated the last occurrence wins.
#[must_use]
pub fn extract_session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(key, _)| key.trim() == SESSION_COOKIE_NAME)
        .last()
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
