//! # DarkCode (remote control server admin gate)
//!
//! `darkcode` drives a coding-assistant CLI from a mobile device over a
//! WebSocket. This crate holds the administration side of the server: the
//! on-disk configuration, the CLI, and the web admin gate served under
//! `/admin`.
//!
//! ## Admin Session Gate
//!
//! The admin pages are protected by a single credential. Exactly one scheme is
//! active per deployment:
//!
//! - **PIN:** six decimal digits generated from the OS CSPRNG when the server
//!   starts and shown in the terminal. `SIGHUP` rotates it.
//! - **Token:** the long-lived auth token stored in the config file.
//!
//! Credentials are compared in constant time. A successful login mints an
//! opaque 256-bit session ID handed out as an `HttpOnly`, `SameSite=Strict`
//! cookie scoped to `/admin`. Sessions live in memory only; restarting the
//! process invalidates every cookie.
//!
//! Unauthenticated requests to HTML pages render the login form with `200`
//! rather than redirecting, and the JSON status endpoint answers `401`.

pub mod admin;
pub mod auth;
pub mod cli;
pub mod config;
pub mod netif;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
