//! Admin credential verification, session lifecycle, and login throttling.
//!
//! Flow Overview:
//! 1) The operator reads the active credential (PIN or token) from the terminal.
//! 2) `CredentialStore::verify` compares the submitted value in constant time.
//! 3) On success `SessionStore::mint` records a new random session ID and the
//!    gate hands it out as a cookie scoped to `/admin`.
//! 4) Every later request is authorized iff its cookie is in the session set.

pub mod credential;
pub mod rate_limit;
pub mod session;

pub use credential::{Credential, CredentialError, CredentialScheme, CredentialStore};
pub use rate_limit::{MemoryRateLimiter, NoopRateLimiter, RateLimitDecision, RateLimiter};
pub use session::{SessionStore, SESSION_COOKIE_NAME};
