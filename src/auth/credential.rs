//! Admin credential (PIN or shared token) and its constant-time verification.

use rand::{rngs::OsRng, Rng};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use std::{
    fmt,
    str::FromStr,
    sync::{Arc, OnceLock},
};
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;
use tracing::info;

pub const PIN_LENGTH: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("PIN must be exactly 6 decimal digits")]
    InvalidPin,
    #[error("token must not be empty")]
    EmptyToken,
    #[error("the active credential is a token; PIN rotation is not available")]
    NotPinScheme,
    #[error("unknown credential scheme: {0}")]
    UnknownScheme(String),
}

/// Which credential guards the admin pages. Exactly one is active per deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialScheme {
    Pin,
    Token,
}

impl CredentialScheme {
    /// Query/form parameter carrying the credential on `/admin/login`.
    #[must_use]
    pub const fn param(self) -> &'static str {
        match self {
            Self::Pin => "pin",
            Self::Token => "token",
        }
    }

    /// Generic login failure text; never says which check failed.
    #[must_use]
    pub const fn invalid_message(self) -> &'static str {
        match self {
            Self::Pin => "Invalid PIN",
            Self::Token => "Invalid token",
        }
    }
}

impl fmt::Display for CredentialScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.param())
    }
}

impl FromStr for CredentialScheme {
    type Err = CredentialError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "pin" => Ok(Self::Pin),
            "token" => Ok(Self::Token),
            other => Err(CredentialError::UnknownScheme(other.to_string())),
        }
    }
}

#[derive(Clone, Debug)]
pub enum Credential {
    Pin(SecretString),
    Token(SecretString),
}

impl Credential {
    /// Build a PIN credential from a known value.
    ///
    /// # Errors
    /// Returns an error unless `pin` is exactly six ASCII digits.
    pub fn pin(pin: &str) -> Result<Self, CredentialError> {
        if !valid_pin_format(pin) {
            return Err(CredentialError::InvalidPin);
        }
        Ok(Self::Pin(SecretString::from(pin.to_string())))
    }

    /// Build a token credential.
    ///
    /// # Errors
    /// Returns an error if the token is empty.
    pub fn token(token: SecretString) -> Result<Self, CredentialError> {
        if token.expose_secret().trim().is_empty() {
            return Err(CredentialError::EmptyToken);
        }
        Ok(Self::Token(token))
    }

    /// Fresh PIN drawn from the OS random source.
    #[must_use]
    pub fn generate_pin() -> Self {
        Self::Pin(SecretString::from(generate_pin()))
    }

    #[must_use]
    pub const fn scheme(&self) -> CredentialScheme {
        match self {
            Self::Pin(_) => CredentialScheme::Pin,
            Self::Token(_) => CredentialScheme::Token,
        }
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        match self {
            Self::Pin(secret) | Self::Token(secret) => secret.expose_secret(),
        }
    }

    /// Compare a caller-supplied value against the credential.
    ///
    /// Surrounding whitespace is ignored. Both sides are hashed before the
    /// comparison so neither the mismatch position nor the input length
    /// affects timing. Malformed input is simply a mismatch.
    #[must_use]
    pub fn verify(&self, input: &str) -> bool {
        let candidate = input.trim();
        if let Self::Pin(_) = self {
            if !valid_pin_format(candidate) {
                return false;
            }
        }
        digest_eq(candidate, self.expose())
    }
}

/// Six decimal digits, each drawn uniformly from the OS CSPRNG.
#[must_use]
pub fn generate_pin() -> String {
    (0..PIN_LENGTH)
        .map(|_| char::from(b'0' + OsRng.gen_range(0..10u8)))
        .collect()
}

static PIN_FORMAT: OnceLock<Option<Regex>> = OnceLock::new();

/// Shape check only; it never looks at the expected PIN.
pub(crate) fn valid_pin_format(pin: &str) -> bool {
    PIN_FORMAT
        .get_or_init(|| Regex::new(r"^[0-9]{6}$").ok())
        .as_ref()
        .is_some_and(|regex| regex.is_match(pin))
}

fn digest_eq(candidate: &str, expected: &str) -> bool {
    let candidate = Sha256::digest(candidate.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    candidate.as_slice().ct_eq(expected.as_slice()).into()
}

/// Process-wide credential state shared by all admin requests.
#[derive(Clone, Debug)]
pub struct CredentialStore {
    inner: Arc<RwLock<Credential>>,
    scheme: CredentialScheme,
}

impl CredentialStore {
    #[must_use]
    pub fn new(credential: Credential) -> Self {
        Self {
            scheme: credential.scheme(),
            inner: Arc::new(RwLock::new(credential)),
        }
    }

    /// The scheme is fixed for the lifetime of the store.
    #[must_use]
    pub const fn scheme(&self) -> CredentialScheme {
        self.scheme
    }

    pub async fn current(&self) -> Credential {
        self.inner.read().await.clone()
    }

    pub async fn verify(&self, input: &str) -> bool {
        self.inner.read().await.verify(input)
    }

    /// Replace the PIN with a freshly generated one and return it.
    ///
    /// Existing admin sessions stay valid; only new logins need the new PIN.
    ///
    /// # Errors
    /// Returns an error when the store guards a token instead of a PIN.
    pub async fn rotate_pin(&self) -> Result<Credential, CredentialError> {
        let mut guard = self.inner.write().await;
        if guard.scheme() != CredentialScheme::Pin {
            return Err(CredentialError::NotPinScheme);
        }
        *guard = Credential::generate_pin();
        info!("Admin PIN rotated");
        Ok(guard.clone())
    }
}
