//! On-disk server configuration.
//!
//! The config lives in `<config_dir>/config.json`. It is created with a fresh
//! auth token the first time it is loaded and rewritten atomically on save.

use crate::netif::{self, InterfaceAddr};
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::json;
use std::{
    fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};
use tracing::{debug, info, instrument};

pub const CONFIG_FILE_NAME: &str = "config.json";

const DEFAULT_PORT: u16 = 3100;
const DEFAULT_BIND_HOST: &str = "0.0.0.0";
const FALLBACK_HOST: &str = "127.0.0.1";
const DEFAULT_SERVER_NAME: &str = "darkcode";
const DEFAULT_MAX_SESSIONS_PER_IP: u32 = 5;
const TOKEN_BYTES: usize = 24;
const MASK_VISIBLE: usize = 4;
const MASK_FILL: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode config: {0}")]
    Encode(serde_json::Error),
    #[error("failed to generate auth token: {0}")]
    Entropy(#[from] rand::Error),
}

/// How the mobile client reaches the server; only changes the advertised label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    Direct,
    Tailscale,
}

impl LinkMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Tailscale => "tailscale",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub bind_host: String,
    /// Advertised host; discovered from the local interfaces when unset.
    pub public_host: Option<String>,
    pub working_dir: PathBuf,
    pub server_name: String,
    #[serde(
        serialize_with = "serialize_secret",
        deserialize_with = "deserialize_secret"
    )]
    pub token: SecretString,
    pub tls_enabled: bool,
    pub mtls_enabled: bool,
    pub device_lock: bool,
    pub bound_device_id: Option<String>,
    pub max_sessions_per_ip: u32,
    #[serde(skip)]
    pub(crate) config_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_host: DEFAULT_BIND_HOST.to_string(),
            public_host: None,
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            server_name: DEFAULT_SERVER_NAME.to_string(),
            token: SecretString::default(),
            tls_enabled: false,
            mtls_enabled: false,
            device_lock: true,
            bound_device_id: None,
            max_sessions_per_ip: DEFAULT_MAX_SESSIONS_PER_IP,
            config_dir: PathBuf::new(),
        }
    }
}

impl ServerConfig {
    /// Load the config from `dir`, creating it with a fresh token when missing.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or created.
    #[instrument]
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);

        if !path.exists() {
            let config = Self {
                token: generate_token()?,
                config_dir: dir.to_path_buf(),
                ..Self::default()
            };
            config.save()?;
            info!("Created config at {}", path.display());
            return Ok(config);
        }

        let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let mut config: Self =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;
        config.config_dir = dir.to_path_buf();

        // Older files may predate the token field.
        if config.token.expose_secret().is_empty() {
            config.token = generate_token()?;
            config.save()?;
        }

        debug!("Loaded config from {}", path.display());

        Ok(config)
    }

    /// Persist the config, replacing the file atomically.
    ///
    /// # Errors
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = self.path();
        let write_err = |source| ConfigError::Write {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.config_dir).map_err(write_err)?;

        let body = serde_json::to_string_pretty(self).map_err(ConfigError::Encode)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(write_err)?;
        restrict_permissions(&tmp).map_err(write_err)?;
        fs::rename(&tmp, &path).map_err(write_err)?;

        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Flip TLS; turning it off also turns off mTLS.
    pub fn toggle_tls(&mut self) -> bool {
        self.tls_enabled = !self.tls_enabled;
        if !self.tls_enabled {
            self.mtls_enabled = false;
        }
        self.tls_enabled
    }

    /// Flip mTLS; enabling it forces TLS on.
    pub fn toggle_mtls(&mut self) -> bool {
        self.mtls_enabled = !self.mtls_enabled;
        if self.mtls_enabled {
            self.tls_enabled = true;
        }
        self.mtls_enabled
    }

    pub fn toggle_device_lock(&mut self) -> bool {
        self.device_lock = !self.device_lock;
        self.device_lock
    }

    /// Replace the auth token. Every paired device must re-pair afterwards.
    ///
    /// # Errors
    /// Returns an error if the OS random source fails.
    pub fn reset_token(&mut self) -> Result<&SecretString, ConfigError> {
        self.token = generate_token()?;
        Ok(&self.token)
    }

    /// Forget the bound device. Returns `false` when nothing was bound.
    pub fn unbind_device(&mut self) -> bool {
        self.bound_device_id.take().is_some()
    }

    /// Token with only the first and last four characters visible.
    #[must_use]
    pub fn masked_token(&self) -> String {
        mask_secret(self.token.expose_secret())
    }

    #[must_use]
    pub fn ws_url(&self) -> String {
        let scheme = if self.tls_enabled { "wss" } else { "ws" };
        format!("{scheme}://{}:{}", self.advertised_host(LinkMode::Direct), self.port)
    }

    /// Host a phone should dial for `mode`.
    #[must_use]
    pub fn advertised_host(&self, mode: LinkMode) -> String {
        self.select_host(mode, &netif::discover())
    }

    /// Tailnet address of this machine, if it has one.
    #[must_use]
    pub fn tailscale_host() -> Option<String> {
        netif::tailnet_address(&netif::discover()).map(|ip| ip.to_string())
    }

    /// Tailscale mode prefers the tailnet address. Otherwise a configured
    /// `public_host` wins over the first LAN address.
    fn select_host(&self, mode: LinkMode, interfaces: &[InterfaceAddr]) -> String {
        if mode == LinkMode::Tailscale {
            if let Some(ip) = netif::tailnet_address(interfaces) {
                return ip.to_string();
            }
        }
        if let Some(host) = self.public_host.as_deref().filter(|host| !host.is_empty()) {
            return host.to_string();
        }
        netif::lan_address(interfaces)
            .map_or_else(|| FALLBACK_HOST.to_string(), |ip| ip.to_string())
    }

    /// Deep link the mobile app scans to register this server.
    #[must_use]
    pub fn deep_link(&self, mode: LinkMode, host: Option<&str>) -> String {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
        let payload = json!({
            "name": self.server_name,
            "host": host.map_or_else(|| self.advertised_host(mode), str::to_string),
            "port": self.port,
            "token": self.token.expose_secret(),
            "mode": mode.as_str(),
            "ts": ts,
        });
        let encoded = Base64UrlUnpadded::encode_string(payload.to_string().as_bytes());
        format!("darkcode://server/add?config={encoded}")
    }
}

/// Generate a new auth token: 24 random bytes, URL-safe base64 without padding.
///
/// # Errors
/// Returns an error if the OS random source fails.
pub fn generate_token() -> Result<SecretString, ConfigError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(SecretString::from(Base64UrlUnpadded::encode_string(&bytes)))
}

/// Default config directory: `$HOME/.darkcode`, or `.darkcode` when `HOME` is unset.
#[must_use]
pub fn default_config_dir() -> PathBuf {
    std::env::var_os("HOME").map_or_else(
        || PathBuf::from(".darkcode"),
        |home| PathBuf::from(home).join(".darkcode"),
    )
}

fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= MASK_VISIBLE * 2 {
        return "*".repeat(MASK_FILL);
    }
    let head: String = chars[..MASK_VISIBLE].iter().collect();
    let tail: String = chars[chars.len() - MASK_VISIBLE..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(MASK_FILL))
}

fn serialize_secret<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

fn deserialize_secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
