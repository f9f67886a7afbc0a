use crate::{cli::globals::GlobalArgs, config::ServerConfig};
use anyhow::{anyhow, Context, Result};
use secrecy::ExposeSecret;
use std::str::FromStr;
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Setting {
    Tls,
    Mtls,
    DeviceLock,
    ResetToken,
    Unbind,
    Show,
}

impl FromStr for Setting {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "tls" => Ok(Self::Tls),
            "mtls" => Ok(Self::Mtls),
            "device-lock" => Ok(Self::DeviceLock),
            "reset-token" => Ok(Self::ResetToken),
            "unbind" => Ok(Self::Unbind),
            "show" => Ok(Self::Show),
            other => Err(anyhow!("unknown security setting: {other}")),
        }
    }
}

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub setting: Setting,
}

/// Apply one security change to config.json and print the result.
/// # Errors
/// Returns an error if the config cannot be loaded or saved.
pub fn execute(args: &Args) -> Result<()> {
    let mut config = ServerConfig::load(args.globals.config_dir())
        .context("Failed to load server config")?;

    let message = apply(&mut config, args.setting)?;
    if args.setting != Setting::Show {
        config.save().context("Failed to save server config")?;
        info!("Security setting changed: {:?}", args.setting);
    }

    println!("{message}");

    Ok(())
}

/// Change the in-memory config and describe what happened.
/// # Errors
/// Returns an error if a new token cannot be generated.
pub fn apply(config: &mut ServerConfig, setting: Setting) -> Result<String> {
    let message = match setting {
        Setting::Tls => {
            let enabled = config.toggle_tls();
            format!(
                "TLS {}; clients connect to {}",
                on_off(enabled),
                config.ws_url()
            )
        }
        Setting::Mtls => {
            let enabled = config.toggle_mtls();
            format!("mTLS {}, TLS {}", on_off(enabled), on_off(config.tls_enabled))
        }
        Setting::DeviceLock => format!("Device lock {}", on_off(config.toggle_device_lock())),
        Setting::ResetToken => {
            let token = config.reset_token()?;
            format!(
                "New auth token: {}\nEvery paired device must re-pair.",
                token.expose_secret()
            )
        }
        Setting::Unbind => {
            if config.unbind_device() {
                "Device unbound; the next device to connect will be bound".to_string()
            } else {
                "No device was bound".to_string()
            }
        }
        Setting::Show => summary(config),
    };

    Ok(message)
}

fn summary(config: &ServerConfig) -> String {
    format!(
        "TLS:         {}\nmTLS:        {}\nDevice lock: {}\nBound device: {}\nToken:       {}",
        on_off(config.tls_enabled),
        on_off(config.mtls_enabled),
        on_off(config.device_lock),
        config.bound_device_id.as_deref().unwrap_or("none"),
        config.masked_token(),
    )
}

const fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}
