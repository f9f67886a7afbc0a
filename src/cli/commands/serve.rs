use crate::auth::CredentialScheme;
use anyhow::{anyhow, Result};
use clap::{builder::PossibleValuesParser, Arg, ArgMatches, Command};
use std::time::Duration;

pub const ARG_PORT: &str = "port";
pub const ARG_BIND: &str = "bind";
pub const ARG_ADMIN_AUTH: &str = "admin-auth";
pub const ARG_ADMIN_PIN: &str = "admin-pin";
pub const ARG_ADMIN_MAX_ATTEMPTS: &str = "admin-max-attempts";
pub const ARG_ADMIN_ATTEMPT_WINDOW: &str = "admin-attempt-window";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on (default: the port in config.json)")
                .env("DARKCODE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_BIND)
                .short('b')
                .long(ARG_BIND)
                .help("Address to bind (default: bind_host in config.json)")
                .env("DARKCODE_BIND_HOST"),
        )
        .arg(
            Arg::new(ARG_ADMIN_AUTH)
                .long(ARG_ADMIN_AUTH)
                .help("Credential guarding the admin pages")
                .env("DARKCODE_ADMIN_AUTH")
                .default_value("pin")
                .value_parser(PossibleValuesParser::new(["pin", "token"])),
        )
        .arg(
            Arg::new(ARG_ADMIN_PIN)
                .long(ARG_ADMIN_PIN)
                .help("Use this 6-digit PIN instead of generating one")
                .env("DARKCODE_ADMIN_PIN")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_ADMIN_MAX_ATTEMPTS)
                .long(ARG_ADMIN_MAX_ATTEMPTS)
                .help("Failed logins allowed per client address within the window, 0 disables throttling")
                .env("DARKCODE_ADMIN_MAX_ATTEMPTS")
                .default_value("0")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_ADMIN_ATTEMPT_WINDOW)
                .long(ARG_ADMIN_ATTEMPT_WINDOW)
                .help("Throttling window in seconds")
                .env("DARKCODE_ADMIN_ATTEMPT_WINDOW")
                .default_value("300")
                .value_parser(clap::value_parser!(u64)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub port: Option<u16>,
    pub bind: Option<String>,
    pub scheme: CredentialScheme,
    pub pin: Option<String>,
    pub max_attempts: u32,
    pub attempt_window: Duration,
}

impl Options {
    /// # Errors
    /// Returns an error if the credential scheme cannot be parsed.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let scheme = matches
            .get_one::<String>(ARG_ADMIN_AUTH)
            .map_or("pin", String::as_str)
            .parse::<CredentialScheme>()?;

        let pin = matches.get_one::<String>(ARG_ADMIN_PIN).cloned();
        if pin.is_some() && scheme != CredentialScheme::Pin {
            return Err(anyhow!("--{ARG_ADMIN_PIN} requires --{ARG_ADMIN_AUTH} pin"));
        }

        Ok(Self {
            port: matches.get_one::<u16>(ARG_PORT).copied(),
            bind: matches.get_one::<String>(ARG_BIND).cloned(),
            scheme,
            pin,
            max_attempts: matches
                .get_one::<u32>(ARG_ADMIN_MAX_ATTEMPTS)
                .copied()
                .unwrap_or(0),
            attempt_window: Duration::from_secs(
                matches
                    .get_one::<u64>(ARG_ADMIN_ATTEMPT_WINDOW)
                    .copied()
                    .unwrap_or(300),
            ),
        })
    }
}
