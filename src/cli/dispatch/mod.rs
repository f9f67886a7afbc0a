//! Maps parsed arguments to the action the binary runs.

use crate::{
    cli::{
        actions::{link, security, server, Action},
        commands::{self, serve},
        globals::GlobalArgs,
    },
    config::LinkMode,
};
use anyhow::{anyhow, Result};
use clap::ArgMatches;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if arguments are missing or inconsistent.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some((commands::security::CMD_SECURITY, sub)) => Ok(Action::Security(security::Args {
            globals: globals(matches, sub),
            setting: sub
                .get_one::<String>(commands::security::ARG_SETTING)
                .map_or("show", String::as_str)
                .parse()?,
        })),
        Some((commands::link::CMD_LINK, sub)) => Ok(Action::Link(link::Args {
            globals: globals(matches, sub),
            mode: match sub
                .get_one::<String>(commands::link::ARG_MODE)
                .map(String::as_str)
            {
                Some("tailscale") => LinkMode::Tailscale,
                _ => LinkMode::Direct,
            },
            host: sub.get_one::<String>(commands::link::ARG_HOST).cloned(),
        })),
        Some((other, _)) => Err(anyhow!("unknown command: {other}")),
        None => {
            let opts = serve::Options::parse(matches)?;
            Ok(Action::Server(server::Args {
                globals: globals(matches, matches),
                port: opts.port,
                bind: opts.bind,
                scheme: opts.scheme,
                pin: opts.pin,
                max_attempts: opts.max_attempts,
                attempt_window: opts.attempt_window,
            }))
        }
    }
}

fn globals(root: &ArgMatches, sub: &ArgMatches) -> GlobalArgs {
    let config_dir = sub
        .get_one::<String>(commands::ARG_CONFIG_DIR)
        .or_else(|| root.get_one::<String>(commands::ARG_CONFIG_DIR));
    GlobalArgs::new(config_dir.map(String::as_str))
}
