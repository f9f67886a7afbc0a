use crate::{
    cli::globals::GlobalArgs,
    config::{LinkMode, ServerConfig},
};
use anyhow::{Context, Result};

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub mode: LinkMode,
    pub host: Option<String>,
}

/// Print the deep link for pairing a phone.
/// # Errors
/// Returns an error if the config cannot be loaded.
pub fn execute(args: &Args) -> Result<()> {
    let config = ServerConfig::load(args.globals.config_dir())
        .context("Failed to load server config")?;

    println!("{}", config.deep_link(args.mode, args.host.as_deref()));

    Ok(())
}
