use clap::{Arg, Command};

pub const CMD_SECURITY: &str = "security";
pub const ARG_SETTING: &str = "setting";

pub const SETTINGS: [&str; 6] = ["tls", "mtls", "device-lock", "reset-token", "unbind", "show"];

#[must_use]
pub fn command() -> Command {
    Command::new(CMD_SECURITY)
        .about("Toggle or inspect the security settings in config.json")
        .arg(
            Arg::new(ARG_SETTING)
                .help("tls | mtls | device-lock toggle a flag, reset-token issues a new token, unbind forgets the bound device")
                .default_value("show")
                .value_parser(SETTINGS),
        )
}
