use clap::{Arg, Command};

pub const CMD_LINK: &str = "link";
pub const ARG_MODE: &str = "mode";
pub const ARG_HOST: &str = "host";

#[must_use]
pub fn command() -> Command {
    Command::new(CMD_LINK)
        .about("Print the deep link that adds this server to the mobile app")
        .arg(
            Arg::new(ARG_MODE)
                .short('m')
                .long(ARG_MODE)
                .help("How the phone reaches the server")
                .default_value("direct")
                .value_parser(["direct", "tailscale"]),
        )
        .arg(
            Arg::new(ARG_HOST)
                .long(ARG_HOST)
                .help("Host to advertise instead of the configured or discovered one"),
        )
}
