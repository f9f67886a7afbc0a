pub mod link;
pub mod logging;
pub mod security;
pub mod serve;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_CONFIG_DIR: &str = "config-dir";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("darkcode")
        .about("Remote control server admin gate")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_CONFIG_DIR)
                .long(ARG_CONFIG_DIR)
                .help("Directory holding config.json (default: $HOME/.darkcode)")
                .env("DARKCODE_CONFIG_DIR")
                .global(true),
        )
        .subcommand(security::command())
        .subcommand(link::command());

    let command = serve::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SERVE_ENV: [(&str, Option<&str>); 8] = [
        ("DARKCODE_PORT", None),
        ("DARKCODE_BIND_HOST", None),
        ("DARKCODE_ADMIN_AUTH", None),
        ("DARKCODE_ADMIN_PIN", None),
        ("DARKCODE_ADMIN_MAX_ATTEMPTS", None),
        ("DARKCODE_ADMIN_ATTEMPT_WINDOW", None),
        ("DARKCODE_CONFIG_DIR", None),
        ("DARKCODE_LOG_LEVEL", None),
    ];

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "darkcode");
        assert_eq!(
            command.get_about().unwrap().to_string(),
            "Remote control server admin gate"
        );
        assert_eq!(
            command.get_version().unwrap().to_string(),
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn test_serve_defaults() {
        temp_env::with_vars(SERVE_ENV, || {
            let matches = new().get_matches_from(vec!["darkcode"]);
            assert!(matches.subcommand().is_none());
            assert_eq!(matches.get_one::<u16>(serve::ARG_PORT), None);
            assert_eq!(
                matches
                    .get_one::<String>(serve::ARG_ADMIN_AUTH)
                    .map(String::as_str),
                Some("pin")
            );
            assert_eq!(
                matches.get_one::<u32>(serve::ARG_ADMIN_MAX_ATTEMPTS).copied(),
                Some(0)
            );
            assert_eq!(
                matches.get_one::<u64>(serve::ARG_ADMIN_ATTEMPT_WINDOW).copied(),
                Some(300)
            );
        });
    }

    #[test]
    fn test_serve_args() {
        temp_env::with_vars(SERVE_ENV, || {
            let matches = new().get_matches_from(vec![
                "darkcode",
                "--port",
                "3200",
                "--bind",
                "127.0.0.1",
                "--admin-auth",
                "token",
                "--config-dir",
                "/tmp/darkcode",
            ]);
            assert_eq!(matches.get_one::<u16>(serve::ARG_PORT).copied(), Some(3200));
            assert_eq!(
                matches.get_one::<String>(serve::ARG_BIND).map(String::as_str),
                Some("127.0.0.1")
            );
            assert_eq!(
                matches.get_one::<String>(ARG_CONFIG_DIR).map(String::as_str),
                Some("/tmp/darkcode")
            );
        });
    }

    #[test]
    fn test_rejects_unknown_scheme() {
        temp_env::with_vars(SERVE_ENV, || {
            let result = new().try_get_matches_from(vec!["darkcode", "--admin-auth", "password"]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("DARKCODE_PORT", Some("443")),
                ("DARKCODE_ADMIN_AUTH", Some("token")),
                ("DARKCODE_ADMIN_MAX_ATTEMPTS", Some("5")),
                ("DARKCODE_CONFIG_DIR", Some("/srv/darkcode")),
                ("DARKCODE_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["darkcode"]);
                assert_eq!(matches.get_one::<u16>(serve::ARG_PORT).copied(), Some(443));
                assert_eq!(
                    matches
                        .get_one::<String>(serve::ARG_ADMIN_AUTH)
                        .map(String::as_str),
                    Some("token")
                );
                assert_eq!(
                    matches.get_one::<u32>(serve::ARG_ADMIN_MAX_ATTEMPTS).copied(),
                    Some(5)
                );
                assert_eq!(
                    matches.get_one::<String>(ARG_CONFIG_DIR).map(String::as_str),
                    Some("/srv/darkcode")
                );
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("DARKCODE_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["darkcode"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(u8::try_from(index).unwrap())
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5usize {
            temp_env::with_vars([("DARKCODE_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["darkcode".to_string()];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(u8::try_from(index).unwrap())
                );
            });
        }
    }

    #[test]
    fn test_security_subcommand() {
        temp_env::with_vars(SERVE_ENV, || {
            let matches = new().get_matches_from(vec!["darkcode", "security", "mtls"]);
            let (name, sub) = matches.subcommand().unwrap();
            assert_eq!(name, security::CMD_SECURITY);
            assert_eq!(
                sub.get_one::<String>(security::ARG_SETTING).map(String::as_str),
                Some("mtls")
            );

            let matches = new().get_matches_from(vec!["darkcode", "security"]);
            let (_, sub) = matches.subcommand().unwrap();
            assert_eq!(
                sub.get_one::<String>(security::ARG_SETTING).map(String::as_str),
                Some("show")
            );

            assert!(new()
                .try_get_matches_from(vec!["darkcode", "security", "firewall"])
                .is_err());
        });
    }

    #[test]
    fn test_link_subcommand() {
        temp_env::with_vars(SERVE_ENV, || {
            let matches = new().get_matches_from(vec![
                "darkcode",
                "--config-dir",
                "/tmp/dc",
                "link",
                "--mode",
                "tailscale",
                "--host",
                "box.tailnet.ts.net",
            ]);
            let (name, sub) = matches.subcommand().unwrap();
            assert_eq!(name, link::CMD_LINK);
            assert_eq!(
                sub.get_one::<String>(link::ARG_MODE).map(String::as_str),
                Some("tailscale")
            );
            assert_eq!(
                sub.get_one::<String>(link::ARG_HOST).map(String::as_str),
                Some("box.tailnet.ts.net")
            );
        });
    }
}
