use clap::{builder::ValueParser, Arg, ArgAction, Command};

pub const ARG_VERBOSITY: &str = "verbosity";

// Index is the verbosity count that `-v` repetitions would produce.
const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Accept `DARKCODE_LOG_LEVEL` as a level name or its index.
#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(parse_level)
}

fn parse_level(value: &str) -> Result<u8, String> {
    let index = value.parse::<usize>().ok().filter(|index| *index < LEVELS.len());
    index
        .or_else(|| LEVELS.iter().position(|level| level.eq_ignore_ascii_case(value)))
        .and_then(|index| u8::try_from(index).ok())
        .ok_or_else(|| format!("invalid log level, expected one of: {}", LEVELS.join(", ")))
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env("DARKCODE_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}
