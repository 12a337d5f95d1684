use clap::{Arg, ArgAction, ArgMatches, Command, builder::ValueParser};
use tracing::Level;

pub const ARG_VERBOSITY: &str = "verbosity";

/// Level names accepted by `PASSCHANGE_LOG_LEVEL`, indexed by verbosity.
const LEVELS: [(&str, Option<Level>); 5] = [
    ("error", None),
    ("warn", Some(Level::WARN)),
    ("info", Some(Level::INFO)),
    ("debug", Some(Level::DEBUG)),
    ("trace", Some(Level::TRACE)),
];

fn parse_level(value: &str) -> Result<u8, String> {
    if let Ok(count) = value.parse::<u8>() {
        return Ok(count);
    }

    LEVELS
        .iter()
        .position(|(name, _)| name.eq_ignore_ascii_case(value))
        .and_then(|index| u8::try_from(index).ok())
        .ok_or_else(|| {
            format!(
                "unknown log level '{value}', expected one of: {}",
                LEVELS.map(|(name, _)| name).join(", ")
            )
        })
}

/// Tracing level for the parsed `-v` count or `PASSCHANGE_LOG_LEVEL`.
/// `None` leaves the subscriber at its `ERROR` default.
#[must_use]
pub fn level(matches: &ArgMatches) -> Option<Level> {
    let verbosity = matches.get_one::<u8>(ARG_VERBOSITY).copied().unwrap_or(0);
    LEVELS
        .get(usize::from(verbosity))
        .map_or(Some(Level::TRACE), |(_, level)| *level)
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Increase verbosity, or set PASSCHANGE_LOG_LEVEL to error|warn|info|debug|trace")
            .env("PASSCHANGE_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(ValueParser::new(parse_level)),
    )
}
