pub mod database;
pub mod logging;
pub mod policy;

use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const ARG_PORT: &str = "port";

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

    let command = Command::new("passchange")
        .about("Self-service database password change")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("PASSCHANGE_PORT")
                .value_parser(clap::value_parser!(u16)),
        );

    let command = database::with_args(command);
    let command = policy::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::{ARG_DB_HOST, ARG_DB_NAME, ARG_DB_PORT, ARG_DB_SSLMODE, ARG_DB_TIMEOUT};
    use policy::{ARG_APP_ENV, ARG_PASSWORD_REGEX, ARG_PASSWORD_REQUIREMENT};

    const ENV_VARS: [&str; 10] = [
        "PASSCHANGE_PORT",
        "PASSCHANGE_LOG_LEVEL",
        "PASSCHANGE_DB_TIMEOUT",
        "DATABASE_HOST",
        "DATABASE_PORT",
        "DATABASE_NAME",
        "DATABASE_SSLMODE",
        "APP_ENV",
        "NEW_PASSWORD_REGEX",
        "NEW_PASSWORD_REQUIREMENT_DESCRIPTION",
    ];

    fn cleared_env() -> Vec<(&'static str, Option<&'static str>)> {
        ENV_VARS.iter().map(|name| (*name, None)).collect()
    }

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "passchange");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Self-service database password change".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars(cleared_env(), || {
            let matches = new().get_matches_from(vec![
                "passchange",
                "--db-name",
                "accounts",
                "--password-regex",
                ".{12,}",
            ]);

            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(8080));
            assert_eq!(
                matches.get_one::<String>(ARG_DB_HOST).cloned(),
                Some("localhost".to_string())
            );
            assert_eq!(matches.get_one::<u16>(ARG_DB_PORT).copied(), Some(5432));
            assert_eq!(
                matches.get_one::<String>(ARG_DB_SSLMODE).cloned(),
                Some("prefer".to_string())
            );
            assert_eq!(matches.get_one::<u64>(ARG_DB_TIMEOUT).copied(), Some(10));
            assert_eq!(
                matches.get_one::<String>(ARG_APP_ENV).cloned(),
                Some(String::new())
            );
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("PASSCHANGE_PORT", Some("9090")),
                ("PASSCHANGE_LOG_LEVEL", Some("info")),
                ("PASSCHANGE_DB_TIMEOUT", Some("3")),
                ("DATABASE_HOST", Some("db.internal")),
                ("DATABASE_PORT", Some("6432")),
                ("DATABASE_NAME", Some("accounts")),
                ("DATABASE_SSLMODE", Some("require")),
                ("APP_ENV", Some("staging")),
                ("NEW_PASSWORD_REGEX", Some("(?=.*\\d).{12,}")),
                (
                    "NEW_PASSWORD_REQUIREMENT_DESCRIPTION",
                    Some("at least 12 characters with a digit"),
                ),
            ],
            || {
                let matches = new().get_matches_from(vec!["passchange"]);
                assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(9090));
                assert_eq!(
                    matches.get_one::<String>(ARG_DB_HOST).cloned(),
                    Some("db.internal".to_string())
                );
                assert_eq!(matches.get_one::<u16>(ARG_DB_PORT).copied(), Some(6432));
                assert_eq!(
                    matches.get_one::<String>(ARG_DB_NAME).cloned(),
                    Some("accounts".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>(ARG_DB_SSLMODE).cloned(),
                    Some("require".to_string())
                );
                assert_eq!(matches.get_one::<u64>(ARG_DB_TIMEOUT).copied(), Some(3));
                assert_eq!(
                    matches.get_one::<String>(ARG_APP_ENV).cloned(),
                    Some("staging".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>(ARG_PASSWORD_REGEX).cloned(),
                    Some("(?=.*\\d).{12,}".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>(ARG_PASSWORD_REQUIREMENT).cloned(),
                    Some("at least 12 characters with a digit".to_string())
                );
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_invalid_sslmode_rejected() {
        temp_env::with_vars(cleared_env(), || {
            let result = new().try_get_matches_from(vec![
                "passchange",
                "--db-name",
                "accounts",
                "--password-regex",
                ".+",
                "--db-sslmode",
                "sometimes",
            ]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_policy_regex_required() {
        temp_env::with_vars(cleared_env(), || {
            let result = new().try_get_matches_from(vec!["passchange", "--db-name", "accounts"]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars(
                [
                    ("PASSCHANGE_LOG_LEVEL", Some(level)),
                    ("DATABASE_NAME", Some("accounts")),
                    ("NEW_PASSWORD_REGEX", Some(".+")),
                ],
                || {
                    let matches = new().get_matches_from(vec!["passchange"]);
                    assert_eq!(
                        matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                        u8::try_from(index).ok()
                    );
                },
            );
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5_usize {
            temp_env::with_vars([("PASSCHANGE_LOG_LEVEL", None::<String>)], || {
                let mut args = vec![
                    "passchange".to_string(),
                    "--db-name".to_string(),
                    "accounts".to_string(),
                    "--password-regex".to_string(),
                    ".+".to_string(),
                ];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }
}
