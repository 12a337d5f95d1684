use clap::{Arg, Command};

pub const ARG_PASSWORD_REGEX: &str = "password-regex";
pub const ARG_PASSWORD_REQUIREMENT: &str = "password-requirement";
pub const ARG_APP_ENV: &str = "app-env";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PASSWORD_REGEX)
                .long(ARG_PASSWORD_REGEX)
                .help("Pattern every new password must fully match")
                .long_help(
                    "Pattern every new password must fully match. Lookaround and backreferences are supported, the pattern is always anchored to the whole password.",
                )
                .env("NEW_PASSWORD_REGEX")
                .required(true),
        )
        .arg(
            Arg::new(ARG_PASSWORD_REQUIREMENT)
                .long(ARG_PASSWORD_REQUIREMENT)
                .help("Human readable description of the password policy")
                .env("NEW_PASSWORD_REQUIREMENT_DESCRIPTION")
                .default_value(""),
        )
        .arg(
            Arg::new(ARG_APP_ENV)
                .long(ARG_APP_ENV)
                .help("Environment label shown on the form, e.g. staging")
                .env("APP_ENV")
                .default_value(""),
        )
}
