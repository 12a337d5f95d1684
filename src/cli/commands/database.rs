//! Database target arguments.
//!
//! Only the location of the database is configured here. Credentials always
//! come from the person submitting the form.

use anyhow::{Context, Result, bail};
use clap::{Arg, ArgMatches, Command};
use std::time::Duration;

pub const ARG_DB_HOST: &str = "db-host";
pub const ARG_DB_PORT: &str = "db-port";
pub const ARG_DB_NAME: &str = "db-name";
pub const ARG_DB_SSLMODE: &str = "db-sslmode";
pub const ARG_DB_TIMEOUT: &str = "db-timeout";

const SSL_MODES: [&str; 6] = [
    "disable",
    "allow",
    "prefer",
    "require",
    "verify-ca",
    "verify-full",
];

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_DB_HOST)
                .long(ARG_DB_HOST)
                .help("Database host")
                .env("DATABASE_HOST")
                .default_value("localhost"),
        )
        .arg(
            Arg::new(ARG_DB_PORT)
                .long(ARG_DB_PORT)
                .help("Database port")
                .env("DATABASE_PORT")
                .default_value("5432")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_DB_NAME)
                .long(ARG_DB_NAME)
                .help("Database name")
                .env("DATABASE_NAME")
                .required(true),
        )
        .arg(
            Arg::new(ARG_DB_SSLMODE)
                .long(ARG_DB_SSLMODE)
                .help("TLS mode for database connections")
                .env("DATABASE_SSLMODE")
                .default_value("prefer")
                .value_parser(SSL_MODES),
        )
        .arg(
            Arg::new(ARG_DB_TIMEOUT)
                .long(ARG_DB_TIMEOUT)
                .help("Seconds allowed for connecting and for running the password change")
                .env("PASSCHANGE_DB_TIMEOUT")
                .default_value("10")
                .value_parser(clap::value_parser!(u64)),
        )
}

#[derive(Debug, Clone)]
pub struct Options {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub sslmode: String,
    pub timeout: Duration,
}

impl Options {
    /// Parse database options from CLI matches.
    ///
    /// # Errors
    /// Returns an error if the database name is missing or the timeout is zero.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let host = matches
            .get_one::<String>(ARG_DB_HOST)
            .cloned()
            .unwrap_or_else(|| "localhost".to_string());
        let port = matches.get_one::<u16>(ARG_DB_PORT).copied().unwrap_or(5432);
        let name = matches
            .get_one::<String>(ARG_DB_NAME)
            .cloned()
            .context("missing required argument: --db-name")?;
        let sslmode = matches
            .get_one::<String>(ARG_DB_SSLMODE)
            .cloned()
            .unwrap_or_else(|| "prefer".to_string());
        let timeout = matches.get_one::<u64>(ARG_DB_TIMEOUT).copied().unwrap_or(10);

        if timeout == 0 {
            bail!("--{ARG_DB_TIMEOUT} must be greater than zero");
        }

        Ok(Self {
            host,
            port,
            name,
            sslmode,
            timeout: Duration::from_secs(timeout),
        })
    }
}
