//! Command-line argument dispatch.
//!
//! Validated CLI arguments are mapped to an [`Action`]. The password policy is
//! compiled here so a bad pattern stops the process before it starts listening.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_PORT, database, policy};
use crate::passchange::policy::PasswordPolicy;
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or the policy pattern does not compile.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let database = database::Options::parse(matches)?;

    let pattern = matches
        .get_one::<String>(policy::ARG_PASSWORD_REGEX)
        .context("missing required argument: --password-regex")?;
    let description = matches
        .get_one::<String>(policy::ARG_PASSWORD_REQUIREMENT)
        .cloned()
        .unwrap_or_default();
    let password_policy =
        PasswordPolicy::new(pattern, description).context("invalid NEW_PASSWORD_REGEX")?;

    let app_env = matches
        .get_one::<String>(policy::ARG_APP_ENV)
        .cloned()
        .unwrap_or_default();

    Ok(Action::Server(Args {
        port,
        app_env,
        database,
        policy: password_policy,
    }))
}
