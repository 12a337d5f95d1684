use crate::cli::{commands::database, telemetry};
use crate::passchange::{
    self, Settings,
    audit::TracingAuditSink,
    change::PasswordChanger,
    database::PostgresDirectory,
    policy::PasswordPolicy,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub app_env: String,
    pub database: database::Options,
    pub policy: PasswordPolicy,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database target is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let directory = PostgresDirectory::new(
        &args.database.host,
        args.database.port,
        &args.database.name,
        &args.database.sslmode,
        args.database.timeout,
    )
    .context("invalid database configuration")?;

    let changer = Arc::new(PasswordChanger::new(
        Arc::new(args.policy),
        Arc::new(directory),
        Arc::new(TracingAuditSink),
    ));

    let settings = Arc::new(Settings {
        app_env: args.app_env,
    });

    let result = passchange::new(args.port, settings, changer).await;

    telemetry::shutdown_tracer();

    result
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        (
            "database",
            format!(
                "{}:{}/{}",
                args.database.host, args.database.port, args.database.name
            ),
        ),
        ("sslmode", args.database.sslmode.clone()),
        ("db_timeout", format!("{}s", args.database.timeout.as_secs())),
        ("app_env", args.app_env.clone()),
        ("password_policy", args.policy.source().to_string()),
        (
            "password_requirement",
            args.policy.description().to_string(),
        ),
    ];

    info!("{}", format_entries("Startup configuration", &entries));
}

fn format_entries(title: &str, entries: &[(&str, String)]) -> String {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!(
        "{} {} ({})\n\n{title}:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        crate::GIT_COMMIT_HASH
    );
    for (key, value) in entries {
        message.push_str(&format!("\n  {key:<max_key_len$}  {value}"));
    }
    message
}
