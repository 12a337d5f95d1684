//! Credential-authenticated access to the role catalogue.
//!
//! A [`RoleDirectory`] opens a session *as* the submitting user; the database
//! server performs the password check. The session then rotates that role's
//! password with a single `ALTER ROLE` statement.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use sqlx::{
    ConnectOptions, Connection, PgConnection,
    postgres::{PgConnectOptions, PgSslMode},
};
use std::{str::FromStr, time::Duration};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{Instrument, debug, info_span};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    #[error("value contains a NUL character")]
    Nul,
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error(transparent)]
    Quote(#[from] QuoteError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl DirectoryError {
    /// True when the server refused the credentials, as opposed to being
    /// unreachable or slow.
    #[must_use]
    pub fn is_authentication(&self) -> bool {
        let Self::Database(error) = self else {
            return false;
        };

        if let sqlx::Error::Database(db_error) = error {
            if let Some(code) = db_error.code() {
                if matches!(code.as_ref(), "28P01" | "28000") {
                    return true;
                }
            }

            return db_error
                .message()
                .to_ascii_lowercase()
                .contains("password authentication failed");
        }

        error
            .to_string()
            .to_ascii_lowercase()
            .contains("password authentication failed")
    }
}

/// Quote a string as a PostgreSQL identifier: wrap in double quotes and
/// double any embedded double quote.
///
/// # Errors
/// Returns an error if the value contains a NUL character.
pub fn quote_identifier(ident: &str) -> Result<String, QuoteError> {
    if ident.contains('\0') {
        return Err(QuoteError::Nul);
    }

    let mut quoted = String::with_capacity(ident.len() + 2);
    quoted.push('"');
    for c in ident.chars() {
        if c == '"' {
            quoted.push('"');
        }
        quoted.push(c);
    }
    quoted.push('"');

    Ok(quoted)
}

/// Quote a string as a PostgreSQL string literal.
///
/// Single quotes are doubled. When the value contains a backslash the literal
/// is written in escape-string form (` E'...'`) with doubled backslashes, so it
/// reads the same whatever `standard_conforming_strings` is set to.
///
/// # Errors
/// Returns an error if the value contains a NUL character.
pub fn quote_literal(value: &str) -> Result<String, QuoteError> {
    if value.contains('\0') {
        return Err(QuoteError::Nul);
    }

    let has_backslash = value.contains('\\');
    let mut quoted = String::with_capacity(value.len() + 4);
    if has_backslash {
        quoted.push_str(" E");
    }
    quoted.push('\'');
    for c in value.chars() {
        if c == '\'' || c == '\\' {
            quoted.push(c);
        }
        quoted.push(c);
    }
    quoted.push('\'');

    Ok(quoted)
}

/// Build the password rotation statement for `role`.
///
/// # Errors
/// Returns an error if either value cannot be quoted.
pub fn alter_role_statement(role: &str, new_password: &str) -> Result<String, QuoteError> {
    Ok(format!(
        "ALTER ROLE {} WITH PASSWORD {}",
        quote_identifier(role)?,
        quote_literal(new_password)?
    ))
}

/// Credentials submitted through the form.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Opens sessions authenticated with end-user credentials.
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    async fn connect(
        &self,
        credentials: &Credentials,
    ) -> Result<Box<dyn RoleSession>, DirectoryError>;
}

/// A live session owned by a single request.
#[async_trait]
pub trait RoleSession: Send {
    async fn set_password(
        &mut self,
        role: &str,
        new_password: &SecretString,
    ) -> Result<(), DirectoryError>;

    /// Release the underlying connection.
    async fn close(self: Box<Self>);
}

/// [`RoleDirectory`] backed by one dedicated `PgConnection` per session.
#[derive(Debug, Clone)]
pub struct PostgresDirectory {
    options: PgConnectOptions,
    connect_timeout: Duration,
    statement_timeout: Duration,
}

impl PostgresDirectory {
    /// Build a directory for the given database target.
    ///
    /// # Errors
    /// Returns an error if `sslmode` is not a libpq ssl mode.
    pub fn new(
        host: &str,
        port: u16,
        database: &str,
        sslmode: &str,
        timeout: Duration,
    ) -> Result<Self, sqlx::Error> {
        let options = PgConnectOptions::new()
            .host(host)
            .port(port)
            .database(database)
            .ssl_mode(PgSslMode::from_str(sslmode)?)
            .application_name(crate::APP_USER_AGENT)
            .disable_statement_logging();

        Ok(Self {
            options,
            connect_timeout: timeout,
            statement_timeout: timeout,
        })
    }

    fn options_for(&self, credentials: &Credentials) -> PgConnectOptions {
        self.options
            .clone()
            .username(&credentials.username)
            .password(credentials.password.expose_secret())
    }
}

#[async_trait]
impl RoleDirectory for PostgresDirectory {
    async fn connect(
        &self,
        credentials: &Credentials,
    ) -> Result<Box<dyn RoleSession>, DirectoryError> {
        let options = self.options_for(credentials);
        let span = info_span!(
            "db.connect",
            db.system = "postgresql",
            db.user = %credentials.username
        );

        let conn = timeout(self.connect_timeout, PgConnection::connect_with(&options))
            .instrument(span)
            .await
            .map_err(|_| DirectoryError::Timeout(self.connect_timeout))??;

        Ok(Box::new(PostgresSession {
            conn,
            statement_timeout: self.statement_timeout,
        }))
    }
}

struct PostgresSession {
    conn: PgConnection,
    statement_timeout: Duration,
}

#[async_trait]
impl RoleSession for PostgresSession {
    async fn set_password(
        &mut self,
        role: &str,
        new_password: &SecretString,
    ) -> Result<(), DirectoryError> {
        let statement = alter_role_statement(role, new_password.expose_secret())?;
        let span = info_span!(
            "db.alter_role",
            db.system = "postgresql",
            db.operation = "ALTER ROLE"
        );

        // Extended protocol accepts exactly one statement; never cache it since
        // the text carries the new password.
        timeout(
            self.statement_timeout,
            sqlx::query(&statement)
                .persistent(false)
                .execute(&mut self.conn),
        )
        .instrument(span)
        .await
        .map_err(|_| DirectoryError::Timeout(self.statement_timeout))??;

        Ok(())
    }

    async fn close(self: Box<Self>) {
        let session = *self;
        close_within(session.statement_timeout, session.conn.close()).await;
    }
}

/// Wait for a connection to close, giving up after `bound`. Returns whether
/// the close finished in time.
async fn close_within(
    bound: Duration,
    close: impl std::future::Future<Output = Result<(), sqlx::Error>>,
) -> bool {
    match timeout(bound, close).await {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            debug!("Error closing database connection: {}", err);
            true
        }
        Err(_) => {
            debug!(
                "Closing database connection timed out after {}ms",
                bound.as_millis()
            );
            false
        }
    }
}
