//! The password change pipeline.
//!
//! `validate → connect as the user → ALTER ROLE → close`. Every failure ends
//! the attempt; nothing is retried.

use crate::passchange::{
    audit::{AuditEvent, AuditOutcome, AuditSink, ConnectionFailureKind, RejectionKind},
    database::{Credentials, DirectoryError, RoleDirectory},
    policy::{PasswordPolicy, Rejection, ValidationOutcome},
};
use secrecy::SecretString;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

pub const SUCCESS_MESSAGE: &str = "Password changed successfully!";

/// A single form submission.
pub struct ChangeRequest {
    pub username: String,
    pub current_password: SecretString,
    pub new_password: SecretString,
}

impl std::fmt::Debug for ChangeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeRequest")
            .field("username", &self.username)
            .field("current_password", &"***")
            .field("new_password", &"***")
            .finish()
    }
}

/// Displayed verbatim to the user.
#[derive(Debug, Error)]
pub enum ChangeError {
    #[error(transparent)]
    Rejected(#[from] Rejection),
    #[error("DB connection failed: {0}")]
    Connection(DirectoryError),
    #[error("Password change failed: {0}")]
    Execution(DirectoryError),
}

impl ChangeError {
    fn outcome(&self) -> AuditOutcome {
        match self {
            Self::Rejected(Rejection::SamePassword) => {
                AuditOutcome::Rejected(RejectionKind::SamePassword)
            }
            Self::Rejected(Rejection::Policy(_)) => AuditOutcome::Rejected(RejectionKind::Policy),
            Self::Connection(err) => AuditOutcome::ConnectionFailed(connection_failure_kind(err)),
            Self::Execution(_) => AuditOutcome::ExecutionFailed,
        }
    }
}

fn connection_failure_kind(err: &DirectoryError) -> ConnectionFailureKind {
    if matches!(err, DirectoryError::Timeout(_)) {
        ConnectionFailureKind::Timeout
    } else if err.is_authentication() {
        ConnectionFailureKind::Authentication
    } else {
        ConnectionFailureKind::Unavailable
    }
}

pub struct PasswordChanger {
    policy: Arc<PasswordPolicy>,
    directory: Arc<dyn RoleDirectory>,
    audit: Arc<dyn AuditSink>,
}

impl PasswordChanger {
    #[must_use]
    pub fn new(
        policy: Arc<PasswordPolicy>,
        directory: Arc<dyn RoleDirectory>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            policy,
            directory,
            audit,
        }
    }

    #[must_use]
    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    /// Validate and apply a password change, reporting the outcome to the
    /// audit sink.
    ///
    /// # Errors
    /// Returns the user-facing reason the change did not happen.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn change(&self, request: &ChangeRequest) -> Result<(), ChangeError> {
        let result = self.apply(request).await;

        let outcome = match &result {
            Ok(()) => AuditOutcome::Changed,
            Err(err) => err.outcome(),
        };
        self.audit.record(&AuditEvent {
            username: request.username.clone(),
            outcome,
        });

        result
    }

    async fn apply(&self, request: &ChangeRequest) -> Result<(), ChangeError> {
        if let ValidationOutcome::Rejected(rejection) = self
            .policy
            .validate(&request.current_password, &request.new_password)
        {
            return Err(rejection.into());
        }

        let credentials = Credentials {
            username: request.username.clone(),
            password: request.current_password.clone(),
        };

        let mut session = self
            .directory
            .connect(&credentials)
            .await
            .map_err(ChangeError::Connection)?;

        debug!("connected, rotating password");

        let result = session
            .set_password(&request.username, &request.new_password)
            .await
            .map_err(ChangeError::Execution);

        session.close().await;

        result
    }
}
