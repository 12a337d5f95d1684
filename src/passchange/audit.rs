//! Outcome reporting for password change attempts.
//!
//! Handlers never log outcomes directly; they hand an [`AuditEvent`] to the
//! injected [`AuditSink`]. Production uses [`TracingAuditSink`]; tests record
//! events in memory.

use std::sync::Mutex;
use tracing::{error, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectionKind {
    SamePassword,
    Policy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionFailureKind {
    /// The server refused the submitted credentials.
    Authentication,
    Timeout,
    /// Anything else: unreachable host, TLS failure, protocol error.
    Unavailable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuditOutcome {
    Changed,
    Rejected(RejectionKind),
    ConnectionFailed(ConnectionFailureKind),
    ExecutionFailed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditEvent {
    pub username: String,
    pub outcome: AuditOutcome,
}

pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent);
}

/// Emits one structured `tracing` event per attempt.
#[derive(Clone, Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) {
        let username = event.username.as_str();
        match event.outcome {
            AuditOutcome::Changed => info!(username, "password changed"),
            AuditOutcome::Rejected(kind) => {
                info!(username, reason = ?kind, "password change rejected");
            }
            AuditOutcome::ConnectionFailed(ConnectionFailureKind::Authentication) => {
                warn!(username, "password change denied: authentication failed");
            }
            AuditOutcome::ConnectionFailed(kind) => {
                error!(username, reason = ?kind, "password change failed: database unavailable");
            }
            AuditOutcome::ExecutionFailed => {
                error!(username, "password change failed: statement error");
            }
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: &AuditEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
