//! # passchange (self-service database password change)
//!
//! `passchange` serves a single HTML form that lets a PostgreSQL user rotate
//! the password of their own role.
//!
//! ## Authentication
//!
//! The service never verifies the current password itself. Each submission
//! opens a dedicated connection using the submitted username and current
//! password, so the database server is the only authority. A failed
//! connection is the "wrong password" signal.
//!
//! ## Password policy
//!
//! New passwords must fully match a configured `fancy-regex` pattern, which may
//! use lookaround and backreferences. Rejected passwords never reach the
//! database.
//!
//! ## Statement safety
//!
//! `ALTER ROLE` does not accept bind parameters, so the role name and the new
//! password are embedded through dedicated identifier and literal quoting and
//! sent as a single extended-protocol statement.

pub mod cli;
pub mod passchange;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
