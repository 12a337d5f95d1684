//! New-password validation.
//!
//! The policy pattern is compiled with `fancy-regex` so operators can express
//! rules that need lookaround or backreferences. It is always anchored: a
//! password is accepted only when the whole string matches.

use fancy_regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::warn;

/// Why a new password was refused before touching the database.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("New password cannot be the same as the current password.")]
    SamePassword,
    #[error("New password does not meet the requirements: {0}")]
    Policy(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted,
    Rejected(Rejection),
}

#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pattern: Regex,
    source: String,
    description: String,
}

impl PasswordPolicy {
    /// Compile a policy from the configured pattern.
    ///
    /// # Errors
    /// Returns an error if the pattern is not a valid expression on its own,
    /// before anchoring (`a)|(b` only parses once wrapped).
    pub fn new(pattern: &str, description: impl Into<String>) -> Result<Self, fancy_regex::Error> {
        Regex::new(pattern)?;
        let anchored = Regex::new(&format!(r"\A(?:{pattern})\z"))?;

        Ok(Self {
            pattern: anchored,
            source: pattern.to_string(),
            description: description.into(),
        })
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The pattern as configured, without the anchoring wrapper.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Full-string match against the policy.
    ///
    /// Backtracking can exhaust the engine's limit on hostile input; that is
    /// treated as a mismatch.
    #[must_use]
    pub fn is_match(&self, candidate: &str) -> bool {
        match self.pattern.is_match(candidate) {
            Ok(matched) => matched,
            Err(err) => {
                warn!("Password policy evaluation failed: {}", err);
                false
            }
        }
    }

    /// Run the pre-database checks in order: self-equality, then policy.
    #[must_use]
    pub fn validate(&self, current: &SecretString, new: &SecretString) -> ValidationOutcome {
        if current.expose_secret() == new.expose_secret() {
            return ValidationOutcome::Rejected(Rejection::SamePassword);
        }

        if !self.is_match(new.expose_secret()) {
            return ValidationOutcome::Rejected(Rejection::Policy(self.description.clone()));
        }

        ValidationOutcome::Accepted
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[test]
    fn match_is_anchored_to_the_whole_password() {
        let policy = PasswordPolicy::new(r"\d{4}", "four digits").unwrap();
        assert!(policy.is_match("1234"));
        assert!(!policy.is_match("12345"));
        assert!(!policy.is_match("a1234"));
        assert!(!policy.is_match("1234\n"));
    }

    #[test]
    fn top_level_alternation_stays_anchored() {
        let policy = PasswordPolicy::new("abc|def", "abc or def").unwrap();
        assert!(policy.is_match("abc"));
        assert!(policy.is_match("def"));
        assert!(!policy.is_match("abcdef"));
        assert!(!policy.is_match("xdef"));
    }

    #[test]
    fn lookahead_rules() {
        let policy = PasswordPolicy::new(
            r"(?=.*[A-Z])(?=.*[a-z])(?=.*\d).{10,}",
            "10+ chars with upper, lower and digit",
        )
        .unwrap();
        assert!(policy.is_match("Correct1Horse"));
        assert!(!policy.is_match("correct1horse"));
        assert!(!policy.is_match("CorrectHorse"));
        assert!(!policy.is_match("Sh0rt"));
    }

    #[test]
    fn backreference_rules() {
        // No character may appear twice in a row.
        let policy = PasswordPolicy::new(r"(?!.*(.)\1).{6,}", "no repeated characters").unwrap();
        assert!(policy.is_match("abcdef"));
        assert!(!policy.is_match("abccdef"));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(PasswordPolicy::new("(unclosed", "").is_err());
    }

    #[test]
    fn unbalanced_group_cannot_escape_the_anchors() {
        assert!(PasswordPolicy::new("a)|(b", "x").is_err());
        assert!(PasswordPolicy::new(".*)|(.*", "x").is_err());
    }

    #[test]
    fn source_and_description_are_kept() {
        let policy = PasswordPolicy::new(".{8,}", "at least 8").unwrap();
        assert_eq!(policy.source(), ".{8,}");
        assert_eq!(policy.description(), "at least 8");
    }

    #[test]
    fn same_password_wins_over_policy() {
        // Matches the policy, but equality is checked first.
        let policy = PasswordPolicy::new(".*", "anything").unwrap();
        let outcome = policy.validate(&secret("hunter22"), &secret("hunter22"));
        assert_eq!(outcome, ValidationOutcome::Rejected(Rejection::SamePassword));

        // Fails the policy too; still the equality reason.
        let strict = PasswordPolicy::new(r"\d+", "digits").unwrap();
        let outcome = strict.validate(&secret("abc"), &secret("abc"));
        assert_eq!(outcome, ValidationOutcome::Rejected(Rejection::SamePassword));
    }

    #[test]
    fn policy_rejection_carries_description() {
        let policy = PasswordPolicy::new(".{12,}", "at least 12 characters").unwrap();
        let outcome = policy.validate(&secret("old-password"), &secret("short"));
        let ValidationOutcome::Rejected(rejection) = outcome else {
            panic!("expected a rejection");
        };
        assert_eq!(
            rejection.to_string(),
            "New password does not meet the requirements: at least 12 characters"
        );
    }

    #[test]
    fn accepted_when_different_and_matching() {
        let policy = PasswordPolicy::new(".{12,}", "at least 12 characters").unwrap();
        assert_eq!(
            policy.validate(&secret("old-password"), &secret("a much longer one")),
            ValidationOutcome::Accepted
        );
    }

    #[test]
    fn same_password_message() {
        assert_eq!(
            Rejection::SamePassword.to_string(),
            "New password cannot be the same as the current password."
        );
    }
}
