//! Identity wrappers for account handles and credentials.

use std::fmt;

use serde::Serialize;

use super::error::IntakeError;

/// A normalized GitHub account handle.
///
/// Only ASCII letters, digits, `-` and `_` are accepted, and the value is
/// never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Identifier(String);

impl Identifier {
    /// Validates and wraps an account handle.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::InvalidIdentifier`] when the value is empty or
    /// contains a character outside `[A-Za-z0-9_-]`.
    pub fn new(value: &str) -> Result<Self, IntakeError> {
        if value.is_empty() || !value.chars().all(is_identifier_char) {
            return Err(IntakeError::InvalidIdentifier {
                value: value.to_owned(),
            });
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the handle.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub(crate) fn profile_path(&self) -> String {
        format!("/users/{}", self.0)
    }

    pub(crate) fn organizations_path(&self) -> String {
        format!("/users/{}/orgs", self.0)
    }

    pub(crate) fn repositories_path(&self, page: u32, per_page: u8) -> String {
        format!("/users/{}/repos?page={page}&per_page={per_page}", self.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Returns true for characters permitted in an [`Identifier`].
pub(crate) const fn is_identifier_char(candidate: char) -> bool {
    candidate.is_ascii_alphanumeric() || candidate == '-' || candidate == '_'
}

/// Personal access token wrapper enforcing presence.
#[derive(Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::MissingToken` when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, IntakeError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(IntakeError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PersonalAccessToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("PersonalAccessToken(***)")
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{Identifier, PersonalAccessToken};
    use crate::github::error::IntakeError;

    #[rstest]
    #[case("octocat")]
    #[case("some-user_42")]
    #[case("A")]
    fn accepts_valid_handles(#[case] value: &str) {
        let identifier = Identifier::new(value).expect("handle should be accepted");
        assert_eq!(identifier.as_str(), value);
    }

    #[rstest]
    #[case::empty("")]
    #[case::space("octo cat")]
    #[case::at_sign("@octocat")]
    #[case::slash("octo/cat")]
    #[case::non_ascii("octocät")]
    fn rejects_invalid_handles(#[case] value: &str) {
        let result = Identifier::new(value);
        assert!(
            matches!(result, Err(IntakeError::InvalidIdentifier { .. })),
            "expected InvalidIdentifier, got {result:?}"
        );
    }

    #[test]
    fn builds_endpoint_paths() {
        let identifier = Identifier::new("octocat").expect("handle should be accepted");
        assert_eq!(identifier.profile_path(), "/users/octocat");
        assert_eq!(identifier.organizations_path(), "/users/octocat/orgs");
        assert_eq!(
            identifier.repositories_path(2, 100),
            "/users/octocat/repos?page=2&per_page=100"
        );
    }

    #[test]
    fn token_is_trimmed_and_required() {
        let token = PersonalAccessToken::new("  ghp_example \n").expect("token should be valid");
        assert_eq!(token.value(), "ghp_example");
        assert_eq!(
            PersonalAccessToken::new("   "),
            Err(IntakeError::MissingToken)
        );
    }

    #[test]
    fn token_debug_output_is_redacted() {
        let token = PersonalAccessToken::new("ghp_secret").expect("token should be valid");
        assert!(!format!("{token:?}").contains("ghp_secret"));
    }
}
