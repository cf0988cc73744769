//! Cleans free-form user input into account identifiers.
//!
//! Users paste handles in many shapes: bare logins, `@mentions`, profile
//! URLs, or whole spreadsheet columns separated by commas and newlines. The
//! normalizer reduces each token to the characters GitHub permits in a login
//! and drops anything that looks like an email address.
//!
//! Duplicates are kept: a handle listed twice is fetched twice.

use super::identifier::{Identifier, is_identifier_char};

/// Default web host whose profile URLs are recognised.
pub const DEFAULT_WEB_HOST: &str = "github.com";

/// Normalizes raw text into an ordered list of identifiers.
///
/// # Example
///
/// ```
/// use roster::github::normalizer::IdentifierNormalizer;
///
/// let normalizer = IdentifierNormalizer::default();
/// let input = normalizer.normalize("https://github.com/octocat/, @hubot\nme@example.com");
/// let names: Vec<&str> = input.identifiers().iter().map(|id| id.as_str()).collect();
/// assert_eq!(names, ["octocat", "hubot"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierNormalizer {
    host: String,
}

impl IdentifierNormalizer {
    /// Creates a normalizer that strips profile URLs for `host`.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    /// Splits `raw` on commas and whitespace and normalizes every token.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> NormalizedInput {
        let identifiers = raw
            .split(|candidate: char| candidate == ',' || candidate.is_whitespace())
            .filter_map(|token| self.normalize_token(token))
            .collect();
        NormalizedInput { identifiers }
    }

    /// Normalizes a single token, returning `None` when nothing usable
    /// remains.
    #[must_use]
    pub fn normalize_token(&self, token: &str) -> Option<Identifier> {
        let trimmed = token.trim();
        let without_url = self.strip_profile_url(trimmed);
        let without_marker = without_url.strip_prefix('@').unwrap_or(without_url);
        let without_slash = without_marker.strip_suffix('/').unwrap_or(without_marker);

        // Anything still carrying an `@` is treated as an email address.
        if without_slash.contains('@') {
            return None;
        }

        let cleaned: String = without_slash
            .chars()
            .filter(|candidate| is_identifier_char(*candidate))
            .collect();

        Identifier::new(&cleaned).ok()
    }

    fn strip_profile_url<'a>(&self, token: &'a str) -> &'a str {
        let without_scheme = token
            .strip_prefix("https://")
            .or_else(|| token.strip_prefix("http://"))
            .unwrap_or(token);
        let without_www = without_scheme
            .strip_prefix("www.")
            .unwrap_or(without_scheme);

        without_www
            .strip_prefix(self.host.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(token)
    }
}

impl Default for IdentifierNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_WEB_HOST)
    }
}

/// Ordered identifiers produced by [`IdentifierNormalizer::normalize`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedInput {
    identifiers: Vec<Identifier>,
}

impl NormalizedInput {
    /// Identifiers in input order.
    #[must_use]
    pub fn identifiers(&self) -> &[Identifier] {
        &self.identifiers
    }

    /// Consumes the input, returning the identifiers.
    #[must_use]
    pub fn into_identifiers(self) -> Vec<Identifier> {
        self.identifiers
    }

    /// Number of identifiers.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.identifiers.len()
    }

    /// Returns true when no identifier survived normalization.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    /// The canonical form shown back to the user, one handle per line.
    #[must_use]
    pub fn canonical_text(&self) -> String {
        self.identifiers
            .iter()
            .map(Identifier::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
