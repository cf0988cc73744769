//! Per-account results produced by the aggregation pipeline.

use std::fmt;

use serde::Serialize;

use crate::github::identifier::Identifier;

/// Organization memberships as shown in a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "names", rename_all = "snake_case")]
pub enum OrganizationsField {
    /// Public organization logins in API order.
    Names(Vec<String>),
    /// The account belongs to no public organization.
    NotApplicable,
    /// The organizations endpoint could not be read.
    FetchFailed,
}

impl fmt::Display for OrganizationsField {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Names(names) => formatter.write_str(&names.join(", ")),
            Self::NotApplicable => formatter.write_str("N/A"),
            Self::FetchFailed => formatter.write_str("fetch failed"),
        }
    }
}

/// Statistics for one successfully processed account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    /// Identifier the record was requested for.
    pub identifier: Identifier,
    /// Display name.
    pub name: Option<String>,
    /// Profile biography.
    pub bio: Option<String>,
    /// Public repository count from the profile.
    pub public_repos: u32,
    /// Sum of stargazers across the listed repositories.
    pub total_stars: u64,
    /// Sum of forks across the listed repositories.
    pub total_forks: u64,
    /// Follower count.
    pub followers: u32,
    /// Company field.
    pub company: Option<String>,
    /// Organization memberships.
    pub organizations: OrganizationsField,
}

/// Why no record could be produced for an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// The profile request failed or returned an unusable payload.
    ProfileFetchFailed {
        /// HTTP status, when the server answered at all.
        status: Option<u16>,
        /// Failure detail.
        message: String,
    },
    /// GitHub refused the profile request because the quota is spent.
    RateLimited {
        /// Failure detail.
        message: String,
    },
    /// The request never completed.
    NetworkFault {
        /// Transport error detail.
        message: String,
    },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProfileFetchFailed { message, .. }
            | Self::RateLimited { message }
            | Self::NetworkFault { message } => formatter.write_str(message),
        }
    }
}

/// An account for which no record was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureEntry {
    /// The account.
    pub identifier: Identifier,
    /// What went wrong.
    pub reason: FailureReason,
}

impl FailureEntry {
    /// Pairs an identifier with a failure reason.
    #[must_use]
    pub const fn new(identifier: Identifier, reason: FailureReason) -> Self {
        Self { identifier, reason }
    }
}

/// Running star and fork sums across repository pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RepositoryTotals {
    pub(crate) stars: u64,
    pub(crate) forks: u64,
}

impl RepositoryTotals {
    pub(crate) fn add_page(&mut self, page: &[crate::github::models::RepositorySummary]) {
        for repository in page {
            self.stars = self.stars.saturating_add(repository.stars);
            self.forks = self.forks.saturating_add(repository.forks);
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{OrganizationsField, RepositoryTotals};
    use crate::github::models::RepositorySummary;

    #[rstest]
    #[case::names(
        OrganizationsField::Names(vec!["github".to_owned(), "rust-lang".to_owned()]),
        "github, rust-lang"
    )]
    #[case::not_applicable(OrganizationsField::NotApplicable, "N/A")]
    #[case::failed(OrganizationsField::FetchFailed, "fetch failed")]
    fn organizations_render_for_display(#[case] field: OrganizationsField, #[case] expected: &str) {
        assert_eq!(field.to_string(), expected);
    }

    #[test]
    fn totals_saturate_instead_of_overflowing() {
        let mut totals = RepositoryTotals {
            stars: u64::MAX - 1,
            forks: 0,
        };
        totals.add_page(&[
            RepositorySummary { stars: 5, forks: 1 },
            RepositorySummary { stars: 5, forks: 2 },
        ]);
        assert_eq!(totals.stars, u64::MAX);
        assert_eq!(totals.forks, 3);
    }
}
