//! Data models for the profile, repository and organization endpoints.

use serde::{Deserialize, Serialize};

/// Public profile fields used to build a user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Login as reported by GitHub.
    pub login: String,
    /// Display name.
    pub name: Option<String>,
    /// Profile biography.
    pub bio: Option<String>,
    /// Company field.
    pub company: Option<String>,
    /// Number of public repositories.
    pub public_repos: u32,
    /// Number of followers.
    pub followers: u32,
    /// URL listing the user's public organization memberships.
    pub organizations_url: Option<String>,
}

/// Star and fork counts for one repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepositorySummary {
    /// Stargazer count.
    pub stars: u64,
    /// Fork count.
    pub forks: u64,
}

/// Organization membership entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Organization login.
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiUser {
    pub(crate) login: String,
    pub(crate) name: Option<String>,
    pub(crate) bio: Option<String>,
    pub(crate) company: Option<String>,
    #[serde(default)]
    pub(crate) public_repos: u32,
    #[serde(default)]
    pub(crate) followers: u32,
    pub(crate) organizations_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiRepository {
    #[serde(default)]
    pub(crate) stargazers_count: u64,
    #[serde(default)]
    pub(crate) forks_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiOrganization {
    pub(crate) login: String,
}

impl From<ApiUser> for UserProfile {
    fn from(value: ApiUser) -> Self {
        Self {
            login: value.login,
            name: value.name,
            bio: value.bio,
            company: value.company,
            public_repos: value.public_repos,
            followers: value.followers,
            organizations_url: value.organizations_url,
        }
    }
}

impl From<ApiRepository> for RepositorySummary {
    fn from(value: ApiRepository) -> Self {
        Self {
            stars: value.stargazers_count,
            forks: value.forks_count,
        }
    }
}

impl From<ApiOrganization> for Organization {
    fn from(value: ApiOrganization) -> Self {
        Self { login: value.login }
    }
}
