//! Gateways for loading account statistics through Octocrab.
//!
//! The trait-based design enables mocking in tests while the Octocrab
//! implementation handles real HTTP requests. Every call is conditional: the
//! caller supplies the entity tag it last saw for the target URL, and the
//! gateway reports back the new tag together with the rate limit counters
//! from the response headers.

mod client;
mod error_mapping;
mod http_utils;
mod profile;

pub use profile::OctocrabProfileGateway;

use std::fmt;

use async_trait::async_trait;

use crate::github::error::IntakeError;
use crate::github::identifier::Identifier;
use crate::github::models::{Organization, RepositorySummary, UserProfile};
use crate::github::rate_limit::RateLimitInfo;

/// Opaque cache validation tag (`ETag`) returned by GitHub.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheTag(String);

impl CacheTag {
    /// Wraps a raw `ETag` header value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw header value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CacheTag {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// A GET request that may be revalidated with a cache tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalRequest {
    target: String,
    cache_tag: Option<CacheTag>,
}

impl ConditionalRequest {
    /// Creates a request for an API path or absolute URL.
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            cache_tag: None,
        }
    }

    /// Request for `GET /users/{id}`.
    #[must_use]
    pub fn profile(identifier: &Identifier) -> Self {
        Self::new(identifier.profile_path())
    }

    /// Request for one page of `GET /users/{id}/repos`.
    #[must_use]
    pub fn repository_page(identifier: &Identifier, page: u32, per_page: u8) -> Self {
        Self::new(identifier.repositories_path(page, per_page))
    }

    /// Attaches the last-seen cache tag for this target.
    #[must_use]
    pub fn with_cache_tag(mut self, cache_tag: Option<CacheTag>) -> Self {
        self.cache_tag = cache_tag;
        self
    }

    /// API path or absolute URL being requested.
    #[must_use]
    pub const fn target(&self) -> &str {
        self.target.as_str()
    }

    /// Cache tag sent as `If-None-Match`, if any.
    #[must_use]
    pub const fn cache_tag(&self) -> Option<&CacheTag> {
        self.cache_tag.as_ref()
    }
}

/// How the server answered a conditional request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome<T> {
    /// The server returned a fresh payload.
    Modified(T),
    /// The server answered `304 Not Modified`.
    NotModified,
    /// The server answered with a non-success status.
    Failed {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body, or the status reason.
        message: String,
    },
}

/// Metadata carried by every response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseTelemetry {
    /// New cache tag to echo on the next request to the same URL.
    pub cache_tag: Option<CacheTag>,
    /// Rate limit counters, when the headers were present.
    pub rate_limit: Option<RateLimitInfo>,
}

/// Outcome and telemetry of one conditional request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse<T> {
    /// Decoded outcome.
    pub outcome: FetchOutcome<T>,
    /// Response header telemetry.
    pub telemetry: ResponseTelemetry,
}

impl<T> ApiResponse<T> {
    /// Pairs an outcome with its telemetry.
    #[must_use]
    pub const fn new(outcome: FetchOutcome<T>, telemetry: ResponseTelemetry) -> Self {
        Self { outcome, telemetry }
    }

    /// Converts the payload while keeping status and telemetry.
    #[must_use]
    pub fn map<U>(self, convert: impl FnOnce(T) -> U) -> ApiResponse<U> {
        let outcome = match self.outcome {
            FetchOutcome::Modified(value) => FetchOutcome::Modified(convert(value)),
            FetchOutcome::NotModified => FetchOutcome::NotModified,
            FetchOutcome::Failed { status, message } => FetchOutcome::Failed { status, message },
        };
        ApiResponse {
            outcome,
            telemetry: self.telemetry,
        }
    }
}

/// Gateway that can load account statistics.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileGateway: Send + Sync {
    /// Fetch the public profile for `GET /users/{id}`.
    async fn profile(
        &self,
        request: &ConditionalRequest,
    ) -> Result<ApiResponse<UserProfile>, IntakeError>;

    /// Fetch one page of the account's public repositories.
    async fn repository_page(
        &self,
        request: &ConditionalRequest,
    ) -> Result<ApiResponse<Vec<RepositorySummary>>, IntakeError>;

    /// Fetch the organizations listed at the profile's `organizations_url`.
    async fn organizations(
        &self,
        request: &ConditionalRequest,
    ) -> Result<ApiResponse<Vec<Organization>>, IntakeError>;
}

#[cfg(test)]
mod tests;
