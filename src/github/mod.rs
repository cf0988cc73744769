//! GitHub account intake: input normalization and the REST gateway.
//!
//! This module turns pasted text into account identifiers and wraps Octocrab
//! to issue conditional requests against the profile, repository and
//! organization endpoints. Errors are mapped into user-friendly variants so
//! that callers can surface precise failures without exposing Octocrab
//! internals.

pub mod error;
pub mod gateway;
pub mod identifier;
pub mod models;
pub mod normalizer;
pub mod pagination;
pub mod rate_limit;

pub use error::IntakeError;
pub use gateway::{
    ApiResponse, CacheTag, ConditionalRequest, FetchOutcome, OctocrabProfileGateway,
    ProfileGateway, ResponseTelemetry,
};
pub use identifier::{Identifier, PersonalAccessToken};
pub use models::{Organization, RepositorySummary, UserProfile};
pub use normalizer::{IdentifierNormalizer, NormalizedInput};
pub use pagination::PagePlan;
pub use rate_limit::RateLimitInfo;

#[cfg(test)]
pub use gateway::MockProfileGateway;
