//! Roster library crate collecting public GitHub profile statistics.
//!
//! The library normalizes pasted account lists, wraps Octocrab to issue
//! conditional requests against the profile, repository and organization
//! endpoints, and aggregates the results one account at a time while
//! watching the API rate limit. Progress, records and failures are reported
//! to a caller-supplied sink so that any front end can render them as they
//! arrive.

pub mod aggregation;
pub mod config;
pub mod github;
pub mod input;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use aggregation::{
    AggregationPipeline, CompletedRun, FailureEntry, FailureReason, FetchSession,
    JsonlRunSink, NoopRunSink, OrganizationsField, PipelineSettings, Progress, RunOutcome,
    RunReport, RunSink, RunSupervisor, RunTicket, UserRecord,
};
pub use config::{InputSource, RosterConfig};
pub use input::read_input;
pub use github::{
    Identifier, IdentifierNormalizer, IntakeError, NormalizedInput, OctocrabProfileGateway,
    PersonalAccessToken, ProfileGateway, RateLimitInfo,
};
