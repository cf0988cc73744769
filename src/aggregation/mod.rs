//! Sequential multi-endpoint aggregation of account statistics.
//!
//! [`AggregationPipeline`] consumes an ordered list of identifiers, drives a
//! [`ProfileGateway`](crate::github::ProfileGateway) through the profile,
//! repository and organization endpoints for each one, and reports records,
//! failures and progress to a [`RunSink`]. Run-scoped state lives in a
//! [`FetchSession`] that is passed in and handed back.

pub mod pipeline;
pub mod record;
pub mod session;
pub mod sink;
pub mod supervisor;

pub use pipeline::{
    AggregationPipeline, CompletedRun, DEFAULT_RATE_LIMIT_THRESHOLD, DEFAULT_REQUEST_DELAY,
    FetchState, PipelineSettings,
};
pub use record::{FailureEntry, FailureReason, OrganizationsField, UserRecord};
pub use session::{CachedPayload, ConditionalCache, FetchSession};
pub use sink::{JsonlRunSink, NoopRunSink, Progress, RunEvent, RunOutcome, RunReport, RunSink};
pub use supervisor::{RunSupervisor, RunTicket};
