//! Sequential aggregation of account statistics.
//!
//! Identifiers are processed one at a time. For each one the pipeline loads
//! the profile, walks the repository pages to sum stars and forks, and then
//! loads the organization list. A fixed delay separates identifiers, and the
//! run stops early once the remaining rate limit quota drops below the
//! configured threshold.

use std::fmt;
use std::time::Duration;

use crate::github::error::IntakeError;
use crate::github::gateway::{ApiResponse, ConditionalRequest, FetchOutcome, ProfileGateway};
use crate::github::identifier::Identifier;
use crate::github::models::{Organization, UserProfile};
use crate::github::pagination::{MAX_PER_PAGE, PagePlan, validate_per_page};
use crate::github::rate_limit::RateLimitInfo;

use super::record::{
    FailureEntry, FailureReason, OrganizationsField, RepositoryTotals, UserRecord,
};
use super::session::FetchSession;
use super::sink::{Progress, RunOutcome, RunReport, RunSink};
use super::supervisor::RunTicket;

/// Pause inserted between identifiers unless configured otherwise.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(1);

/// Remaining-quota level below which a run stops.
pub const DEFAULT_RATE_LIMIT_THRESHOLD: u32 = 10;

/// Tunables for one pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Pause between consecutive identifiers.
    pub request_delay: Duration,
    /// The run stops once the profile response reports fewer remaining calls.
    pub rate_limit_threshold: u32,
    /// Repository page size, `1..=100`.
    pub per_page: u8,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            request_delay: DEFAULT_REQUEST_DELAY,
            rate_limit_threshold: DEFAULT_RATE_LIMIT_THRESHOLD,
            per_page: MAX_PER_PAGE,
        }
    }
}

/// Where the pipeline is within one identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    /// Waiting on `GET /users/{id}`.
    FetchingProfile,
    /// Waiting on a repository page.
    FetchingRepositoryPage {
        /// 1-based page number.
        page: u32,
    },
    /// Waiting on the organization list.
    FetchingOrganizations,
    /// A record was produced.
    Done,
    /// The identifier failed.
    Failed,
}

impl fmt::Display for FetchState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchingProfile => formatter.write_str("fetching profile"),
            Self::FetchingRepositoryPage { page } => {
                write!(formatter, "fetching repository page {page}")
            }
            Self::FetchingOrganizations => formatter.write_str("fetching organizations"),
            Self::Done => formatter.write_str("done"),
            Self::Failed => formatter.write_str("failed"),
        }
    }
}

/// Session and report handed back when a run ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedRun {
    /// The session passed into the run, now holding its results.
    pub session: FetchSession,
    /// Summary of the run.
    pub report: RunReport,
}

/// Result of processing a single identifier.
struct IdentifierOutcome {
    result: Result<UserRecord, FailureReason>,
    profile_rate_limit: Option<RateLimitInfo>,
}

/// Drives a [`ProfileGateway`] over an ordered list of identifiers.
pub struct AggregationPipeline<'client, Gateway>
where
    Gateway: ProfileGateway,
{
    client: &'client Gateway,
    settings: PipelineSettings,
}

impl<'client, Gateway> AggregationPipeline<'client, Gateway>
where
    Gateway: ProfileGateway,
{
    /// Creates a pipeline over the provided gateway.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::InvalidPagination`] when the configured page
    /// size is outside `1..=100`.
    pub fn new(client: &'client Gateway, settings: PipelineSettings) -> Result<Self, IntakeError> {
        validate_per_page(settings.per_page)?;
        Ok(Self { client, settings })
    }

    /// Returns the active settings.
    #[must_use]
    pub const fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Processes `identifiers` in order and returns the session.
    ///
    /// The session is reset for this run. Records, failures and progress are
    /// reported to `sink` as they happen, followed by one run report. When
    /// `ticket` is superseded the run stops quietly: the identifier in flight
    /// is discarded and no further records or progress are emitted.
    pub async fn run(
        &self,
        identifiers: &[Identifier],
        mut session: FetchSession,
        sink: &dyn RunSink,
        ticket: &RunTicket,
    ) -> CompletedRun {
        session.begin(identifiers.len());
        tracing::info!(total = identifiers.len(), "aggregation run started");

        let mut outcome = RunOutcome::Completed;
        for (index, identifier) in identifiers.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.settings.request_delay).await;
            }
            if !ticket.is_current() {
                outcome = superseded(&session);
                break;
            }

            let processed = self.process(identifier, &mut session).await;
            if !ticket.is_current() {
                outcome = superseded(&session);
                break;
            }

            match processed.result {
                Ok(record) => {
                    sink.on_record(&record);
                    session.record_success(record);
                }
                Err(reason) => {
                    let failure = FailureEntry::new(identifier.clone(), reason);
                    sink.on_failure(&failure);
                    session.record_failure(failure);
                }
            }
            sink.on_progress(Progress::new(session.completed(), session.total()));

            if let Some(rate_limit) = processed.profile_rate_limit
                && rate_limit.is_below(self.settings.rate_limit_threshold)
            {
                let skipped = session.total().saturating_sub(session.completed());
                tracing::warn!(
                    remaining = rate_limit.remaining(),
                    threshold = self.settings.rate_limit_threshold,
                    skipped,
                    resets_at = %rate_limit.reset_display(),
                    "rate limit approaching, stopping run"
                );
                outcome = RunOutcome::RateLimited {
                    rate_limit,
                    skipped,
                };
                break;
            }
        }

        let report = RunReport {
            total: session.total(),
            completed: session.completed(),
            successes: session.records().len(),
            failures: session.failures().len(),
            outcome,
        };
        tracing::info!(
            completed = report.completed,
            successes = report.successes,
            failures = report.failures,
            "aggregation run finished"
        );
        sink.on_run_complete(&report, session.failures());

        CompletedRun { session, report }
    }

    async fn process(
        &self,
        identifier: &Identifier,
        session: &mut FetchSession,
    ) -> IdentifierOutcome {
        trace_state(identifier, FetchState::FetchingProfile);
        let plain = ConditionalRequest::profile(identifier);
        let cache_tag = session.cache().profile_tag(plain.target());
        let request = plain.with_cache_tag(cache_tag);
        let response = self.client.profile(&request).await;

        let profile_rate_limit = response
            .as_ref()
            .ok()
            .and_then(|answered| answered.telemetry.rate_limit);
        session.observe_rate_limit(profile_rate_limit);

        let result = match resolve_profile(&request, response, session) {
            Ok(profile) => Ok(self.build_record(identifier, profile, session).await),
            Err(reason) => {
                trace_state(identifier, FetchState::Failed);
                tracing::warn!(
                    identifier = %identifier,
                    reason = %reason,
                    "profile fetch failed"
                );
                Err(reason)
            }
        };

        IdentifierOutcome {
            result,
            profile_rate_limit,
        }
    }

    async fn build_record(
        &self,
        identifier: &Identifier,
        profile: UserProfile,
        session: &mut FetchSession,
    ) -> UserRecord {
        let totals = self
            .sum_repositories(identifier, profile.public_repos, session)
            .await;
        let organizations = self.load_organizations(identifier, &profile, session).await;
        trace_state(identifier, FetchState::Done);

        UserRecord {
            identifier: identifier.clone(),
            name: profile.name,
            bio: profile.bio,
            public_repos: profile.public_repos,
            total_stars: totals.stars,
            total_forks: totals.forks,
            followers: profile.followers,
            company: profile.company,
            organizations,
        }
    }

    async fn sum_repositories(
        &self,
        identifier: &Identifier,
        public_repos: u32,
        session: &mut FetchSession,
    ) -> RepositoryTotals {
        let mut totals = RepositoryTotals::default();
        let plan = match PagePlan::for_repository_count(public_repos, self.settings.per_page) {
            Ok(plan) => plan,
            Err(error) => {
                tracing::warn!(
                    identifier = %identifier,
                    error = %error,
                    "repository pages skipped"
                );
                return totals;
            }
        };

        for page in plan.pages() {
            trace_state(identifier, FetchState::FetchingRepositoryPage { page });
            let plain = ConditionalRequest::repository_page(identifier, page, plan.per_page());
            let cache_tag = session.cache().repository_page_tag(plain.target());
            let request = plain.with_cache_tag(cache_tag);

            let response = match self.client.repository_page(&request).await {
                Ok(response) => response,
                Err(error) => {
                    tracing::warn!(
                        identifier = %identifier,
                        page,
                        error = %error,
                        "repository page failed"
                    );
                    break;
                }
            };
            session.observe_rate_limit(response.telemetry.rate_limit);
            session
                .cache_mut()
                .store_repository_page_tag(request.target(), response.telemetry.cache_tag);

            match response.outcome {
                FetchOutcome::Modified(repositories) => totals.add_page(&repositories),
                FetchOutcome::NotModified => {
                    tracing::debug!(identifier = %identifier, page, "repository page not modified");
                    break;
                }
                FetchOutcome::Failed { status, message } => {
                    tracing::warn!(
                        identifier = %identifier,
                        page,
                        status,
                        detail = %message,
                        "repository page failed"
                    );
                    break;
                }
            }
        }

        totals
    }

    async fn load_organizations(
        &self,
        identifier: &Identifier,
        profile: &UserProfile,
        session: &mut FetchSession,
    ) -> OrganizationsField {
        trace_state(identifier, FetchState::FetchingOrganizations);
        let target = profile
            .organizations_url
            .clone()
            .unwrap_or_else(|| identifier.organizations_path());
        let cache_tag = session.cache().organizations_tag(&target);
        let request = ConditionalRequest::new(target).with_cache_tag(cache_tag);

        let response = match self.client.organizations(&request).await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(
                    identifier = %identifier,
                    error = %error,
                    "organizations fetch failed"
                );
                return OrganizationsField::FetchFailed;
            }
        };
        session.observe_rate_limit(response.telemetry.rate_limit);

        let organizations: Vec<Organization> = match response.outcome {
            FetchOutcome::Modified(organizations) => {
                session.cache_mut().store_organizations(
                    request.target(),
                    response.telemetry.cache_tag,
                    &organizations,
                );
                organizations
            }
            FetchOutcome::NotModified => {
                let Some(cached) = session.cache().organizations(request.target()) else {
                    tracing::warn!(
                        identifier = %identifier,
                        "organizations not modified but not cached"
                    );
                    return OrganizationsField::FetchFailed;
                };
                cached.to_vec()
            }
            FetchOutcome::Failed { status, message } => {
                tracing::warn!(
                    identifier = %identifier,
                    status,
                    detail = %message,
                    "organizations fetch failed"
                );
                return OrganizationsField::FetchFailed;
            }
        };

        if organizations.is_empty() {
            OrganizationsField::NotApplicable
        } else {
            OrganizationsField::Names(
                organizations
                    .into_iter()
                    .map(|organization| organization.login)
                    .collect(),
            )
        }
    }
}

/// Turns the profile response into a usable profile or a failure reason.
fn resolve_profile(
    request: &ConditionalRequest,
    response: Result<ApiResponse<UserProfile>, IntakeError>,
    session: &mut FetchSession,
) -> Result<UserProfile, FailureReason> {
    let answered = response.map_err(|error| match error {
        IntakeError::Network { message } => FailureReason::NetworkFault { message },
        other => FailureReason::ProfileFetchFailed {
            status: None,
            message: other.to_string(),
        },
    })?;

    match answered.outcome {
        FetchOutcome::Modified(profile) => {
            session.cache_mut().store_profile(
                request.target(),
                answered.telemetry.cache_tag,
                &profile,
            );
            Ok(profile)
        }
        FetchOutcome::NotModified => session
            .cache()
            .profile(request.target())
            .cloned()
            .ok_or_else(|| FailureReason::ProfileFetchFailed {
                status: Some(304),
                message: "profile reported not modified but no cached copy exists".to_owned(),
            }),
        FetchOutcome::Failed { status, message } => {
            let exhausted = answered
                .telemetry
                .rate_limit
                .is_some_and(|info| info.is_exhausted());
            if exhausted && matches!(status, 403 | 429) {
                Err(FailureReason::RateLimited { message })
            } else {
                Err(FailureReason::ProfileFetchFailed {
                    status: Some(status),
                    message,
                })
            }
        }
    }
}

fn superseded(session: &FetchSession) -> RunOutcome {
    let skipped = session.total().saturating_sub(session.completed());
    tracing::info!(skipped, "aggregation run superseded");
    RunOutcome::Superseded { skipped }
}

fn trace_state(identifier: &Identifier, state: FetchState) {
    tracing::debug!(identifier = %identifier, state = %state, "pipeline state");
}
