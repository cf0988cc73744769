//! Run-scoped state carried through the aggregation pipeline.
//!
//! A [`FetchSession`] is created by the caller, handed to the pipeline, and
//! handed back when the run ends. It holds the progress counters, the ordered
//! records and failures, and the conditional-request cache that lets repeated
//! requests to the same URL be revalidated with `If-None-Match`.

use std::collections::HashMap;

use crate::github::gateway::CacheTag;
use crate::github::models::{Organization, UserProfile};
use crate::github::rate_limit::RateLimitInfo;

use super::record::{FailureEntry, UserRecord};

/// A payload stored together with the tag that validates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPayload<T> {
    /// Tag returned alongside the payload.
    pub tag: CacheTag,
    /// The payload itself.
    pub value: T,
}

/// Conditional-request cache keyed by request target.
///
/// Profile and organization responses keep their payload so that a
/// `304 Not Modified` can be answered locally. Repository pages keep only the
/// tag; a `304` on a page ends pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionalCache {
    profiles: HashMap<String, CachedPayload<UserProfile>>,
    organizations: HashMap<String, CachedPayload<Vec<Organization>>>,
    repository_pages: HashMap<String, CacheTag>,
}

impl ConditionalCache {
    /// Tag to send for a profile request, if a payload is cached.
    #[must_use]
    pub fn profile_tag(&self, target: &str) -> Option<CacheTag> {
        self.profiles.get(target).map(|cached| cached.tag.clone())
    }

    /// Cached profile payload for a target.
    #[must_use]
    pub fn profile(&self, target: &str) -> Option<&UserProfile> {
        self.profiles.get(target).map(|cached| &cached.value)
    }

    /// Stores a fresh profile. Responses without a tag evict any stale entry.
    pub fn store_profile(&mut self, target: &str, tag: Option<CacheTag>, value: &UserProfile) {
        match tag {
            Some(tag) => {
                self.profiles.insert(
                    target.to_owned(),
                    CachedPayload {
                        tag,
                        value: value.clone(),
                    },
                );
            }
            None => {
                self.profiles.remove(target);
            }
        }
    }

    /// Tag to send for an organizations request, if a payload is cached.
    #[must_use]
    pub fn organizations_tag(&self, target: &str) -> Option<CacheTag> {
        self.organizations
            .get(target)
            .map(|cached| cached.tag.clone())
    }

    /// Cached organizations payload for a target.
    #[must_use]
    pub fn organizations(&self, target: &str) -> Option<&[Organization]> {
        self.organizations
            .get(target)
            .map(|cached| cached.value.as_slice())
    }

    /// Stores a fresh organization list.
    pub fn store_organizations(
        &mut self,
        target: &str,
        tag: Option<CacheTag>,
        value: &[Organization],
    ) {
        match tag {
            Some(tag) => {
                self.organizations.insert(
                    target.to_owned(),
                    CachedPayload {
                        tag,
                        value: value.to_vec(),
                    },
                );
            }
            None => {
                self.organizations.remove(target);
            }
        }
    }

    /// Last tag seen for a repository page.
    #[must_use]
    pub fn repository_page_tag(&self, target: &str) -> Option<CacheTag> {
        self.repository_pages.get(target).cloned()
    }

    /// Remembers the tag returned for a repository page.
    pub fn store_repository_page_tag(&mut self, target: &str, tag: Option<CacheTag>) {
        if let Some(tag) = tag {
            self.repository_pages.insert(target.to_owned(), tag);
        }
    }

    /// Number of targets with a stored tag.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles
            .len()
            .saturating_add(self.organizations.len())
            .saturating_add(self.repository_pages.len())
    }

    /// Returns true when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Mutable state for exactly one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSession {
    total: usize,
    completed: usize,
    records: Vec<UserRecord>,
    failures: Vec<FailureEntry>,
    last_rate_limit: Option<RateLimitInfo>,
    cache: ConditionalCache,
}

impl FetchSession {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets every counter and collection for a run over `total` identifiers.
    ///
    /// The conditional cache is cleared as well; tags never outlive the run
    /// that observed them.
    pub fn begin(&mut self, total: usize) {
        *self = Self {
            total,
            ..Self::default()
        };
    }

    /// Number of identifiers in the run.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Number of identifiers whose outcome has been recorded.
    #[must_use]
    pub const fn completed(&self) -> usize {
        self.completed
    }

    /// Records produced so far, in processing order.
    #[must_use]
    pub fn records(&self) -> &[UserRecord] {
        &self.records
    }

    /// Failures collected so far, in processing order.
    #[must_use]
    pub fn failures(&self) -> &[FailureEntry] {
        &self.failures
    }

    /// The most recent rate limit counters.
    #[must_use]
    pub const fn last_rate_limit(&self) -> Option<RateLimitInfo> {
        self.last_rate_limit
    }

    /// Read access to the conditional cache.
    #[must_use]
    pub const fn cache(&self) -> &ConditionalCache {
        &self.cache
    }

    pub(crate) const fn cache_mut(&mut self) -> &mut ConditionalCache {
        &mut self.cache
    }

    pub(crate) fn record_success(&mut self, record: UserRecord) {
        self.records.push(record);
        self.completed = self.completed.saturating_add(1);
    }

    pub(crate) fn record_failure(&mut self, failure: FailureEntry) {
        self.failures.push(failure);
        self.completed = self.completed.saturating_add(1);
    }

    pub(crate) const fn observe_rate_limit(&mut self, rate_limit: Option<RateLimitInfo>) {
        if rate_limit.is_some() {
            self.last_rate_limit = rate_limit;
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::{ConditionalCache, FetchSession};
    use crate::aggregation::record::{FailureEntry, FailureReason};
    use crate::github::gateway::CacheTag;
    use crate::github::identifier::Identifier;
    use crate::github::models::UserProfile;
    use crate::github::rate_limit::RateLimitInfo;

    #[fixture]
    fn profile() -> UserProfile {
        UserProfile {
            login: "octocat".to_owned(),
            name: None,
            bio: None,
            company: None,
            public_repos: 0,
            followers: 0,
            organizations_url: None,
        }
    }

    #[rstest]
    fn profile_payload_is_kept_with_its_tag(profile: UserProfile) {
        let mut cache = ConditionalCache::default();
        cache.store_profile("/users/octocat", Some(CacheTag::new("\"v1\"")), &profile);

        assert_eq!(
            cache.profile_tag("/users/octocat"),
            Some(CacheTag::new("\"v1\""))
        );
        assert_eq!(cache.profile("/users/octocat"), Some(&profile));
    }

    #[rstest]
    fn untagged_profile_evicts_stale_entry(profile: UserProfile) {
        let mut cache = ConditionalCache::default();
        cache.store_profile("/users/octocat", Some(CacheTag::new("\"v1\"")), &profile);
        cache.store_profile("/users/octocat", None, &profile);

        assert!(cache.profile_tag("/users/octocat").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn begin_resets_counters_and_cache() {
        let mut session = FetchSession::new();
        session.begin(2);
        session.record_failure(FailureEntry::new(
            Identifier::new("ghost").expect("identifier should be valid"),
            FailureReason::NetworkFault {
                message: "connection reset".to_owned(),
            },
        ));
        session.cache_mut().store_repository_page_tag(
            "/users/ghost/repos?page=1&per_page=100",
            Some(CacheTag::new("t")),
        );
        session.observe_rate_limit(Some(RateLimitInfo::new(60, 59, 0)));

        session.begin(3);

        assert_eq!(session.total(), 3);
        assert_eq!(session.completed(), 0);
        assert!(session.failures().is_empty());
        assert!(session.cache().is_empty());
        assert!(session.last_rate_limit().is_none());
    }

    #[test]
    fn missing_headers_do_not_forget_last_rate_limit() {
        let mut session = FetchSession::new();
        session.observe_rate_limit(Some(RateLimitInfo::new(60, 12, 0)));
        session.observe_rate_limit(None);

        assert_eq!(
            session.last_rate_limit().map(|info| info.remaining()),
            Some(12)
        );
    }
}
