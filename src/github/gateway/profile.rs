//! Octocrab implementation of the profile gateway.
//!
//! Requests go through Octocrab's raw `_get_with_headers` so that the status
//! code, `ETag` and rate limit headers stay visible; the typed helpers would
//! hide a `304` behind an error.

use async_trait::async_trait;
use http::header::ETAG;
use http::{StatusCode, Uri};
use octocrab::Octocrab;
use serde::de::DeserializeOwned;

use crate::github::error::IntakeError;
use crate::github::identifier::PersonalAccessToken;
use crate::github::models::{
    ApiOrganization, ApiRepository, ApiUser, Organization, RepositorySummary, UserProfile,
};
use crate::github::rate_limit::RateLimitInfo;

use super::client::build_octocrab_client;
use super::error_mapping::{describe_http_failure, map_octocrab_error};
use super::http_utils::{build_conditional_headers, extract_github_message, header_to_string};
use super::{
    ApiResponse, CacheTag, ConditionalRequest, FetchOutcome, ProfileGateway, ResponseTelemetry,
};

/// Octocrab-backed profile gateway.
pub struct OctocrabProfileGateway {
    client: Octocrab,
}

impl OctocrabProfileGateway {
    /// Creates a new gateway from an Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Builds an Octocrab client for the given token and API base URL.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::InvalidUrl` when the base URI cannot be parsed or
    /// `IntakeError::Api` when Octocrab fails to construct a client.
    pub fn for_token(token: &PersonalAccessToken, api_base: &str) -> Result<Self, IntakeError> {
        let octocrab = build_octocrab_client(token, api_base)?;
        Ok(Self::new(octocrab))
    }

    async fn fetch<Payload>(
        &self,
        operation: &str,
        request: &ConditionalRequest,
    ) -> Result<ApiResponse<Payload>, IntakeError>
    where
        Payload: DeserializeOwned,
    {
        let headers = build_conditional_headers(request.cache_tag());
        let uri: Uri = request
            .target()
            .parse::<Uri>()
            .map_err(|error| IntakeError::InvalidUrl(error.to_string()))?;

        tracing::debug!(
            url = request.target(),
            conditional = request.cache_tag().is_some(),
            "requesting {operation}"
        );

        let response = self
            .client
            ._get_with_headers(uri, headers)
            .await
            .map_err(|error| map_octocrab_error(operation, &error))?;

        let telemetry = ResponseTelemetry {
            cache_tag: header_to_string(response.headers().get(ETAG)).map(CacheTag::new),
            rate_limit: RateLimitInfo::from_headers(response.headers()),
        };

        let status = response.status();
        let outcome = match status {
            StatusCode::NOT_MODIFIED => FetchOutcome::NotModified,
            success if success.is_success() => {
                let body = self
                    .client
                    .body_to_string(response)
                    .await
                    .map_err(|error| IntakeError::Network {
                        message: format!("{operation} response decode failed: {error}"),
                    })?;

                let payload: Payload =
                    serde_json::from_str(&body).map_err(|error| IntakeError::Api {
                        message: format!("{operation} response deserialisation failed: {error}"),
                    })?;

                FetchOutcome::Modified(payload)
            }
            failure => {
                let body = self
                    .client
                    .body_to_string(response)
                    .await
                    .unwrap_or_else(|_| String::new());

                FetchOutcome::Failed {
                    status: failure.as_u16(),
                    message: describe_http_failure(
                        operation,
                        failure,
                        extract_github_message(&body),
                    ),
                }
            }
        };

        tracing::debug!(
            url = request.target(),
            status = status.as_u16(),
            remaining = ?telemetry.rate_limit.map(|info| info.remaining()),
            "{operation} answered"
        );

        Ok(ApiResponse::new(outcome, telemetry))
    }
}

#[async_trait]
impl ProfileGateway for OctocrabProfileGateway {
    async fn profile(
        &self,
        request: &ConditionalRequest,
    ) -> Result<ApiResponse<UserProfile>, IntakeError> {
        let response = self.fetch::<ApiUser>("profile", request).await?;
        Ok(response.map(UserProfile::from))
    }

    async fn repository_page(
        &self,
        request: &ConditionalRequest,
    ) -> Result<ApiResponse<Vec<RepositorySummary>>, IntakeError> {
        let response = self
            .fetch::<Vec<ApiRepository>>("repositories", request)
            .await?;
        Ok(response.map(|repositories| {
            repositories
                .into_iter()
                .map(RepositorySummary::from)
                .collect()
        }))
    }

    async fn organizations(
        &self,
        request: &ConditionalRequest,
    ) -> Result<ApiResponse<Vec<Organization>>, IntakeError> {
        let response = self
            .fetch::<Vec<ApiOrganization>>("organizations", request)
            .await?;
        Ok(response.map(|organizations| {
            organizations
                .into_iter()
                .map(Organization::from)
                .collect()
        }))
    }
}
