//! Tests for the Octocrab profile gateway.

use rstest::rstest;
use wiremock::matchers::{header, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{
    CacheTag, ConditionalRequest, FetchOutcome, OctocrabProfileGateway, ProfileGateway,
};
use crate::github::error::IntakeError;
use crate::github::identifier::{Identifier, PersonalAccessToken};
use crate::github::models::{Organization, RepositorySummary};

fn octocat() -> Identifier {
    Identifier::new("octocat").expect("identifier should be valid")
}

fn gateway_for(server: &MockServer) -> OctocrabProfileGateway {
    let token = PersonalAccessToken::new("valid-token").expect("token should be valid");
    OctocrabProfileGateway::for_token(&token, &server.uri()).expect("should create gateway")
}

#[tokio::test]
async fn profile_sends_token_and_reads_telemetry() {
    let server = MockServer::start().await;
    let gateway = gateway_for(&server);

    let response = ResponseTemplate::new(200)
        .set_body_json(serde_json::json!({
            "login": "octocat",
            "name": "The Octocat",
            "company": "@github",
            "bio": "Mascot",
            "public_repos": 8,
            "followers": 42,
            "organizations_url": format!("{}/users/octocat/orgs", server.uri())
        }))
        .insert_header("ETag", "\"profile-v1\"")
        .insert_header("X-RateLimit-Limit", "5000")
        .insert_header("X-RateLimit-Remaining", "4999")
        .insert_header("X-RateLimit-Reset", "1700000000");

    Mock::given(method("GET"))
        .and(path("/users/octocat"))
        .and(header_regex("authorization", "valid-token$"))
        .respond_with(response)
        .expect(1)
        .mount(&server)
        .await;

    let result = gateway
        .profile(&ConditionalRequest::profile(&octocat()))
        .await
        .expect("request should succeed");

    let FetchOutcome::Modified(profile) = result.outcome else {
        panic!("expected a fresh profile, got {:?}", result.outcome);
    };
    assert_eq!(profile.login, "octocat");
    assert_eq!(profile.name.as_deref(), Some("The Octocat"));
    assert_eq!(profile.public_repos, 8);
    assert_eq!(profile.followers, 42);
    assert_eq!(
        result.telemetry.cache_tag,
        Some(CacheTag::new("\"profile-v1\""))
    );
    let rate_limit = result
        .telemetry
        .rate_limit
        .expect("rate limit headers should be parsed");
    assert_eq!(rate_limit.remaining(), 4999);
    assert_eq!(rate_limit.limit(), 5000);
}

#[tokio::test]
async fn conditional_request_reports_not_modified() {
    let server = MockServer::start().await;
    let gateway = gateway_for(&server);

    Mock::given(method("GET"))
        .and(path("/users/octocat/repos"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "100"))
        .and(header("if-none-match", "\"repos-v1\""))
        .respond_with(
            ResponseTemplate::new(304)
                .insert_header("ETag", "\"repos-v1\"")
                .insert_header("X-RateLimit-Remaining", "4998"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = ConditionalRequest::repository_page(&octocat(), 1, 100)
        .with_cache_tag(Some(CacheTag::new("\"repos-v1\"")));
    let result = gateway
        .repository_page(&request)
        .await
        .expect("request should succeed");

    assert_eq!(result.outcome, FetchOutcome::NotModified);
    assert_eq!(
        result.telemetry.rate_limit.map(|info| info.remaining()),
        Some(4998)
    );
}

#[tokio::test]
async fn repository_page_decodes_star_and_fork_counts() {
    let server = MockServer::start().await;
    let gateway = gateway_for(&server);

    Mock::given(method("GET"))
        .and(path("/users/octocat/repos"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "name": "one", "stargazers_count": 10, "forks_count": 2 },
            { "name": "two", "stargazers_count": 5, "forks_count": 0 }
        ])))
        .mount(&server)
        .await;

    let result = gateway
        .repository_page(&ConditionalRequest::repository_page(&octocat(), 2, 50))
        .await
        .expect("request should succeed");

    assert_eq!(
        result.outcome,
        FetchOutcome::Modified(vec![
            RepositorySummary { stars: 10, forks: 2 },
            RepositorySummary { stars: 5, forks: 0 },
        ])
    );
    assert!(result.telemetry.cache_tag.is_none());
    assert!(result.telemetry.rate_limit.is_none());
}

#[tokio::test]
async fn organizations_follow_absolute_url_from_profile() {
    let server = MockServer::start().await;
    let gateway = gateway_for(&server);

    Mock::given(method("GET"))
        .and(path("/users/octocat/orgs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "login": "github", "id": 1 },
            { "login": "octo-org", "id": 2 }
        ])))
        .mount(&server)
        .await;

    let request = ConditionalRequest::new(format!("{}/users/octocat/orgs", server.uri()));
    let result = gateway
        .organizations(&request)
        .await
        .expect("request should succeed");

    assert_eq!(
        result.outcome,
        FetchOutcome::Modified(vec![
            Organization {
                login: "github".to_owned()
            },
            Organization {
                login: "octo-org".to_owned()
            },
        ])
    );
}

#[rstest]
#[case::not_found(404, "Not Found")]
#[case::forbidden(403, "API rate limit exceeded for user")]
#[tokio::test]
async fn non_success_status_is_reported_as_failure(#[case] status: u16, #[case] message: &str) {
    let server = MockServer::start().await;
    let gateway = gateway_for(&server);

    Mock::given(method("GET"))
        .and(path("/users/octocat"))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_json(serde_json::json!({ "message": message }))
                .insert_header("X-RateLimit-Remaining", "0"),
        )
        .mount(&server)
        .await;

    let result = gateway
        .profile(&ConditionalRequest::profile(&octocat()))
        .await
        .expect("HTTP failures are reported in the outcome");

    match result.outcome {
        FetchOutcome::Failed {
            status: actual,
            message: actual_message,
        } => {
            assert_eq!(actual, status);
            assert!(
                actual_message.contains(message),
                "unexpected message: {actual_message}"
            );
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert_eq!(
        result.telemetry.rate_limit.map(|info| info.remaining()),
        Some(0)
    );
}

#[tokio::test]
async fn malformed_payload_is_an_api_error() {
    let server = MockServer::start().await;
    let gateway = gateway_for(&server);

    Mock::given(method("GET"))
        .and(path("/users/octocat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let error = gateway
        .profile(&ConditionalRequest::profile(&octocat()))
        .await
        .expect_err("malformed body should fail");

    assert!(
        matches!(error, IntakeError::Api { .. }),
        "expected Api error, got {error:?}"
    );
}

#[tokio::test]
async fn rejects_unparseable_api_base() {
    let token = PersonalAccessToken::new("valid-token").expect("token should be valid");
    let result = OctocrabProfileGateway::for_token(&token, "not a uri");

    assert!(
        matches!(result, Err(IntakeError::InvalidUrl(_))),
        "expected InvalidUrl"
    );
}
