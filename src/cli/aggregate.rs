//! Aggregation run driven from the command line.

use std::io::{self, Write};

use roster::{
    AggregationPipeline, CompletedRun, FetchSession, IdentifierNormalizer, IntakeError,
    JsonlRunSink, OctocrabProfileGateway, PersonalAccessToken, ProfileGateway, RosterConfig,
    RunOutcome, RunReport, RunSink, RunSupervisor, read_input,
};

use super::output::{ProgressLineSink, write_run_summary, write_table};

/// Reads the account list, runs the pipeline and prints the results.
///
/// # Errors
///
/// Returns [`IntakeError::MissingIdentifiers`] when the input holds no
/// usable handle, [`IntakeError::MissingToken`] when no token is configured,
/// and [`IntakeError::RateLimitExceeded`] when the run stopped early.
pub async fn run(config: &RosterConfig) -> Result<(), IntakeError> {
    let raw = read_input(&config.input_source(), &mut io::stdin())?;
    let sink: Box<dyn RunSink> = if config.events {
        Box::new(JsonlRunSink::stderr())
    } else {
        Box::new(ProgressLineSink::stderr())
    };

    run_with_gateway_builder(
        config,
        &raw,
        OctocrabProfileGateway::for_token,
        sink.as_ref(),
        &mut io::stdout(),
        &mut io::stderr(),
    )
    .await?;
    Ok(())
}

/// Runs one aggregation with a caller-supplied gateway constructor.
///
/// This function is exposed for testing with local gateways.
///
/// # Errors
///
/// Fails as [`run`] does, and also when writing the table or summary fails.
pub async fn run_with_gateway_builder<G, F, TableOut, SummaryOut>(
    config: &RosterConfig,
    raw: &str,
    build_gateway: F,
    sink: &dyn RunSink,
    table: &mut TableOut,
    summary: &mut SummaryOut,
) -> Result<RunReport, IntakeError>
where
    G: ProfileGateway,
    F: FnOnce(&PersonalAccessToken, &str) -> Result<G, IntakeError>,
    TableOut: Write,
    SummaryOut: Write,
{
    let normalized = IdentifierNormalizer::new(config.web_host.as_str()).normalize(raw);
    if normalized.is_empty() {
        return Err(IntakeError::MissingIdentifiers);
    }
    tracing::debug!(accounts = %normalized.canonical_text(), "normalized account list");

    let token = PersonalAccessToken::new(config.resolve_token()?)?;
    let settings = config.pipeline_settings()?;
    let gateway = build_gateway(&token, config.api_base()?)?;
    let pipeline = AggregationPipeline::new(&gateway, settings)?;

    let supervisor = RunSupervisor::new();
    let CompletedRun { session, report } = pipeline
        .run(
            normalized.identifiers(),
            FetchSession::new(),
            sink,
            &supervisor.begin(),
        )
        .await;

    write_table(table, session.records())?;
    write_run_summary(summary, session.failures(), &report)?;

    match report.outcome {
        RunOutcome::RateLimited {
            rate_limit,
            skipped,
        } => Err(IntakeError::RateLimitExceeded {
            rate_limit: Some(rate_limit),
            message: format!("{skipped} accounts were not attempted"),
        }),
        RunOutcome::Completed | RunOutcome::Superseded { .. } => Ok(report),
    }
}

#[cfg(test)]
mod tests {
    use roster::{IntakeError, NoopRunSink, OctocrabProfileGateway, RosterConfig, RunOutcome};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::run_with_gateway_builder;

    fn config_for(server: &MockServer) -> RosterConfig {
        RosterConfig {
            token: Some("valid-token".to_owned()),
            api_base: server.uri(),
            request_delay_ms: 0,
            ..RosterConfig::default()
        }
    }

    async fn mount_account(server: &MockServer, login: &str, remaining: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/users/{login}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({
                        "login": login,
                        "name": null,
                        "public_repos": 0,
                        "followers": 1
                    }))
                    .insert_header("X-RateLimit-Remaining", remaining),
            )
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/users/{login}/orgs")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn prints_table_and_summary() {
        let server = MockServer::start().await;
        mount_account(&server, "octocat", "4999").await;

        let mut table = Vec::new();
        let mut summary = Vec::new();
        let report = run_with_gateway_builder(
            &config_for(&server),
            "https://github.com/octocat, someone@example.com",
            OctocrabProfileGateway::for_token,
            &NoopRunSink,
            &mut table,
            &mut summary,
        )
        .await
        .expect("run should succeed");

        assert_eq!(report.outcome, RunOutcome::Completed);
        let table_text = String::from_utf8(table).expect("table should be UTF-8");
        assert!(
            table_text.contains("octocat\tN/A\t0\t0\t0\t1\tN/A\tN/A\tN/A"),
            "unexpected table: {table_text}"
        );
        let summary_text = String::from_utf8(summary).expect("summary should be UTF-8");
        assert!(summary_text.contains("Processed 1 of 1 accounts"));
    }

    #[tokio::test]
    async fn rate_limited_run_is_reported_as_error_after_output() {
        let server = MockServer::start().await;
        mount_account(&server, "first", "3").await;

        let mut table = Vec::new();
        let mut summary = Vec::new();
        let result = run_with_gateway_builder(
            &config_for(&server),
            "first second",
            OctocrabProfileGateway::for_token,
            &NoopRunSink,
            &mut table,
            &mut summary,
        )
        .await;

        assert!(
            matches!(result, Err(IntakeError::RateLimitExceeded { .. })),
            "expected RateLimitExceeded, got {result:?}"
        );
        let table_text = String::from_utf8(table).expect("table should be UTF-8");
        assert!(table_text.contains("first\t"), "records before the stop are kept");
        assert!(!table_text.contains("second"));
    }

    #[tokio::test]
    async fn input_without_handles_is_rejected() {
        let server = MockServer::start().await;

        let result = run_with_gateway_builder(
            &config_for(&server),
            " , a@b.com ",
            OctocrabProfileGateway::for_token,
            &NoopRunSink,
            &mut Vec::new(),
            &mut Vec::new(),
        )
        .await;

        assert_eq!(result, Err(IntakeError::MissingIdentifiers));
    }
}
