/// Integration tests for the octocrab-backed session against a mock GitHub API
use checkrelay_core::{
    CheckConclusion, CheckRunContext, CheckRunOutput, CheckRunRequest, CheckStatus, plan_operation,
};
use checkrelay_github::{
    ChecksSession, GithubApiClient, GithubCredentials, GithubSessionProvider, SessionProvider,
};
use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> (MockServer, GithubApiClient) {
    // Initialize rustls crypto provider for tests
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let server = MockServer::start().await;
    let client = GithubApiClient::new("test-token".to_string(), &server.uri())
        .expect("Failed to create GitHub client");
    (server, client)
}

fn context() -> CheckRunContext {
    CheckRunContext::new(
        "octocat/hello",
        "ce587453ced02b1526dfb4cb910479d431683101",
        "octocat/hello/PR-7",
        "https://ci.example.com/job/hello/PR-7/3/",
    )
}

#[tokio::test]
async fn test_is_private() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "name": "hello",
            "full_name": "octocat/hello",
            "private": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.is_private("octocat/hello").await.unwrap());
}

#[tokio::test]
async fn test_is_private_rejects_malformed_name_without_request() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    assert!(client.is_private("hello").await.is_err());
}

#[tokio::test]
async fn test_user_lookups_reject_path_like_names_without_request() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    assert!(client.get_user("octocat/../../orgs/acme").await.is_err());
    assert!(client.get_user("octocat?per_page=1").await.is_err());
    assert!(client.is_member_of("octocat/x", "acme").await.is_err());
    assert!(client.is_member_of("octocat", "acme/members").await.is_err());
}

#[tokio::test]
async fn test_is_private_propagates_server_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Not Found",
            "documentation_url": "https://docs.github.com/rest"
        })))
        .mount(&server)
        .await;

    assert!(client.is_private("octocat/hello").await.is_err());
}

#[tokio::test]
async fn test_get_user() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/users/octocat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 583231,
            "login": "octocat"
        })))
        .mount(&server)
        .await;

    let user = client.get_user("octocat").await.unwrap();
    assert_eq!(user.login, "octocat");
}

#[tokio::test]
async fn test_is_member_of() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/orgs/acme/members/octocat"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/orgs/acme/members/stranger"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Not Found",
            "documentation_url": "https://docs.github.com/rest"
        })))
        .mount(&server)
        .await;

    assert!(client.is_member_of("octocat", "acme").await.unwrap());
    assert!(matches!(
        client.is_member_of("stranger", "acme").await,
        Ok(false)
    ));
}

#[tokio::test]
async fn test_create_check_run() {
    let (server, client) = setup().await;
    let started = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

    Mock::given(method("POST"))
        .and(path("/repos/octocat/hello/check-runs"))
        .and(body_partial_json(json!({
            "name": "Jenkins",
            "head_sha": "ce587453ced02b1526dfb4cb910479d431683101",
            "status": "queued",
            "external_id": "octocat/hello/PR-7",
            "details_url": "https://ci.example.com/job/hello/PR-7/3/",
            "started_at": "2024-05-01T12:00:00Z"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 4,
            "name": "Jenkins",
            "status": "queued",
            "conclusion": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = CheckRunRequest::new("Jenkins", CheckStatus::Queued);
    let operation = plan_operation(None, &context(), &request, started);

    let run = client
        .create_check_run("octocat/hello", operation.payload())
        .await
        .unwrap();
    assert_eq!(run.id, 4);
}

#[tokio::test]
async fn test_create_check_run_requires_head_sha() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let request = CheckRunRequest::new("Jenkins", CheckStatus::Queued);
    // An update payload carries no head SHA
    let operation = plan_operation(Some(4), &context(), &request, Utc::now());

    assert!(
        client
            .create_check_run("octocat/hello", operation.payload())
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_update_check_run() {
    let (server, client) = setup().await;
    let finished = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();

    Mock::given(method("PATCH"))
        .and(path("/repos/octocat/hello/check-runs/4"))
        .and(body_partial_json(json!({
            "status": "completed",
            "conclusion": "success",
            "completed_at": "2024-05-01T12:30:00Z",
            "output": {"title": "Build", "summary": "All tests passed"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 4,
            "status": "completed",
            "conclusion": "success"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = CheckRunRequest::new("Jenkins", CheckStatus::InProgress)
        .completed(CheckConclusion::Success)
        .with_output(CheckRunOutput::new("Build", "All tests passed"));
    let operation = plan_operation(Some(4), &context(), &request, finished);

    let run = client
        .update_check_run("octocat/hello", 4, operation.payload())
        .await
        .unwrap();
    assert_eq!(run.id, 4);
    assert_eq!(run.conclusion.as_deref(), Some("success"));
}

#[tokio::test]
async fn test_update_check_run_server_error() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/repos/octocat/hello/check-runs/4"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Validation Failed",
            "documentation_url": "https://docs.github.com/rest"
        })))
        .mount(&server)
        .await;

    let request = CheckRunRequest::new("Jenkins", CheckStatus::InProgress);
    let operation = plan_operation(Some(4), &context(), &request, Utc::now());

    assert!(
        client
            .update_check_run("octocat/hello", 4, operation.payload())
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_session_provider_uses_credential_endpoint() {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"private": false})))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = GithubCredentials::new("test-token").with_api_uri(server.uri());
    let provider =
        GithubSessionProvider::with_default_api_url(credentials, "https://unreachable.invalid");
    let session = provider.connect().await.unwrap();

    assert!(!session.is_private("octocat/hello").await.unwrap());
}
