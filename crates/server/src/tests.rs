//! Router-level tests: real handlers and extractors, GitHub mocked with
//! wiremock, the AI replaced by an in-process provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use testgen_ai::{AiError, AiGateway, LlmProvider};
use testgen_api::SessionUser;
use testgen_api::crypto::sign_jwt;
use testgen_api::oauth::GitHubOAuthConfig;
use testgen_core::content::encode_content;
use testgen_github::GitHubClient;

use crate::app::{AppState, router};
use crate::auth::now_unix;
use crate::config::AppConfig;

const SECRET: &str = "test-secret";

struct CannedModel(&'static str);

#[async_trait]
impl LlmProvider for CannedModel {
    fn name(&self) -> &'static str {
        "canned"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, AiError> {
        Ok(self.0.to_string())
    }
}

fn config(server: &MockServer) -> AppConfig {
    let github = server.uri();
    AppConfig::from_lookup(move |key| {
        let value = match key {
            "GITHUB_CLIENT_ID" => "cid".to_string(),
            "GITHUB_CLIENT_SECRET" => "csecret".to_string(),
            "JWT_SECRET" => SECRET.to_string(),
            "OPENAI_API_KEY" => "sk-test".to_string(),
            "GITHUB_API_URL" => github.clone(),
            "GITHUB_OAUTH_URL" => format!("{github}/login/oauth"),
            _ => return None,
        };
        Some(value)
    })
    .unwrap()
}

fn app_with(server: &MockServer, reply: &'static str) -> Router {
    let config = config(server);
    let oauth = GitHubOAuthConfig::new(
        config.github_client_id.clone(),
        config.github_client_secret.clone(),
        config.github_oauth_url.clone(),
    );
    let github = GitHubClient::with_client(reqwest::Client::new(), &config.github_api_url, oauth);
    let ai = AiGateway::new(
        vec![Arc::new(CannedModel(reply)) as Arc<dyn LlmProvider>],
        Duration::from_secs(5),
    );
    router(AppState::new(config, github, ai))
}

fn app(server: &MockServer) -> Router {
    app_with(server, "```js\ntest('adds', () => expect(add(1, 2)).toBe(3));\n```")
}

fn bearer() -> String {
    let user = SessionUser {
        id: 7,
        username: "octocat".into(),
        email: None,
        avatar: None,
    };
    format!("Bearer {}", sign_jwt(&user, SECRET, now_unix()))
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut req = Request::builder().method(Method::GET).uri(uri);
    if let Some(auth) = auth {
        req = req.header(header::AUTHORIZATION, auth);
    }
    req.body(Body::empty()).unwrap()
}

fn post(uri: &str, auth: Option<&str>, body: Value) -> Request<Body> {
    let mut req = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        req = req.header(header::AUTHORIZATION, auth);
    }
    req.body(Body::from(body.to_string())).unwrap()
}

fn file_json(path: &str, text: &str) -> Value {
    json!({
        "type": "file",
        "name": path.rsplit('/').next().unwrap(),
        "path": path,
        "size": text.len(),
        "sha": "sha-1",
        "download_url": null,
        "html_url": null,
        "content": encode_content(text),
        "encoding": "base64"
    })
}

// ── Envelope ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_ok() {
    let server = MockServer::start().await;
    let (status, body) = send(app(&server), get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert!(body["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let server = MockServer::start().await;
    let (status, body) = send(app(&server), get("/api/nope", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "route_not_found");
    assert_eq!(body["message"], "The route /api/nope does not exist");
}

#[tokio::test]
async fn malformed_body_uses_error_envelope() {
    let server = MockServer::start().await;
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/refresh")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(app(&server), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

// ── Auth ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn private_routes_classify_token_problems() {
    let server = MockServer::start().await;

    let (status, body) = send(app(&server), get("/api/auth/verify", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "token_missing");

    let (status, body) = send(app(&server), get("/api/auth/verify", Some("Bearer a.b.c"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "token_invalid");

    let user = SessionUser {
        id: 1,
        username: "old".into(),
        email: None,
        avatar: None,
    };
    let stale = format!("Bearer {}", sign_jwt(&user, SECRET, 1_000));
    let (status, body) = send(app(&server), get("/api/auth/verify", Some(&stale))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "token_expired");

    let forged = format!("Bearer {}", sign_jwt(&user, "other-secret", now_unix()));
    let (status, _) = send(
        app(&server),
        get("/api/test-cases/supported-frameworks", Some(&forged)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn verify_returns_session_user() {
    let server = MockServer::start().await;
    let (status, body) = send(app(&server), get("/api/auth/verify", Some(&bearer()))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "octocat");
    assert_eq!(body["user"]["id"], 7);
}

#[tokio::test]
async fn auth_url_validates_redirect() {
    let server = MockServer::start().await;

    let (status, body) = send(app(&server), get("/api/auth/github-url", None)).await;
    assert_eq!(status, StatusCode::OK);
    let url = body["authUrl"].as_str().unwrap();
    assert!(url.starts_with(&format!("{}/login/oauth/authorize?", server.uri())));
    assert!(url.contains("client_id=cid"));
    assert!(url.contains(&format!("state={}", body["state"].as_str().unwrap())));

    let (status, body) = send(
        app(&server),
        get("/api/auth/github-url?redirect_uri=https://evil.example", None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid redirect URI");
}

#[tokio::test]
async fn callback_exchanges_code_and_issues_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .and(body_partial_json(json!({"client_id": "cid", "code": "abc"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "gho_new"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42, "login": "octocat", "email": "o@example.com", "avatar_url": "https://a/42.png"
        })))
        .mount(&server)
        .await;

    let (status, body) = send(
        app(&server),
        post("/api/auth/github/callback", None, json!({"code": "abc", "state": "s"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "octocat");
    assert_eq!(body["user"]["accessToken"], "gho_new");

    let token = format!("Bearer {}", body["token"].as_str().unwrap());
    let (status, body) = send(app(&server), get("/api/auth/verify", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], 42);
    assert_eq!(body["user"]["email"], "o@example.com");
}

#[tokio::test]
async fn callback_reports_oauth_errors() {
    let server = MockServer::start().await;

    let (status, body) = send(
        app(&server),
        post("/api/auth/github/callback", None, json!({"error": "access_denied"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "GitHub OAuth error: access_denied");

    let (status, body) = send(app(&server), post("/api/auth/github/callback", None, json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Authorization code is required");
}

// ── GitHub ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn github_routes_require_access_token() {
    let server = MockServer::start().await;
    let (status, body) = send(
        app(&server),
        post("/api/github/repositories", Some(&bearer()), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "GitHub access token is required");
}

#[tokio::test]
async fn repositories_can_exclude_forks() {
    let server = MockServer::start().await;
    let repo = |name: &str, fork: bool| {
        json!({
            "id": 1, "name": name, "full_name": format!("octo/{name}"), "private": false,
            "owner": {"login": "octo"}, "html_url": "https://github.com/octo", "fork": fork,
            "default_branch": "main"
        })
    };
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .and(query_param("per_page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([repo("a", false), repo("b", true)])))
        .mount(&server)
        .await;

    let (status, body) = send(
        app(&server),
        post(
            "/api/github/repositories?per_page=2&exclude_forks=true",
            Some(&bearer()),
            json!({"accessToken": "gho_x"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["repositories"].as_array().unwrap().len(), 1);
    assert_eq!(body["repositories"][0]["fullName"], "octo/a");
    assert_eq!(body["pagination"]["hasNextPage"], true);
    assert_eq!(body["pagination"]["perPage"], 2);
    assert_eq!(body["pagination"]["total"], 2);
}

#[tokio::test]
async fn file_route_takes_nested_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/contents/src/lib/math.js"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json("src/lib/math.js", "export {}")))
        .mount(&server)
        .await;

    let (status, body) = send(
        app(&server),
        post(
            "/api/github/octo/demo/file/src/lib/math.js",
            Some(&bearer()),
            json!({"accessToken": "gho_x"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["file"]["path"], "src/lib/math.js");
    assert_eq!(body["file"]["content"], "export {}");
}

#[tokio::test]
async fn branch_names_are_validated_before_any_call() {
    let server = MockServer::start().await;
    let (status, body) = send(
        app(&server),
        post(
            "/api/github/octo/demo/branch",
            Some(&bearer()),
            json!({"accessToken": "gho_x", "branchName": "bad name!"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid branch name format");
}

#[tokio::test]
async fn github_status_passes_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/contents/gone.js"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;

    let (status, body) = send(
        app(&server),
        post(
            "/api/github/octo/demo/file/gone.js",
            Some(&bearer()),
            json!({"accessToken": "gho_x"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

// ── Test cases ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn summaries_limit_is_enforced_before_fetching() {
    let server = MockServer::start().await;
    let files: Vec<Value> = (0..6).map(|i| json!({"path": format!("f{i}.js")})).collect();
    let (status, body) = send(
        app(&server),
        post(
            "/api/test-cases/generate-summaries",
            Some(&bearer()),
            json!({"accessToken": "gho_x", "owner": "octo", "repo": "demo", "files": files}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Maximum 5 files can be processed at once");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn generate_code_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/contents/src/math.js"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json(
            "src/math.js",
            "export const add = (a, b) => a + b;",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let summary = json!({
        "id": "test-1", "title": "adds", "description": "adds two numbers",
        "type": "unit", "file": "src/math.js", "priority": "high"
    });
    let (status, body) = send(
        app(&server),
        post(
            "/api/test-cases/generate-code",
            Some(&bearer()),
            json!({"accessToken": "gho_x", "owner": "octo", "repo": "demo", "testSummary": summary}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let code = &body["testCode"];
    assert_eq!(code["fileName"], "math.test.js");
    assert_eq!(code["framework"], "jest");
    assert_eq!(code["sourceFile"], "src/math.js");
    assert_eq!(code["content"], "test('adds', () => expect(add(1, 2)).toBe(3));");
    assert_eq!(code["testSummary"]["complexity"], "medium");
}

#[tokio::test]
async fn generate_code_rejects_invalid_summary() {
    let server = MockServer::start().await;
    let summary = json!({
        "id": "t", "title": "x", "description": "d", "type": "smoke", "file": "a.js"
    });
    let (status, body) = send(
        app(&server),
        post(
            "/api/test-cases/generate-code",
            Some(&bearer()),
            json!({"accessToken": "gho_x", "owner": "octo", "repo": "demo", "testSummary": summary}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid test type: smoke");
}

#[tokio::test]
async fn unparseable_ai_answer_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/contents/a.js"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json("a.js", "x")))
        .mount(&server)
        .await;

    let (status, body) = send(
        app_with(&server, "Sorry, I can't do that."),
        post(
            "/api/test-cases/generate-summaries",
            Some(&bearer()),
            json!({"accessToken": "gho_x", "owner": "octo", "repo": "demo", "files": [{"path": "a.js"}]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "upstream_error");
}

#[tokio::test]
async fn supported_frameworks_table() {
    let server = MockServer::start().await;
    let (status, body) = send(
        app(&server),
        get("/api/test-cases/supported-frameworks", Some(&bearer())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["defaultFrameworks"][".py"], "pytest");
    assert!(
        body["frameworks"]["javascript"]
            .as_array()
            .unwrap()
            .contains(&json!("vitest"))
    );
}
