use std::sync::Arc;

use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use testgen_ai::{AiGateway, GeminiConfig, GeminiProvider, LlmProvider, OpenAiConfig, OpenAiProvider};
use testgen_api::oauth::GitHubOAuthConfig;
use testgen_github::{GitHubClient, GitHubError};
use testgen_service::TestCaseService;

use crate::config::AppConfig;
use crate::error::route_not_found;
use crate::routes;

const BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub github: GitHubClient,
    pub tests: TestCaseService<GitHubClient>,
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for GitHubClient {
    fn from_ref(state: &AppState) -> Self {
        state.github.clone()
    }
}

impl FromRef<AppState> for TestCaseService<GitHubClient> {
    fn from_ref(state: &AppState) -> Self {
        state.tests.clone()
    }
}

impl AppState {
    pub fn new(config: AppConfig, github: GitHubClient, ai: AiGateway) -> Self {
        Self {
            config: Arc::new(config),
            tests: TestCaseService::new(github.clone(), ai),
            github,
        }
    }

    /// Build the GitHub client and the AI provider chain from `config`.
    /// OpenAI is tried before Gemini when both are configured.
    pub fn from_config(config: AppConfig) -> Result<Self, GitHubError> {
        let oauth = GitHubOAuthConfig::new(
            config.github_client_id.clone(),
            config.github_client_secret.clone(),
            config.github_oauth_url.clone(),
        );
        let github = GitHubClient::new(&config.github_api_url, oauth)?;

        let http = reqwest::Client::new();
        let mut providers: Vec<Arc<dyn LlmProvider>> = Vec::new();
        if let Some(openai) = &config.openai {
            providers.push(Arc::new(OpenAiProvider::new(
                http.clone(),
                OpenAiConfig::new(openai.api_key.clone()).with_model(openai.model.clone()),
            )));
        }
        if let Some(gemini) = &config.gemini {
            providers.push(Arc::new(GeminiProvider::new(
                http.clone(),
                GeminiConfig::new(gemini.api_key.clone()).with_model(gemini.model.clone()),
            )));
        }
        let ai = AiGateway::new(providers, config.ai_timeout);
        tracing::info!(providers = ?ai.provider_names(), "AI providers configured");

        Ok(Self::new(config, github, ai))
    }
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        // Auth
        .route("/auth/github-url", get(routes::auth::github_url))
        .route("/auth/github/callback", post(routes::auth::callback))
        .route("/auth/refresh", post(routes::auth::refresh))
        .route("/auth/verify", get(routes::auth::verify))
        .route("/auth/logout", post(routes::auth::logout))
        // GitHub
        .route("/github/repositories", post(routes::github::repositories))
        .route("/github/{owner}/{repo}/contents", post(routes::github::contents))
        .route("/github/{owner}/{repo}/file/{*path}", post(routes::github::file))
        .route("/github/{owner}/{repo}/files", post(routes::github::files))
        .route("/github/{owner}/{repo}/branch", post(routes::github::create_branch))
        .route("/github/{owner}/{repo}/create-file", post(routes::github::create_file))
        .route("/github/{owner}/{repo}/pull-request", post(routes::github::pull_request))
        // Test cases
        .route(
            "/test-cases/generate-summaries",
            post(routes::test_cases::generate_summaries),
        )
        .route("/test-cases/generate-code", post(routes::test_cases::generate_code))
        .route(
            "/test-cases/generate-multiple",
            post(routes::test_cases::generate_multiple),
        )
        .route(
            "/test-cases/create-pull-request",
            post(routes::test_cases::create_pull_request),
        )
        .route(
            "/test-cases/supported-frameworks",
            get(routes::test_cases::supported_frameworks),
        );

    let cors = cors_layer(&state.config);
    Router::new()
        .route("/health", get(routes::health::health))
        .nest("/api", api)
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
