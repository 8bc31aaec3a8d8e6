use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use testgen_api::*;

/// Failure of one API call.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with its JSON error envelope (or, failing that,
    /// a bare non-2xx status).
    #[error("{message} ({status} {code})")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
    #[error("not signed in: no session token")]
    NotSignedIn,
    #[error("GitHub access token not set")]
    NoAccessToken,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Machine-readable code from the error envelope.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    /// The session is unusable and the user has to sign in again.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::NotSignedIn) || matches!(self.status(), Some(401 | 403))
    }

    /// Text suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self.status() {
            Some(401) => "Authentication expired. Please sign in again.".into(),
            Some(403) => "Access denied. Insufficient permissions.".into(),
            Some(429) => "Too many requests. Please wait a moment before trying again.".into(),
            Some(s) if s >= 500 => "Server error. Please try again later.".into(),
            _ => match self {
                Self::Api { message, .. } => message.clone(),
                Self::Http(e) if e.is_connect() || e.is_timeout() => {
                    "Network error. Please check your internet connection.".into()
                }
                other => other.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Typed HTTP client for the testgen API.
///
/// Holds two credentials: the session JWT sent as a bearer token, and the
/// GitHub access token that GitHub-backed routes expect in the JSON body.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
    access_token: Option<String>,
}

impl ApiClient {
    /// Create a new client with the given base URL and timeout. Summary and
    /// code generation wait on an LLM, so keep the timeout generous.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
            access_token: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_auth(&mut self, token: String) {
        self.auth_token = Some(token);
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn set_access_token(&mut self, token: String) {
        self.access_token = Some(token);
    }

    /// Store both credentials from a login or refresh response.
    pub fn apply_session(&mut self, auth: &AuthResponse) {
        self.auth_token = Some(auth.token.clone());
        self.access_token = Some(auth.user.access_token.clone());
    }

    pub fn clear_session(&mut self) {
        self.auth_token = None;
        self.access_token = None;
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn repo_url(&self, owner: &str, repo: &str, rest: &str) -> String {
        self.url(&format!(
            "/github/{}/{}{rest}",
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        ))
    }

    fn token(&self) -> Result<&str> {
        self.auth_token.as_deref().ok_or(ClientError::NotSignedIn)
    }

    fn access_token(&self) -> Result<String> {
        self.access_token.clone().ok_or(ClientError::NoAccessToken)
    }

    async fn get<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        let resp = self.client.get(url).bearer_auth(self.token()?).send().await?;
        parse_response(resp).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, url: String, body: &B) -> Result<T> {
        let resp = self
            .client
            .post(url)
            .bearer_auth(self.token()?)
            .json(body)
            .send()
            .await?;
        parse_response(resp).await
    }

    // ── Health ────────────────────────────────────────────────────────────

    pub async fn health(&self) -> Result<HealthResponse> {
        let resp = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        parse_response(resp).await
    }

    // ── Auth ──────────────────────────────────────────────────────────────

    pub async fn github_auth_url(&self, redirect_uri: Option<&str>) -> Result<AuthUrlResponse> {
        let mut req = self.client.get(self.url("/auth/github-url"));
        if let Some(uri) = redirect_uri {
            req = req.query(&[("redirect_uri", uri)]);
        }
        parse_response(req.send().await?).await
    }

    /// Finish the OAuth round trip. On success both credentials are stored.
    pub async fn github_callback(&mut self, code: &str, state: Option<&str>) -> Result<AuthResponse> {
        let body = OAuthCallbackRequest {
            code: Some(code.to_string()),
            state: state.map(str::to_string),
            error: None,
        };
        let resp = self
            .client
            .post(self.url("/auth/github/callback"))
            .json(&body)
            .send()
            .await?;
        let auth: AuthResponse = parse_response(resp).await?;
        self.apply_session(&auth);
        Ok(auth)
    }

    /// Re-read the GitHub profile and get a fresh session token.
    pub async fn refresh(&mut self) -> Result<AuthResponse> {
        let body = RefreshRequest {
            access_token: Some(self.access_token()?),
        };
        let resp = self
            .client
            .post(self.url("/auth/refresh"))
            .json(&body)
            .send()
            .await?;
        let auth: AuthResponse = parse_response(resp).await?;
        self.apply_session(&auth);
        Ok(auth)
    }

    pub async fn verify(&self) -> Result<VerifyResponse> {
        self.get(self.url("/auth/verify")).await
    }

    /// Tell the server and drop local credentials. They are dropped even
    /// when the call fails.
    pub async fn logout(&mut self) -> Result<OkResponse> {
        let result = self.post(self.url("/auth/logout"), &serde_json::json!({})).await;
        self.clear_session();
        result
    }

    // ── GitHub ────────────────────────────────────────────────────────────

    pub async fn repositories(
        &self,
        page: u32,
        per_page: u32,
        exclude_forks: bool,
    ) -> Result<RepositoriesResponse> {
        let url = format!(
            "{}?page={page}&per_page={per_page}&exclude_forks={exclude_forks}",
            self.url("/github/repositories")
        );
        let body = AccessTokenBody {
            access_token: Some(self.access_token()?),
        };
        self.post(url, &body).await
    }

    pub async fn contents(&self, owner: &str, repo: &str, path: &str) -> Result<ContentsResponse> {
        let url = format!(
            "{}?path={}",
            self.repo_url(owner, repo, "/contents"),
            urlencoding::encode(path)
        );
        let body = AccessTokenBody {
            access_token: Some(self.access_token()?),
        };
        self.post(url, &body).await
    }

    pub async fn file(&self, owner: &str, repo: &str, path: &str) -> Result<FileResponse> {
        let encoded: Vec<_> = path
            .trim_start_matches('/')
            .split('/')
            .map(urlencoding::encode)
            .collect();
        let url = self.repo_url(owner, repo, &format!("/file/{}", encoded.join("/")));
        let body = AccessTokenBody {
            access_token: Some(self.access_token()?),
        };
        self.post(url, &body).await
    }

    pub async fn files(&self, owner: &str, repo: &str, paths: &[String]) -> Result<MultiFileResponse> {
        let body = MultiFileRequest {
            access_token: Some(self.access_token()?),
            file_paths: Some(paths.to_vec()),
        };
        self.post(self.repo_url(owner, repo, "/files"), &body).await
    }

    pub async fn create_branch(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        from: Option<&str>,
    ) -> Result<CreateBranchResponse> {
        let body = CreateBranchRequest {
            access_token: Some(self.access_token()?),
            branch_name: Some(name.to_string()),
            from_branch: from.map(str::to_string),
        };
        self.post(self.repo_url(owner, repo, "/branch"), &body).await
    }

    pub async fn create_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        content: &str,
        message: &str,
        branch: Option<&str>,
    ) -> Result<CreateFileResponse> {
        let body = CreateFileRequest {
            access_token: Some(self.access_token()?),
            path: Some(path.to_string()),
            content: Some(content.to_string()),
            message: Some(message.to_string()),
            branch: branch.map(str::to_string),
        };
        self.post(self.repo_url(owner, repo, "/create-file"), &body).await
    }

    pub async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        body: &str,
        head: &str,
        base: Option<&str>,
    ) -> Result<CreatePullRequestResponse> {
        let req = CreatePullRequestRequest {
            access_token: Some(self.access_token()?),
            title: Some(title.to_string()),
            body: Some(body.to_string()),
            head: Some(head.to_string()),
            base: base.map(str::to_string),
        };
        self.post(self.repo_url(owner, repo, "/pull-request"), &req).await
    }

    // ── Test cases ────────────────────────────────────────────────────────

    pub async fn generate_summaries(
        &self,
        owner: &str,
        repo: &str,
        paths: &[String],
    ) -> Result<GenerateSummariesResponse> {
        let body = GenerateSummariesRequest {
            access_token: Some(self.access_token()?),
            files: Some(
                paths
                    .iter()
                    .map(|p| SummaryFileRef { path: p.clone() })
                    .collect(),
            ),
            owner: Some(owner.to_string()),
            repo: Some(repo.to_string()),
        };
        self.post(self.url("/test-cases/generate-summaries"), &body).await
    }

    pub async fn generate_code(
        &self,
        owner: &str,
        repo: &str,
        summary: &TestSummary,
        framework: Option<&str>,
    ) -> Result<GenerateCodeResponse> {
        let body = GenerateCodeRequest {
            access_token: Some(self.access_token()?),
            test_summary: Some(summary.clone().into()),
            owner: Some(owner.to_string()),
            repo: Some(repo.to_string()),
            framework: framework.map(str::to_string),
        };
        self.post(self.url("/test-cases/generate-code"), &body).await
    }

    pub async fn generate_multiple(
        &self,
        owner: &str,
        repo: &str,
        summaries: &[TestSummary],
        framework: Option<&str>,
    ) -> Result<GenerateMultipleResponse> {
        let body = GenerateMultipleRequest {
            access_token: Some(self.access_token()?),
            test_summaries: Some(summaries.iter().cloned().map(RawSummary::from).collect()),
            owner: Some(owner.to_string()),
            repo: Some(repo.to_string()),
            framework: framework.map(str::to_string),
        };
        self.post(self.url("/test-cases/generate-multiple"), &body).await
    }

    pub async fn create_test_pull_request(
        &self,
        owner: &str,
        repo: &str,
        files: Vec<TestFileInput>,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<CreateTestPrResponse> {
        let body = CreateTestPrRequest {
            access_token: Some(self.access_token()?),
            test_files: Some(files),
            owner: Some(owner.to_string()),
            repo: Some(repo.to_string()),
            title: title.map(str::to_string),
            description: description.map(str::to_string),
        };
        self.post(self.url("/test-cases/create-pull-request"), &body).await
    }

    pub async fn supported_frameworks(&self) -> Result<FrameworksResponse> {
        self.get(self.url("/test-cases/supported-frameworks")).await
    }
}

/// Deserialize a 2xx body, or turn the error envelope into
/// [`ClientError::Api`].
async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }
    let body = resp.text().await.unwrap_or_default();
    tracing::debug!(status = status.as_u16(), "API call failed");
    Err(match serde_json::from_str::<ApiError>(&body) {
        Ok(envelope) => ClientError::Api {
            status: status.as_u16(),
            code: envelope.error,
            message: envelope.message,
        },
        Err(_) => ClientError::Api {
            status: status.as_u16(),
            code: "http_error".into(),
            message: if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("Request failed").to_string()
            } else {
                body
            },
        },
    })
}
