use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use testgen_api::oauth::{GitHubOAuthConfig, build_token_request_body, parse_access_token_response};
use testgen_api::{BranchInfo, FileContent, PullRequestInfo, RepositorySummary};
use testgen_core::content::{ContentError, decode_github_content, encode_content};

use crate::error::{GitHubError, Op};
use crate::host::RepoHost;
use crate::types::{
    ContentItem, FileCommit, FileWrite, GitHubPull, GitHubRepo, GitHubUser, GitRef,
    NewPullRequest, OneOrMany, PutContentResponse, RepoPage, RepoRef,
};

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github.v3+json";
const CLIENT_USER_AGENT: &str = concat!("testgen/", env!("CARGO_PKG_VERSION"));
/// Used when the repository's default branch cannot be read.
const FALLBACK_BRANCH: &str = "main";

/// GitHub REST client. Stateless: every call takes the user's access token.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    oauth: GitHubOAuthConfig,
}

impl GitHubClient {
    pub fn new(api_url: &str, oauth: GitHubOAuthConfig) -> Result<Self, GitHubError> {
        let http = reqwest::Client::builder()
            .user_agent(CLIENT_USER_AGENT)
            .build()?;
        Ok(Self::with_client(http, api_url, oauth))
    }

    /// Create from an existing `reqwest::Client` (e.g. shared in tests).
    pub fn with_client(http: reqwest::Client, api_url: &str, oauth: GitHubOAuthConfig) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            oauth,
        }
    }

    pub fn oauth(&self) -> &GitHubOAuthConfig {
        &self.oauth
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn repo_url(&self, repo: &RepoRef, rest: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.api_url,
            urlencoding::encode(&repo.owner),
            urlencoding::encode(&repo.repo),
            rest
        )
    }

    fn contents_url(&self, repo: &RepoRef, path: &str) -> String {
        let encoded = encode_path(path);
        if encoded.is_empty() {
            self.repo_url(repo, "/contents")
        } else {
            self.repo_url(repo, &format!("/contents/{encoded}"))
        }
    }

    fn authed(&self, req: reqwest::RequestBuilder, token: &str) -> reqwest::RequestBuilder {
        req.header(AUTHORIZATION, format!("token {token}"))
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .header(USER_AGENT, CLIENT_USER_AGENT)
    }

    // ── OAuth ─────────────────────────────────────────────────────────────

    /// Trade an OAuth `code` for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<String, GitHubError> {
        let resp = self
            .http
            .post(self.oauth.token_url())
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .json(&build_token_request_body(&self.oauth, code))
            .send()
            .await?;
        if !resp.status().is_success() {
            warn!(status = resp.status().as_u16(), "OAuth token endpoint refused request");
            return Err(GitHubError::OAuth("Failed to exchange code for token".into()));
        }
        let body = resp.text().await?;
        parse_access_token_response(&body).map_err(|e| GitHubError::OAuth(e.message().to_string()))
    }

    // ── User & repositories ───────────────────────────────────────────────

    pub async fn get_user(&self, token: &str) -> Result<GitHubUser, GitHubError> {
        let resp = self
            .authed(self.http.get(self.url("/user")), token)
            .send()
            .await?;
        decode(check(resp, Op::User).await?).await
    }

    /// One page of the user's repositories, most recently updated first.
    pub async fn list_repositories(
        &self,
        token: &str,
        page: u32,
        per_page: u32,
    ) -> Result<RepoPage, GitHubError> {
        let resp = self
            .authed(self.http.get(self.url("/user/repos")), token)
            .query(&[
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
                ("sort", "updated".to_string()),
                ("direction", "desc".to_string()),
            ])
            .send()
            .await?;
        let resp = check(resp, Op::Repos).await?;
        let total_header = resp
            .headers()
            .get("x-total-count")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let repos: Vec<GitHubRepo> = decode(resp).await?;
        Ok(RepoPage {
            total_count: total_header,
            repositories: repos.into_iter().map(RepositorySummary::from).collect(),
        })
    }

    pub async fn default_branch(&self, token: &str, repo: &RepoRef) -> Result<String, GitHubError> {
        let resp = self
            .authed(self.http.get(self.repo_url(repo, "")), token)
            .send()
            .await?;
        let info: GitHubRepo = decode(check(resp, Op::Repo).await?).await?;
        Ok(info
            .default_branch
            .unwrap_or_else(|| FALLBACK_BRANCH.to_string()))
    }

    async fn default_branch_or_fallback(&self, token: &str, repo: &RepoRef) -> String {
        match self.default_branch(token, repo).await {
            Ok(branch) => branch,
            Err(e) => {
                warn!(%repo, error = %e, fallback = FALLBACK_BRANCH, "could not read default branch");
                FALLBACK_BRANCH.to_string()
            }
        }
    }

    // ── Contents ──────────────────────────────────────────────────────────

    /// Entries at `path` (empty for the repository root). A file path yields
    /// a single entry.
    pub async fn list_contents(
        &self,
        token: &str,
        repo: &RepoRef,
        path: &str,
    ) -> Result<Vec<ContentItem>, GitHubError> {
        let resp = self
            .authed(self.http.get(self.contents_url(repo, path)), token)
            .send()
            .await?;
        let items: OneOrMany = decode(check(resp, Op::Contents).await?).await?;
        Ok(items.into_vec())
    }

    /// Fetch and decode one file.
    pub async fn get_file(
        &self,
        token: &str,
        repo: &RepoRef,
        path: &str,
    ) -> Result<FileContent, GitHubError> {
        let resp = self
            .authed(self.http.get(self.contents_url(repo, path)), token)
            .send()
            .await?;
        let item = match decode::<OneOrMany>(check(resp, Op::File).await?).await? {
            OneOrMany::One(item) if item.is_file() => *item,
            _ => return Err(GitHubError::NotAFile),
        };
        let Some(encoded) = item.inline_content() else {
            return Err(GitHubError::UnreadableFile(format!(
                "{}: file too large for the contents API",
                item.path
            )));
        };
        let content = decode_github_content(encoded).map_err(|e| match e {
            ContentError::NotUtf8 => {
                GitHubError::UnreadableFile(format!("{}: not a text file", item.path))
            }
            ContentError::Base64(_) => GitHubError::Decode(format!("{}: {e}", item.path)),
        })?;
        debug!(%repo, path = %item.path, size = item.size, "fetched file");
        Ok(FileContent {
            name: item.name,
            path: item.path,
            size: item.size,
            content,
            sha: item.sha,
        })
    }

    // ── Writes ────────────────────────────────────────────────────────────

    pub async fn create_branch(
        &self,
        token: &str,
        repo: &RepoRef,
        name: &str,
        from: Option<&str>,
    ) -> Result<BranchInfo, GitHubError> {
        let base = match from {
            Some(b) => b.to_string(),
            None => self.default_branch_or_fallback(token, repo).await,
        };

        let resp = self
            .authed(
                self.http
                    .get(self.repo_url(repo, &format!("/git/ref/heads/{}", encode_path(&base)))),
                token,
            )
            .send()
            .await?;
        let base_ref: GitRef = decode(check(resp, Op::Branch).await?).await?;

        let resp = self
            .authed(self.http.post(self.repo_url(repo, "/git/refs")), token)
            .json(&serde_json::json!({
                "ref": format!("refs/heads/{name}"),
                "sha": base_ref.object.sha,
            }))
            .send()
            .await?;
        let created: GitRef = decode(check(resp, Op::Branch).await?).await?;
        debug!(%repo, branch = name, from = %base, "created branch");
        Ok(created.into_branch(name))
    }

    /// Create a file through a contents PUT (text is base64-encoded here).
    pub async fn create_file(
        &self,
        token: &str,
        repo: &RepoRef,
        write: FileWrite<'_>,
    ) -> Result<FileCommit, GitHubError> {
        let resp = self
            .authed(self.http.put(self.contents_url(repo, write.path)), token)
            .json(&serde_json::json!({
                "message": write.message,
                "content": encode_content(write.content),
                "branch": write.branch,
            }))
            .send()
            .await?;
        let put: PutContentResponse = decode(check(resp, Op::CreateFile).await?).await?;
        Ok(put.into())
    }

    pub async fn create_pull_request(
        &self,
        token: &str,
        repo: &RepoRef,
        pr: NewPullRequest<'_>,
    ) -> Result<PullRequestInfo, GitHubError> {
        let base = match pr.base {
            Some(b) => b.to_string(),
            None => self.default_branch_or_fallback(token, repo).await,
        };
        let resp = self
            .authed(self.http.post(self.repo_url(repo, "/pulls")), token)
            .json(&serde_json::json!({
                "title": pr.title,
                "body": pr.body,
                "head": pr.head,
                "base": base,
            }))
            .send()
            .await?;
        let pull: GitHubPull = decode(check(resp, Op::PullRequest).await?).await?;
        Ok(pull.into())
    }
}

#[async_trait]
impl RepoHost for GitHubClient {
    async fn get_file(
        &self,
        token: &str,
        repo: &RepoRef,
        path: &str,
    ) -> Result<FileContent, GitHubError> {
        GitHubClient::get_file(self, token, repo, path).await
    }

    async fn create_branch(
        &self,
        token: &str,
        repo: &RepoRef,
        name: &str,
        from: Option<&str>,
    ) -> Result<BranchInfo, GitHubError> {
        GitHubClient::create_branch(self, token, repo, name, from).await
    }

    async fn create_file(
        &self,
        token: &str,
        repo: &RepoRef,
        write: FileWrite<'_>,
    ) -> Result<FileCommit, GitHubError> {
        GitHubClient::create_file(self, token, repo, write).await
    }

    async fn create_pull_request(
        &self,
        token: &str,
        repo: &RepoRef,
        pr: NewPullRequest<'_>,
    ) -> Result<PullRequestInfo, GitHubError> {
        GitHubClient::create_pull_request(self, token, repo, pr).await
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────────

/// Percent-encode each segment, keeping the separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| urlencoding::encode(s).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

async fn check(resp: reqwest::Response, op: Op) -> Result<reqwest::Response, GitHubError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let exhausted = resp
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        == Some("0");
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from));
    warn!(
        status = status.as_u16(),
        ?op,
        message = message.as_deref().unwrap_or(""),
        "GitHub request failed"
    );
    Err(op.classify(status.as_u16(), exhausted, message.as_deref()))
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, GitHubError> {
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| GitHubError::Decode(e.to_string()))
}
