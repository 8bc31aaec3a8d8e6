//! Shared API types, crypto, and OAuth helpers for testgen
//!
//! This crate is the **single source of truth** for all API request/response types.
//! TypeScript types are auto-generated via `ts-rs` and consumed by the wizard frontend.
//!
//! To regenerate TypeScript types:
//!   cargo test -p testgen-api --features ts -- export_typescript --nocapture

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[cfg(feature = "backend")]
pub mod crypto;
pub mod oauth;
pub mod service;

// Re-export core domain types for convenience
pub use testgen_core::pr::{CreatedFile, FileWriteError};
pub use testgen_core::{Complexity, Priority, RawSummary, TestSummary, TestType};

// ─── Envelope ────────────────────────────────────────────────────────────────

/// Generic success response for operations that don't return data.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct OkResponse {
    pub success: bool,
    pub message: String,
}

impl OkResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Returned by `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub timestamp: String,
    pub version: String,
}

// ─── Auth ────────────────────────────────────────────────────────────────────

/// Query for `GET /api/auth/github-url`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AuthUrlQuery {
    pub redirect_uri: Option<String>,
}

/// Returned by `GET /api/auth/github-url`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct AuthUrlResponse {
    pub auth_url: String,
    pub state: String,
    pub message: String,
}

/// Body of `POST /api/auth/github/callback`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct OAuthCallbackRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    /// Set when GitHub redirected back with `?error=...`.
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `POST /api/auth/refresh`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct RefreshRequest {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// GitHub profile handed to the client after login. Carries the GitHub
/// access token; the client resubmits it with every GitHub-backed call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub blog: Option<String>,
    pub public_repos: Option<i64>,
    pub followers: Option<i64>,
    pub following: Option<i64>,
    pub created_at: Option<String>,
    pub access_token: String,
}

/// Returned on successful OAuth callback and refresh.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: UserProfile,
}

/// Identity carried inside the JWT.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

/// Returned by `GET /api/auth/verify`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct VerifyResponse {
    pub success: bool,
    pub message: String,
    pub user: SessionUser,
}

// ─── GitHub ──────────────────────────────────────────────────────────────────

/// Body shared by read-only GitHub routes.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct AccessTokenBody {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Query for `POST /api/github/repositories`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RepoListQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub exclude_forks: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct AccountRef {
    pub login: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct RepositorySummary {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub private: bool,
    pub owner: AccountRef,
    pub html_url: String,
    pub language: Option<String>,
    pub stargazers_count: i64,
    pub forks_count: i64,
    pub size: i64,
    pub default_branch: String,
    pub open_issues_count: i64,
    pub has_issues: bool,
    pub has_wiki: bool,
    pub fork: bool,
    pub archived: bool,
    pub disabled: bool,
    pub pushed_at: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub has_next_page: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct RepositoriesResponse {
    pub success: bool,
    pub repositories: Vec<RepositorySummary>,
    pub pagination: Pagination,
}

/// Query for `POST /api/github/{owner}/{repo}/contents`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ContentsQuery {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct FolderEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub download_url: Option<String>,
    pub html_url: Option<String>,
    pub is_text_file: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ContentsResponse {
    pub success: bool,
    pub path: String,
    pub folders: Vec<FolderEntry>,
    pub files: Vec<FileEntry>,
    pub total_files: usize,
    pub total_code_files: usize,
}

/// A decoded repository file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct FileContent {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub content: String,
    pub sha: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct FileResponse {
    pub success: bool,
    pub file: FileContent,
}

/// Body of `POST /api/github/{owner}/{repo}/files`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct MultiFileRequest {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub file_paths: Option<Vec<String>>,
}

/// A per-file failure inside a batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct FileFetchError {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct BatchCounts {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct MultiFileResponse {
    pub success: bool,
    pub files: Vec<FileContent>,
    pub errors: Vec<FileFetchError>,
    pub summary: BatchCounts,
}

/// Body of `POST /api/github/{owner}/{repo}/branch`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct CreateBranchRequest {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub branch_name: Option<String>,
    /// Source branch; the repository default branch when omitted.
    #[serde(default)]
    pub from_branch: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct BranchInfo {
    pub name: String,
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub sha: String,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct CreateBranchResponse {
    pub success: bool,
    pub message: String,
    pub branch: BranchInfo,
}

/// Body of `POST /api/github/{owner}/{repo}/create-file`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct CreateFileRequest {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct CreatedFileInfo {
    pub name: String,
    pub path: String,
    pub sha: String,
    pub size: u64,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct CommitInfo {
    pub sha: String,
    pub message: String,
    pub html_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct CreateFileResponse {
    pub success: bool,
    pub message: String,
    pub file: CreatedFileInfo,
    pub commit: CommitInfo,
}

/// Body of `POST /api/github/{owner}/{repo}/pull-request`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct CreatePullRequestRequest {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub head: Option<String>,
    /// Target branch; the repository default branch when omitted.
    #[serde(default)]
    pub base: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct RefInfo {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub sha: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct PullRequestInfo {
    pub id: i64,
    pub number: i64,
    pub title: String,
    pub body: Option<String>,
    pub state: String,
    pub html_url: String,
    pub diff_url: Option<String>,
    pub patch_url: Option<String>,
    pub head: RefInfo,
    pub base: RefInfo,
    pub user: Option<AccountRef>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct CreatePullRequestResponse {
    pub success: bool,
    pub message: String,
    pub pull_request: PullRequestInfo,
}

// ─── Test Cases ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct SummaryFileRef {
    pub path: String,
}

/// Body of `POST /api/test-cases/generate-summaries`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct GenerateSummariesRequest {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub files: Option<Vec<SummaryFileRef>>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub repo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct SummaryMetadata {
    pub total_files: usize,
    pub processed_files: usize,
    pub failed_files: usize,
    pub generated_summaries: usize,
    pub errors: Vec<FileFetchError>,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct GenerateSummariesResponse {
    pub success: bool,
    pub message: String,
    pub summaries: Vec<TestSummary>,
    pub metadata: SummaryMetadata,
}

/// Body of `POST /api/test-cases/generate-code`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct GenerateCodeRequest {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub test_summary: Option<RawSummary>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub framework: Option<String>,
}

/// Generated test file content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct GeneratedTestCode {
    pub file_name: String,
    pub content: String,
    pub framework: String,
    pub source_file: String,
    pub test_summary: TestSummary,
    pub generated_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct GenerateCodeResponse {
    pub success: bool,
    pub message: String,
    pub test_code: GeneratedTestCode,
}

/// Body of `POST /api/test-cases/generate-multiple`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct GenerateMultipleRequest {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub test_summaries: Option<Vec<RawSummary>>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub framework: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct TestGenerationSuccess {
    pub summary: TestSummary,
    pub test_code: GeneratedTestCode,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct TestGenerationFailure {
    pub summary: RawSummary,
    pub error: String,
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct GenerateMultipleResponse {
    pub success: bool,
    pub message: String,
    pub results: Vec<TestGenerationSuccess>,
    pub errors: Vec<TestGenerationFailure>,
    pub summary: BatchCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct TestFileInput {
    pub file_name: String,
    pub content: String,
}

/// Body of `POST /api/test-cases/create-pull-request`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct CreateTestPrRequest {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub test_files: Option<Vec<TestFileInput>>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct TestPullRequest {
    pub id: i64,
    pub number: i64,
    pub title: String,
    pub html_url: String,
    pub branch: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct TestPrFiles {
    pub created: Vec<CreatedFile>,
    pub errors: Vec<FileWriteError>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct TestPrCounts {
    pub total_files: usize,
    pub created_files: usize,
    pub failed_files: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct CreateTestPrResponse {
    pub success: bool,
    pub message: String,
    pub pull_request: TestPullRequest,
    pub files: TestPrFiles,
    pub summary: TestPrCounts,
}

/// Returned by `GET /api/test-cases/supported-frameworks`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct FrameworksResponse {
    pub success: bool,
    pub frameworks: BTreeMap<String, Vec<String>>,
    pub default_frameworks: BTreeMap<String, String>,
}

impl FrameworksResponse {
    pub fn from_tables() -> Self {
        Self {
            success: true,
            frameworks: testgen_core::framework::supported_frameworks()
                .into_iter()
                .map(|(lang, list)| {
                    (
                        lang.to_string(),
                        list.iter().map(|f| f.to_string()).collect(),
                    )
                })
                .collect(),
            default_frameworks: testgen_core::framework::default_frameworks()
                .into_iter()
                .map(|(ext, fw)| (ext.to_string(), fw.to_string()))
                .collect(),
        }
    }
}

// ─── Service Error ───────────────────────────────────────────────────────────

/// Framework-agnostic service error.
///
/// Each variant maps to an HTTP status; the server turns it into the JSON
/// envelope `{ "success": false, "error": <code>, "message": <text> }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Unprocessable(String),
    TooManyRequests(String),
    Internal(String),
    BadGateway(String),
    ServiceUnavailable(String),
}

impl ServiceError {
    /// HTTP status code as a `u16`.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Unprocessable(_) => 422,
            Self::TooManyRequests(_) => 429,
            Self::Internal(_) => 500,
            Self::BadGateway(_) => 502,
            Self::ServiceUnavailable(_) => 503,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Unprocessable(_) => "unprocessable",
            Self::TooManyRequests(_) => "rate_limited",
            Self::Internal(_) => "internal_error",
            Self::BadGateway(_) => "upstream_error",
            Self::ServiceUnavailable(_) => "service_unavailable",
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(m)
            | Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::Conflict(m)
            | Self::Unprocessable(m)
            | Self::TooManyRequests(m)
            | Self::Internal(m)
            | Self::BadGateway(m)
            | Self::ServiceUnavailable(m) => m,
        }
    }

    /// Build the variant matching an HTTP status. Unknown 4xx become
    /// `BadRequest`, unknown 5xx `Internal`.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 => Self::BadRequest(message),
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            422 => Self::Unprocessable(message),
            429 => Self::TooManyRequests(message),
            502 => Self::BadGateway(message),
            503 => Self::ServiceUnavailable(message),
            s if (400..500).contains(&s) => Self::BadRequest(message),
            _ => Self::Internal(message),
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ServiceError {}

// ─── Error envelope ──────────────────────────────────────────────────────────

/// JSON shape returned by all error responses.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ApiError {
    pub success: bool,
    pub error: String,
    pub message: String,
}

impl From<&ServiceError> for ApiError {
    fn from(e: &ServiceError) -> Self {
        Self {
            success: false,
            error: e.code().to_string(),
            message: e.message().to_string(),
        }
    }
}

#[cfg(test)]
mod envelope_tests {
    use super::*;

    #[test]
    fn status_round_trip() {
        for status in [400, 401, 403, 404, 409, 422, 429, 500, 502, 503] {
            assert_eq!(ServiceError::from_status(status, "x").status_code(), status);
        }
        assert_eq!(ServiceError::from_status(418, "x").status_code(), 400);
        assert_eq!(ServiceError::from_status(504, "x").status_code(), 500);
    }

    #[test]
    fn api_error_carries_code_and_message() {
        let err = ServiceError::TooManyRequests("slow down".into());
        let body = serde_json::to_value(ApiError::from(&err)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"success": false, "error": "rate_limited", "message": "slow down"})
        );
    }

    #[test]
    fn frameworks_response_is_populated() {
        let resp = FrameworksResponse::from_tables();
        assert_eq!(resp.default_frameworks[".java"], "junit");
        assert!(resp.frameworks["python"].contains(&"pytest".to_string()));
    }
}

// ─── TypeScript generation ───────────────────────────────────────────────────
