//! Authenticated pass-through to the GitHub REST API.
//!
//! Every route takes the caller's GitHub access token in the JSON body.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use testgen_api::service::{
    RepoListParams, present, require_access_token, validate_branch_name, validate_fetch_paths,
};
use testgen_api::{
    AccessTokenBody, BatchCounts, ContentsQuery, ContentsResponse, CreateBranchRequest,
    CreateBranchResponse, CreateFileRequest, CreateFileResponse, CreatePullRequestRequest,
    CreatePullRequestResponse, FileFetchError, FileResponse, MultiFileRequest, MultiFileResponse,
    RepoListQuery, RepositoriesResponse,
};
use testgen_core::content::is_code_file;
use testgen_github::{FileWrite, GitHubClient, NewPullRequest, RepoHost, RepoRef};

use crate::auth::AuthUser;
use crate::error::{ApiErr, ApiJson};

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// POST /api/github/repositories?page=&per_page=&exclude_forks=
pub async fn repositories(
    _user: AuthUser,
    State(github): State<GitHubClient>,
    Query(q): Query<RepoListQuery>,
    ApiJson(body): ApiJson<AccessTokenBody>,
) -> Result<Json<RepositoriesResponse>, ApiErr> {
    let token = require_access_token(body.access_token.as_deref())?;
    let params = RepoListParams::from_query(&q);

    let page = github
        .list_repositories(token, params.page, params.per_page)
        .await?;
    // Paging is decided on what GitHub returned, before fork filtering.
    let pagination = params.pagination(page.repositories.len(), page.total_count);
    let mut repositories = page.repositories;
    if params.exclude_forks {
        repositories.retain(|r| !r.fork);
    }

    Ok(Json(RepositoriesResponse {
        success: true,
        repositories,
        pagination,
    }))
}

/// POST /api/github/{owner}/{repo}/contents?path=
pub async fn contents(
    _user: AuthUser,
    State(github): State<GitHubClient>,
    Path((owner, repo)): Path<(String, String)>,
    Query(q): Query<ContentsQuery>,
    ApiJson(body): ApiJson<AccessTokenBody>,
) -> Result<Json<ContentsResponse>, ApiErr> {
    let token = require_access_token(body.access_token.as_deref())?;
    let path = q.path.as_deref().unwrap_or("").trim_matches('/');

    let items = github
        .list_contents(token, &RepoRef::new(owner, repo), path)
        .await?;
    let folders = items.iter().filter(|i| i.is_dir()).map(|i| i.to_folder()).collect();
    let all_files: Vec<_> = items.iter().filter(|i| i.is_file()).collect();
    let files: Vec<_> = all_files
        .iter()
        .filter(|i| is_code_file(&i.name))
        .map(|i| i.to_file())
        .collect();

    Ok(Json(ContentsResponse {
        success: true,
        path: if path.is_empty() { "/".into() } else { path.to_string() },
        folders,
        total_files: all_files.len(),
        total_code_files: files.len(),
        files,
    }))
}

/// POST /api/github/{owner}/{repo}/file/{*path}
pub async fn file(
    _user: AuthUser,
    State(github): State<GitHubClient>,
    Path((owner, repo, path)): Path<(String, String, String)>,
    ApiJson(body): ApiJson<AccessTokenBody>,
) -> Result<Json<FileResponse>, ApiErr> {
    let token = require_access_token(body.access_token.as_deref())?;
    let file = github
        .get_file(token, &RepoRef::new(owner, repo), &path)
        .await?;
    Ok(Json(FileResponse {
        success: true,
        file,
    }))
}

/// POST /api/github/{owner}/{repo}/files: fetch up to ten files at once.
/// Per-file failures are reported next to the successes.
pub async fn files(
    _user: AuthUser,
    State(github): State<GitHubClient>,
    Path((owner, repo)): Path<(String, String)>,
    ApiJson(body): ApiJson<MultiFileRequest>,
) -> Result<Json<MultiFileResponse>, ApiErr> {
    let token = require_access_token(body.access_token.as_deref())?;
    let paths = validate_fetch_paths(body.file_paths.as_deref())?;

    let mut files = Vec::new();
    let mut errors = Vec::new();
    for fetch in github
        .get_files(token, &RepoRef::new(owner, repo), paths)
        .await
    {
        match fetch.result {
            Ok(file) => files.push(file),
            Err(e) => errors.push(FileFetchError {
                path: fetch.path,
                error: e.to_string(),
            }),
        }
    }

    Ok(Json(MultiFileResponse {
        success: true,
        summary: BatchCounts {
            total: paths.len(),
            successful: files.len(),
            failed: errors.len(),
        },
        files,
        errors,
    }))
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// POST /api/github/{owner}/{repo}/branch
pub async fn create_branch(
    _user: AuthUser,
    State(github): State<GitHubClient>,
    Path((owner, repo)): Path<(String, String)>,
    ApiJson(body): ApiJson<CreateBranchRequest>,
) -> Result<Json<CreateBranchResponse>, ApiErr> {
    let token = require_access_token(body.access_token.as_deref())?;
    let name = validate_branch_name(body.branch_name.as_deref())?;
    let from = present(body.from_branch.as_deref());

    let branch = github
        .create_branch(token, &RepoRef::new(owner, repo), name, from)
        .await?;
    Ok(Json(CreateBranchResponse {
        success: true,
        message: "Branch created successfully".into(),
        branch,
    }))
}

/// POST /api/github/{owner}/{repo}/create-file
pub async fn create_file(
    _user: AuthUser,
    State(github): State<GitHubClient>,
    Path((owner, repo)): Path<(String, String)>,
    ApiJson(body): ApiJson<CreateFileRequest>,
) -> Result<Json<CreateFileResponse>, ApiErr> {
    let token = require_access_token(body.access_token.as_deref())?;
    let (Some(path), Some(content), Some(message)) = (
        present(body.path.as_deref()),
        body.content.as_deref().filter(|c| !c.is_empty()),
        present(body.message.as_deref()),
    ) else {
        return Err(ApiErr::bad_request(
            "File path, content, and commit message are required",
        ));
    };
    let branch = present(body.branch.as_deref()).unwrap_or("main");

    let written = github
        .create_file(
            token,
            &RepoRef::new(owner, repo),
            FileWrite {
                path,
                content,
                message,
                branch,
            },
        )
        .await?;
    Ok(Json(CreateFileResponse {
        success: true,
        message: "File created successfully".into(),
        file: written.file,
        commit: written.commit,
    }))
}

/// POST /api/github/{owner}/{repo}/pull-request
pub async fn pull_request(
    _user: AuthUser,
    State(github): State<GitHubClient>,
    Path((owner, repo)): Path<(String, String)>,
    ApiJson(body): ApiJson<CreatePullRequestRequest>,
) -> Result<Json<CreatePullRequestResponse>, ApiErr> {
    let token = require_access_token(body.access_token.as_deref())?;
    let (Some(title), Some(head)) = (present(body.title.as_deref()), present(body.head.as_deref()))
    else {
        return Err(ApiErr::bad_request(
            "Pull request title and head branch are required",
        ));
    };

    let pull_request = github
        .create_pull_request(
            token,
            &RepoRef::new(owner, repo),
            NewPullRequest {
                title,
                body: body.body.as_deref().unwrap_or(""),
                head,
                base: present(body.base.as_deref()),
            },
        )
        .await?;
    Ok(Json(CreatePullRequestResponse {
        success: true,
        message: "Pull request created successfully".into(),
        pull_request,
    }))
}
