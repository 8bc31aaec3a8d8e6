use async_trait::async_trait;
use futures::future::join_all;

use testgen_api::{BranchInfo, FileContent, PullRequestInfo};

use crate::error::GitHubError;
use crate::types::{FileCommit, FileWrite, NewPullRequest, RepoRef};

/// Outcome of one fetch inside a batch.
#[derive(Debug)]
pub struct FileFetch {
    pub path: String,
    pub result: Result<FileContent, GitHubError>,
}

/// The repository operations test orchestration needs.
///
/// [`crate::GitHubClient`] is the production implementation; tests use
/// in-memory fakes.
#[async_trait]
pub trait RepoHost: Send + Sync {
    async fn get_file(
        &self,
        token: &str,
        repo: &RepoRef,
        path: &str,
    ) -> Result<FileContent, GitHubError>;

    /// Fetch every path concurrently. Never fails as a whole: each entry
    /// carries its own result, in input order.
    async fn get_files(&self, token: &str, repo: &RepoRef, paths: &[String]) -> Vec<FileFetch> {
        join_all(paths.iter().map(|path| async move {
            FileFetch {
                path: path.clone(),
                result: self.get_file(token, repo, path).await,
            }
        }))
        .await
    }

    /// Create `name` from `from`, or from the default branch when `from` is
    /// `None`.
    async fn create_branch(
        &self,
        token: &str,
        repo: &RepoRef,
        name: &str,
        from: Option<&str>,
    ) -> Result<BranchInfo, GitHubError>;

    async fn create_file(
        &self,
        token: &str,
        repo: &RepoRef,
        write: FileWrite<'_>,
    ) -> Result<FileCommit, GitHubError>;

    async fn create_pull_request(
        &self,
        token: &str,
        repo: &RepoRef,
        pr: NewPullRequest<'_>,
    ) -> Result<PullRequestInfo, GitHubError>;
}
