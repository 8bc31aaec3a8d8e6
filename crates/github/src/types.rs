//! GitHub REST payloads and their mapping onto the wire types we serve.

use serde::{Deserialize, Serialize};

use testgen_api::{
    AccountRef, BranchInfo, CommitInfo, CreatedFileInfo, FileEntry, FolderEntry, PullRequestInfo,
    RefInfo, RepositorySummary, UserProfile,
};

/// Owner/name pair identifying a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// `GET /user`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUser {
    pub id: i64,
    pub login: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub blog: Option<String>,
    pub public_repos: Option<i64>,
    pub followers: Option<i64>,
    pub following: Option<i64>,
    pub created_at: Option<String>,
}

impl GitHubUser {
    pub fn into_profile(self, access_token: String) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.login,
            email: self.email,
            name: self.name,
            avatar: self.avatar_url,
            bio: self.bio,
            location: self.location,
            company: self.company,
            blog: self.blog,
            public_repos: self.public_repos,
            followers: self.followers,
            following: self.following,
            created_at: self.created_at,
            access_token,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GitHubAccount {
    pub login: String,
    pub avatar_url: Option<String>,
}

impl From<GitHubAccount> for AccountRef {
    fn from(a: GitHubAccount) -> Self {
        Self {
            login: a.login,
            avatar: a.avatar_url,
        }
    }
}

/// `GET /user/repos` item and `GET /repos/{owner}/{repo}`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GitHubRepo {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub private: bool,
    pub owner: GitHubAccount,
    pub html_url: String,
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: i64,
    #[serde(default)]
    pub forks_count: i64,
    #[serde(default)]
    pub size: i64,
    pub default_branch: Option<String>,
    #[serde(default)]
    pub open_issues_count: i64,
    #[serde(default)]
    pub has_issues: bool,
    #[serde(default)]
    pub has_wiki: bool,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub disabled: bool,
    pub pushed_at: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<GitHubRepo> for RepositorySummary {
    fn from(r: GitHubRepo) -> Self {
        Self {
            id: r.id,
            name: r.name,
            full_name: r.full_name,
            description: r.description,
            private: r.private,
            owner: r.owner.into(),
            html_url: r.html_url,
            language: r.language,
            stargazers_count: r.stargazers_count,
            forks_count: r.forks_count,
            size: r.size,
            default_branch: r.default_branch.unwrap_or_else(|| "main".into()),
            open_issues_count: r.open_issues_count,
            has_issues: r.has_issues,
            has_wiki: r.has_wiki,
            fork: r.fork,
            archived: r.archived,
            disabled: r.disabled,
            pushed_at: r.pushed_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// One page of the user's repositories.
#[derive(Debug, Clone)]
pub struct RepoPage {
    pub repositories: Vec<RepositorySummary>,
    /// `x-total-count`, when GitHub sends it.
    pub total_count: Option<u64>,
}

/// An entry of `GET /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentItem {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub sha: String,
    pub download_url: Option<String>,
    pub html_url: Option<String>,
    /// Base64 payload; present only when a single file is requested.
    pub content: Option<String>,
    /// `base64`, or `none` when the file is too large to inline.
    pub encoding: Option<String>,
}

impl ContentItem {
    pub fn is_dir(&self) -> bool {
        self.item_type == "dir"
    }

    pub fn is_file(&self) -> bool {
        self.item_type == "file"
    }

    /// The base64 payload of a file entry, if GitHub inlined one.
    pub fn inline_content(&self) -> Option<&str> {
        if self.encoding.as_deref().is_some_and(|e| e != "base64") {
            return None;
        }
        let content = self.content.as_deref().unwrap_or_default();
        (self.size == 0 || !content.is_empty()).then_some(content)
    }

    pub fn to_folder(&self) -> FolderEntry {
        FolderEntry {
            name: self.name.clone(),
            path: self.path.clone(),
            entry_type: self.item_type.clone(),
            html_url: self.html_url.clone(),
        }
    }

    pub fn to_file(&self) -> FileEntry {
        FileEntry {
            name: self.name.clone(),
            path: self.path.clone(),
            size: self.size,
            entry_type: self.item_type.clone(),
            download_url: self.download_url.clone(),
            html_url: self.html_url.clone(),
            is_text_file: testgen_core::content::is_text_file(&self.name),
        }
    }
}

/// The contents endpoint answers a directory with an array and a file with
/// a single object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany {
    Many(Vec<ContentItem>),
    One(Box<ContentItem>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<ContentItem> {
        match self {
            Self::Many(v) => v,
            Self::One(item) => vec![*item],
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitObject {
    pub sha: String,
}

/// `GET /repos/{owner}/{repo}/git/ref/...` and `POST .../git/refs`.
#[derive(Debug, Deserialize)]
pub(crate) struct GitRef {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub url: String,
    pub object: GitObject,
}

impl GitRef {
    pub fn into_branch(self, name: &str) -> BranchInfo {
        BranchInfo {
            name: name.to_string(),
            ref_name: self.ref_name,
            sha: self.object.sha,
            url: self.url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PutContent {
    pub name: String,
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub size: u64,
    pub html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PutCommit {
    pub sha: String,
    pub message: String,
    pub html_url: Option<String>,
}

/// `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Deserialize)]
pub(crate) struct PutContentResponse {
    pub content: PutContent,
    pub commit: PutCommit,
}

/// A file written by a contents PUT together with its commit.
#[derive(Debug, Clone)]
pub struct FileCommit {
    pub file: CreatedFileInfo,
    pub commit: CommitInfo,
}

impl From<PutContentResponse> for FileCommit {
    fn from(r: PutContentResponse) -> Self {
        Self {
            file: CreatedFileInfo {
                name: r.content.name,
                path: r.content.path,
                sha: r.content.sha,
                size: r.content.size,
                html_url: r.content.html_url,
            },
            commit: CommitInfo {
                sha: r.commit.sha,
                message: r.commit.message,
                html_url: r.commit.html_url,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PullRef {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub sha: String,
}

/// `POST /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Deserialize)]
pub(crate) struct GitHubPull {
    pub id: i64,
    pub number: i64,
    pub title: String,
    pub body: Option<String>,
    pub state: String,
    pub html_url: String,
    pub diff_url: Option<String>,
    pub patch_url: Option<String>,
    pub head: PullRef,
    pub base: PullRef,
    pub user: Option<GitHubAccount>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<GitHubPull> for PullRequestInfo {
    fn from(p: GitHubPull) -> Self {
        Self {
            id: p.id,
            number: p.number,
            title: p.title,
            body: p.body,
            state: p.state,
            html_url: p.html_url,
            diff_url: p.diff_url,
            patch_url: p.patch_url,
            head: RefInfo {
                ref_name: p.head.ref_name,
                sha: p.head.sha,
            },
            base: RefInfo {
                ref_name: p.base.ref_name,
                sha: p.base.sha,
            },
            user: p.user.map(Into::into),
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Input of a contents PUT.
#[derive(Debug, Clone)]
pub struct FileWrite<'a> {
    pub path: &'a str,
    pub content: &'a str,
    pub message: &'a str,
    pub branch: &'a str,
}

/// Input of a pull-request creation. `base` falls back to the repository
/// default branch.
#[derive(Debug, Clone)]
pub struct NewPullRequest<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub head: &'a str,
    pub base: Option<&'a str>,
}
