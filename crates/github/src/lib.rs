//! GitHub gateway: a thin typed wrapper over the GitHub REST API.
//!
//! Every call is a single request/response mapping with GitHub-specific
//! error translation ([`GitHubError`]). Nothing is cached or retried.

mod client;
mod error;
mod host;
mod types;

pub use client::GitHubClient;
pub use error::GitHubError;
pub use host::{FileFetch, RepoHost};
pub use types::{
    ContentItem, FileCommit, FileWrite, GitHubUser, NewPullRequest, RepoPage, RepoRef,
};
