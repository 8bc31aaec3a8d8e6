use thiserror::Error;

/// Failure talking to GitHub, classified by what the caller can do about it.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// The OAuth code exchange was refused.
    #[error("{0}")]
    OAuth(String),
    #[error("Invalid GitHub access token")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    /// Validation failure; carries GitHub's own message.
    #[error("{0}")]
    Unprocessable(String),
    #[error("GitHub API rate limit exceeded")]
    RateLimited,
    #[error("Path is not a file")]
    NotAFile,
    /// The file exists but its text cannot be served: binary, or too large
    /// for the contents API.
    #[error("{0}")]
    UnreadableFile(String),
    #[error("{message}")]
    Upstream { status: u16, message: String },
    #[error("GitHub request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected GitHub response: {0}")]
    Decode(String),
}

impl GitHubError {
    /// HTTP status the API layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::OAuth(_) | Self::NotAFile => 400,
            Self::Unauthorized => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Unprocessable(_) | Self::UnreadableFile(_) => 422,
            Self::RateLimited => 429,
            Self::Upstream { .. } | Self::Transport(_) | Self::Decode(_) => 502,
        }
    }
}

/// The GitHub operation a response belongs to. Drives the wording of
/// not-found, forbidden and validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    User,
    Repos,
    Contents,
    File,
    Repo,
    Branch,
    CreateFile,
    PullRequest,
}

impl Op {
    fn action(self) -> &'static str {
        match self {
            Self::User => "get user information",
            Self::Repos => "get repositories",
            Self::Contents => "get repository contents",
            Self::File => "get file contents",
            Self::Repo => "get repository",
            Self::Branch => "create branch",
            Self::CreateFile => "create file",
            Self::PullRequest => "create pull request",
        }
    }

    fn not_found(self) -> &'static str {
        match self {
            Self::Contents => "Repository or path not found",
            Self::File => "File not found",
            Self::Branch => "Source branch not found",
            _ => "Repository not found or access denied",
        }
    }

    fn unprocessable(self, github_message: Option<&str>) -> String {
        match self {
            Self::Branch => format!(
                "Branch creation failed: {}",
                github_message.unwrap_or("Branch already exists or invalid name")
            ),
            Self::CreateFile => format!(
                "File already exists or invalid content{}",
                github_message.map(|m| format!(": {m}")).unwrap_or_default()
            ),
            Self::PullRequest => format!(
                "Pull request failed: {}",
                github_message.unwrap_or("Pull request validation failed")
            ),
            _ => github_message.unwrap_or("Validation failed").to_string(),
        }
    }

    /// Map a non-success response to an error.
    pub(crate) fn classify(
        self,
        status: u16,
        rate_limit_exhausted: bool,
        github_message: Option<&str>,
    ) -> GitHubError {
        match status {
            401 => GitHubError::Unauthorized,
            403 if rate_limit_exhausted => GitHubError::RateLimited,
            403 => GitHubError::Forbidden(format!("Insufficient permissions to {}", self.action())),
            404 => GitHubError::NotFound(self.not_found().to_string()),
            422 => GitHubError::Unprocessable(self.unprocessable(github_message)),
            429 => GitHubError::RateLimited,
            _ => GitHubError::Upstream {
                status,
                message: format!("Failed to {}", self.action()),
            },
        }
    }
}
