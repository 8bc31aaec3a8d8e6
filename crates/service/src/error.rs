use testgen_ai::AiError;
use testgen_api::{FileFetchError, FileWriteError, ServiceError};
use testgen_github::GitHubError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestrationError {
    /// The request itself was unacceptable; nothing was sent upstream.
    #[error("{0}")]
    Invalid(String),

    #[error("No files could be fetched successfully")]
    NoFilesFetched { errors: Vec<FileFetchError> },

    /// Every test file write failed, so no pull request was opened.
    #[error("No test files could be created")]
    NoFilesCreated { errors: Vec<FileWriteError> },

    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error(transparent)]
    Ai(#[from] AiError),
}

impl OrchestrationError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Invalid(_) | Self::NoFilesFetched { .. } => 400,
            Self::NoFilesCreated { .. } => 502,
            Self::GitHub(e) => e.status_code(),
            Self::Ai(e) => e.status_code(),
        }
    }
}

impl From<OrchestrationError> for ServiceError {
    fn from(e: OrchestrationError) -> Self {
        ServiceError::from_status(e.status_code(), e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_with_matching_status() {
        let e: ServiceError = OrchestrationError::Ai(AiError::NoProviderConfigured).into();
        assert_eq!(e.status_code(), 503);

        let e: ServiceError = OrchestrationError::GitHub(GitHubError::NotAFile).into();
        assert_eq!(e, ServiceError::BadRequest("Path is not a file".into()));

        let e: ServiceError = OrchestrationError::NoFilesCreated { errors: vec![] }.into();
        assert_eq!(e.status_code(), 502);
        assert_eq!(e.message(), "No test files could be created");
    }
}
