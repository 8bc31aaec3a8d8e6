use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    Json,
    extract::{FromRequest, rejection::JsonRejection},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};

use testgen_ai::AiError;
use testgen_api::{ApiError, ServiceError};
use testgen_github::GitHubError;
use testgen_service::OrchestrationError;

static EXPOSE_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(false);

/// Include internal error details in 500 responses. Set once at startup in
/// development.
pub fn expose_internal_errors(enabled: bool) {
    EXPOSE_INTERNAL_ERRORS.store(enabled, Ordering::Relaxed);
}

/// Unified API error type.
///
/// Produces the `{"success": false, "error": <code>, "message": <text>}`
/// envelope every failing route returns.
#[derive(Debug)]
pub struct ApiErr {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiErr {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", msg)
    }
}

impl From<ServiceError> for ApiErr {
    fn from(e: ServiceError) -> Self {
        let status =
            StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, e.code(), e.message())
    }
}

impl From<GitHubError> for ApiErr {
    fn from(e: GitHubError) -> Self {
        ServiceError::from_status(e.status_code(), e.to_string()).into()
    }
}

impl From<AiError> for ApiErr {
    fn from(e: AiError) -> Self {
        ServiceError::from_status(e.status_code(), e.to_string()).into()
    }
}

impl From<OrchestrationError> for ApiErr {
    fn from(e: OrchestrationError) -> Self {
        ServiceError::from(e).into()
    }
}

impl From<JsonRejection> for ApiErr {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        let message = if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), code = self.code, "{}", self.message);
            if self.status == StatusCode::INTERNAL_SERVER_ERROR
                && !EXPOSE_INTERNAL_ERRORS.load(Ordering::Relaxed)
            {
                "Internal Server Error".to_string()
            } else {
                self.message
            }
        } else {
            self.message
        };
        let body = ApiError {
            success: false,
            error: self.code.to_string(),
            message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// JSON body extractor whose rejections use the error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiErr))]
pub struct ApiJson<T>(pub T);

/// Fallback for unknown routes.
pub async fn route_not_found(uri: Uri) -> ApiErr {
    ApiErr::new(
        StatusCode::NOT_FOUND,
        "route_not_found",
        format!("The route {uri} does not exist"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(err: ApiErr) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn upstream_errors_keep_their_status() {
        let (status, body) = body_of(GitHubError::Unauthorized.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorized");
        assert_eq!(body["message"], "Invalid GitHub access token");
        assert_eq!(body["success"], false);

        let (status, body) = body_of(AiError::RateLimited { provider: "OpenAI" }.into()).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], "rate_limited");

        let (status, _) = body_of(AiError::NoProviderConfigured.into()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, body) =
            body_of(GitHubError::Unprocessable("Reference already exists".into()).into()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "Reference already exists");
    }

    #[tokio::test]
    async fn internal_detail_is_hidden_by_default() {
        let (status, body) = body_of(ServiceError::Internal("RNG failure: no entropy".into()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal Server Error");
        assert_eq!(body["error"], "internal_error");
    }
}
