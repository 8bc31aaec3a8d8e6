use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
};

use testgen_api::SessionUser;
use testgen_api::crypto::{JwtError, verify_jwt};

use crate::config::AppConfig;
use crate::error::ApiErr;

pub fn now_unix() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

/// Caller identified by the `Authorization: Bearer <jwt>` header.
pub struct AuthUser(pub SessionUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppConfig>: FromRef<S>,
{
    type Rejection = ApiErr;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<AppConfig>::from_ref(state);

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ApiErr::new(
                    StatusCode::UNAUTHORIZED,
                    "token_missing",
                    "Please provide a valid access token in the Authorization header",
                )
            })?;

        match verify_jwt(token, &config.jwt_secret, now_unix()) {
            Ok(claims) => Ok(AuthUser(claims.user())),
            Err(JwtError::Expired) => Err(ApiErr::new(
                StatusCode::UNAUTHORIZED,
                "token_expired",
                "Your session has expired. Please log in again.",
            )),
            Err(e @ JwtError::Invalid(_)) => {
                tracing::debug!(error = %e, "rejected bearer token");
                Err(ApiErr::new(
                    StatusCode::FORBIDDEN,
                    "token_invalid",
                    "The provided token is invalid.",
                ))
            }
        }
    }
}
