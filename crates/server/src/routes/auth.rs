use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};

use testgen_api::crypto::{generate_state, sign_jwt};
use testgen_api::oauth::{build_authorize_url, resolve_redirect_uri};
use testgen_api::service::require_access_token;
use testgen_api::{
    AuthResponse, AuthUrlQuery, AuthUrlResponse, OAuthCallbackRequest, OkResponse,
    RefreshRequest, SessionUser, VerifyResponse,
};
use testgen_github::{GitHubClient, GitHubUser};

use crate::auth::{AuthUser, now_unix};
use crate::config::AppConfig;
use crate::error::{ApiErr, ApiJson};

/// Sign a session JWT for `user` and build the login response.
fn issue_session(
    config: &AppConfig,
    user: GitHubUser,
    access_token: String,
    message: &str,
) -> AuthResponse {
    let profile = user.into_profile(access_token);
    let session = SessionUser {
        id: profile.id,
        username: profile.username.clone(),
        email: profile.email.clone(),
        avatar: profile.avatar.clone(),
    };
    let token = sign_jwt(&session, &config.jwt_secret, now_unix());
    tracing::info!(user = %session.username, "issued session token");
    AuthResponse {
        success: true,
        message: message.to_string(),
        token,
        user: profile,
    }
}

// ---------------------------------------------------------------------------
// OAuth
// ---------------------------------------------------------------------------

/// GET /api/auth/github-url: authorize URL plus a fresh `state`.
pub async fn github_url(
    State(config): State<Arc<AppConfig>>,
    State(github): State<GitHubClient>,
    Query(q): Query<AuthUrlQuery>,
) -> Result<Json<AuthUrlResponse>, ApiErr> {
    let redirect_uri =
        resolve_redirect_uri(q.redirect_uri.as_deref(), &config.primary_frontend_url)?;
    let state = generate_state()?;
    Ok(Json(AuthUrlResponse {
        auth_url: build_authorize_url(github.oauth(), &redirect_uri, &state),
        state,
        message: "Redirect user to this URL for GitHub authentication".into(),
    }))
}

/// POST /api/auth/github/callback: exchange the code and start a session.
pub async fn callback(
    State(config): State<Arc<AppConfig>>,
    State(github): State<GitHubClient>,
    ApiJson(req): ApiJson<OAuthCallbackRequest>,
) -> Result<Json<AuthResponse>, ApiErr> {
    if let Some(error) = req.error.as_deref().filter(|e| !e.is_empty()) {
        return Err(ApiErr::bad_request(format!("GitHub OAuth error: {error}")));
    }
    let code = req
        .code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiErr::bad_request("Authorization code is required"))?;

    let access_token = github.exchange_code(code).await?;
    let user = github.get_user(&access_token).await?;
    Ok(Json(issue_session(
        &config,
        user,
        access_token,
        "Authentication successful",
    )))
}

/// POST /api/auth/refresh: re-read the GitHub profile and issue a new JWT.
pub async fn refresh(
    State(config): State<Arc<AppConfig>>,
    State(github): State<GitHubClient>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiErr> {
    let access_token = require_access_token(req.access_token.as_deref())?.to_string();
    let user = github.get_user(&access_token).await?;
    Ok(Json(issue_session(
        &config,
        user,
        access_token,
        "User data refreshed successfully",
    )))
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// GET /api/auth/verify
pub async fn verify(AuthUser(user): AuthUser) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        success: true,
        message: "Token is valid".into(),
        user,
    })
}

/// POST /api/auth/logout: tokens are stateless, so the client just drops it.
pub async fn logout(_user: AuthUser) -> Json<OkResponse> {
    Json(OkResponse::new(
        "Logout successful. Please remove the token from client storage.",
    ))
}
