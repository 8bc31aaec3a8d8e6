//! GitHub OAuth web-flow helpers.
//!
//! This module contains only types, URL builders, and JSON parsing.
//! No HTTP calls; the token exchange itself lives in `testgen-github`.

use serde::{Deserialize, Serialize};

use crate::ServiceError;

/// Scopes requested at authorization: repository write access plus the
/// user's email.
pub const GITHUB_SCOPES: &str = "repo,user:email";

/// Path the client app serves the OAuth redirect on.
pub const CALLBACK_PATH: &str = "/auth/github/callback";

/// GitHub OAuth app configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubOAuthConfig {
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
    /// Base of the OAuth endpoints, e.g. `https://github.com/login/oauth`.
    pub oauth_url: String,
    pub scopes: String,
}

impl GitHubOAuthConfig {
    pub fn new(client_id: String, client_secret: String, oauth_url: String) -> Self {
        Self {
            client_id,
            client_secret,
            oauth_url: oauth_url.trim_end_matches('/').to_string(),
            scopes: GITHUB_SCOPES.to_string(),
        }
    }

    pub fn authorize_url(&self) -> String {
        format!("{}/authorize", self.oauth_url)
    }

    pub fn token_url(&self) -> String {
        format!("{}/access_token", self.oauth_url)
    }
}

// ── URL Builders (pure functions, no HTTP) ──────────────────────────────────

/// Build the OAuth authorize URL that the user's browser should be redirected to.
pub fn build_authorize_url(config: &GitHubOAuthConfig, redirect_uri: &str, state: &str) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&scope={}&state={}",
        config.authorize_url(),
        urlencoding::encode(&config.client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(&config.scopes),
        urlencoding::encode(state),
    )
}

/// Build the JSON body for the token exchange request.
pub fn build_token_request_body(config: &GitHubOAuthConfig, code: &str) -> serde_json::Value {
    serde_json::json!({
        "client_id": config.client_id,
        "client_secret": config.client_secret,
        "code": code,
    })
}

/// Pick the redirect URI for an authorize request.
///
/// Without a requested URI the callback on the primary frontend is used.
/// A requested URI must be the primary frontend itself or its callback path.
pub fn resolve_redirect_uri(
    requested: Option<&str>,
    primary_frontend: &str,
) -> Result<String, ServiceError> {
    let base = primary_frontend.trim_end_matches('/');
    let callback = format!("{base}{CALLBACK_PATH}");
    match requested.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(callback),
        Some(uri) if uri.trim_end_matches('/') == base || uri == callback => Ok(uri.to_string()),
        Some(_) => Err(ServiceError::BadRequest("Invalid redirect URI".into())),
    }
}

/// Parse access_token from OAuth token response.
///
/// Supports both JSON (`{\"access_token\":\"...\"}`) and query-string style
/// (`access_token=...&scope=...`) payloads. GitHub answers a bad code with a
/// 200 carrying `error`/`error_description`, which is reported as a
/// `BadRequest`.
pub fn parse_access_token_response(raw: &str) -> Result<String, ServiceError> {
    let body = raw.trim();
    if body.is_empty() {
        return Err(ServiceError::BadGateway(
            "OAuth token exchange failed: empty response body".into(),
        ));
    }

    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(token) = json
            .get("access_token")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            return Ok(token.to_string());
        }

        let err = json.get("error").and_then(|v| v.as_str());
        let err_desc = json.get("error_description").and_then(|v| v.as_str());
        return Err(token_error(
            err.map(String::from),
            err_desc.filter(|d| !d.is_empty()).map(String::from),
        ));
    }

    let mut access_token: Option<String> = None;
    let mut error: Option<String> = None;
    let mut error_description: Option<String> = None;

    for pair in body.split('&') {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_form_component(k);
        let value = decode_form_component(v);
        match key.as_str() {
            "access_token" if !value.trim().is_empty() => access_token = Some(value),
            "error" if !value.trim().is_empty() => error = Some(value),
            "error_description" if !value.trim().is_empty() => error_description = Some(value),
            _ => {}
        }
    }

    match access_token {
        Some(token) => Ok(token),
        None => Err(token_error(error, error_description)),
    }
}

fn token_error(error: Option<String>, description: Option<String>) -> ServiceError {
    match (error, description) {
        (_, Some(d)) => ServiceError::BadRequest(format!("OAuth token exchange failed: {d}")),
        (Some(e), None) => ServiceError::BadRequest(format!("OAuth token exchange failed: {e}")),
        (None, None) => ServiceError::BadGateway(
            "OAuth token exchange failed: no access_token field in response".into(),
        ),
    }
}

fn decode_form_component(s: &str) -> String {
    let spaced = s.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|c| c.into_owned())
        .unwrap_or(spaced)
}
