use std::time::Duration;

use thiserror::Error;

const DEFAULT_FRONTEND_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:5173",
    "http://localhost:5174",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("No AI provider is configured: set OPENAI_API_KEY or GOOGLE_GEMINI_API_KEY")]
    NoProviderConfigured,
    #[error("{key} is not a valid number: {value:?}")]
    NotANumber { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

/// Credentials and model for one AI provider.
#[derive(Clone)]
pub struct AiProviderConfig {
    pub api_key: String,
    pub model: String,
}

/// Server configuration loaded from environment variables.
#[derive(Clone)]
pub struct AppConfig {
    pub github_client_id: String,
    pub github_client_secret: String,
    pub github_api_url: String,
    pub github_oauth_url: String,
    pub jwt_secret: String,
    /// Tried first.
    pub openai: Option<AiProviderConfig>,
    pub gemini: Option<AiProviderConfig>,
    pub ai_timeout: Duration,
    /// Origins allowed by CORS.
    pub frontend_origins: Vec<String>,
    /// Base the OAuth redirect is built on.
    pub primary_frontend_url: String,
    pub env: AppEnv,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let github_client_id = require("GITHUB_CLIENT_ID")?;
        let github_client_secret = require("GITHUB_CLIENT_SECRET")?;
        let jwt_secret = require("JWT_SECRET")?;

        let openai = get("OPENAI_API_KEY").map(|api_key| AiProviderConfig {
            api_key,
            model: get("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".into()),
        });
        let gemini = get("GOOGLE_GEMINI_API_KEY").map(|api_key| AiProviderConfig {
            api_key,
            model: get("GEMINI_MODEL").unwrap_or_else(|| "gemini-1.5-flash-latest".into()),
        });
        if openai.is_none() && gemini.is_none() {
            return Err(ConfigError::NoProviderConfigured);
        }

        let ai_timeout_secs = match get("AI_TIMEOUT_SECS") {
            Some(v) => v.parse::<u64>().map_err(|_| ConfigError::NotANumber {
                key: "AI_TIMEOUT_SECS",
                value: v,
            })?,
            None => 120,
        };
        let port = match get("PORT") {
            Some(v) => v
                .parse::<u16>()
                .map_err(|_| ConfigError::NotANumber { key: "PORT", value: v })?,
            None => 5000,
        };

        let mut frontend_origins: Vec<String> =
            DEFAULT_FRONTEND_ORIGINS.iter().map(|s| s.to_string()).collect();
        if let Some(list) = get("FRONTEND_URL") {
            for origin in list.split(',').map(|s| s.trim().trim_end_matches('/')) {
                if !origin.is_empty() && !frontend_origins.iter().any(|o| o == origin) {
                    frontend_origins.push(origin.to_string());
                }
            }
        }

        let env = match get("APP_ENV").as_deref() {
            Some("production") => AppEnv::Production,
            _ => AppEnv::Development,
        };

        Ok(Self {
            github_client_id,
            github_client_secret,
            github_api_url: get("GITHUB_API_URL").unwrap_or_else(|| "https://api.github.com".into()),
            github_oauth_url: get("GITHUB_OAUTH_URL")
                .unwrap_or_else(|| "https://github.com/login/oauth".into()),
            jwt_secret,
            openai,
            gemini,
            ai_timeout: Duration::from_secs(ai_timeout_secs),
            frontend_origins,
            primary_frontend_url: get("PRIMARY_FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:3000".into()),
            env,
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Required keys plus `extra`; later pairs override earlier ones.
    fn load(extra: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = [
            ("GITHUB_CLIENT_ID", "id"),
            ("GITHUB_CLIENT_SECRET", "secret"),
            ("JWT_SECRET", "jwt"),
        ]
        .iter()
        .chain(extra.iter())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_with_one_provider() {
        let config = load(&[("GOOGLE_GEMINI_API_KEY", "g")]).unwrap();
        assert!(config.openai.is_none());
        assert_eq!(config.gemini.as_ref().unwrap().model, "gemini-1.5-flash-latest");
        assert_eq!(config.ai_timeout, Duration::from_secs(120));
        assert_eq!(config.port, 5000);
        assert_eq!(config.github_api_url, "https://api.github.com");
        assert_eq!(config.primary_frontend_url, "http://localhost:3000");
        assert_eq!(config.frontend_origins.len(), 3);
        assert!(config.env.is_development());
    }

    #[test]
    fn required_keys_are_enforced() {
        let err = AppConfig::from_lookup(|key| (key == "OPENAI_API_KEY").then(|| "k".into())).err();
        assert_eq!(err, Some(ConfigError::Missing("GITHUB_CLIENT_ID")));

        assert_eq!(load(&[]).err(), Some(ConfigError::NoProviderConfigured));
    }

    #[test]
    fn empty_values_count_as_unset() {
        let err = load(&[("JWT_SECRET", "  "), ("OPENAI_API_KEY", "k")]).err();
        assert_eq!(err, Some(ConfigError::Missing("JWT_SECRET")));

        let err = load(&[("OPENAI_API_KEY", ""), ("GOOGLE_GEMINI_API_KEY", "")]).err();
        assert_eq!(err, Some(ConfigError::NoProviderConfigured));
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            ("OPENAI_API_KEY", "o"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("GOOGLE_GEMINI_API_KEY", "g"),
            ("AI_TIMEOUT_SECS", "30"),
            ("PORT", "8080"),
            ("FRONTEND_URL", "https://app.example.com/, http://localhost:3000"),
            ("APP_ENV", "production"),
        ])
        .unwrap();
        assert_eq!(config.openai.as_ref().unwrap().model, "gpt-4o");
        assert!(config.gemini.is_some());
        assert_eq!(config.ai_timeout, Duration::from_secs(30));
        assert_eq!(config.port, 8080);
        assert_eq!(config.frontend_origins.len(), 4);
        assert!(config.frontend_origins.contains(&"https://app.example.com".to_string()));
        assert_eq!(config.env, AppEnv::Production);
    }

    #[test]
    fn bad_numbers_are_reported() {
        let err = load(&[("OPENAI_API_KEY", "o"), ("PORT", "http")]).err();
        assert_eq!(
            err,
            Some(ConfigError::NotANumber {
                key: "PORT",
                value: "http".into()
            })
        );
    }
}
