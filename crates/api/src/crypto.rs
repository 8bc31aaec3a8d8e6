//! Cryptographic helpers for authentication.
//!
//! - HMAC-SHA256 JWT signing/verification
//! - Random OAuth `state` values
//!
//! Uses pure Rust crates (no OpenSSL).

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::{ServiceError, SessionUser};

// ── JWT (HMAC-SHA256) ───────────────────────────────────────────────────────

/// JWT header (always HS256).
const JWT_HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// JWT expiry: 24 hours in seconds.
pub const JWT_EXPIRY_SECS: u64 = 24 * 3600;

/// Payload of a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub iat: u64,
    pub exp: u64,
}

impl Claims {
    pub fn user(&self) -> SessionUser {
        SessionUser {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// Why a token was rejected. Expiry is reported separately so the client
/// can tell "sign in again" from "this token is garbage".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JwtError {
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token: {0}")]
    Invalid(&'static str),
}

impl From<JwtError> for ServiceError {
    fn from(e: JwtError) -> Self {
        match e {
            JwtError::Expired => ServiceError::Unauthorized(e.to_string()),
            JwtError::Invalid(_) => ServiceError::Forbidden(e.to_string()),
        }
    }
}

/// Sign a session JWT for the given user. Returns the encoded JWT string.
pub fn sign_jwt(user: &SessionUser, secret: &str, now_unix: u64) -> String {
    let header_b64 = URL_SAFE_NO_PAD.encode(JWT_HEADER.as_bytes());

    let claims = Claims {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        avatar: user.avatar.clone(),
        iat: now_unix,
        exp: now_unix + JWT_EXPIRY_SECS,
    };
    // Serializing a struct of plain fields cannot fail.
    let payload = serde_json::to_vec(&claims).unwrap_or_default();
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload);

    let signing_input = format!("{header_b64}.{payload_b64}");
    let signature = hmac_sha256(secret.as_bytes(), signing_input.as_bytes());
    let sig_b64 = URL_SAFE_NO_PAD.encode(signature);

    format!("{signing_input}.{sig_b64}")
}

/// Verify a JWT and return its claims if valid.
pub fn verify_jwt(token: &str, secret: &str, now_unix: u64) -> Result<Claims, JwtError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(JwtError::Invalid("malformed"));
    }

    // Verify signature
    let signing_input = format!("{}.{}", parts[0], parts[1]);
    let expected_sig = hmac_sha256(secret.as_bytes(), signing_input.as_bytes());
    let actual_sig = URL_SAFE_NO_PAD
        .decode(parts[2])
        .map_err(|_| JwtError::Invalid("bad signature encoding"))?;

    if expected_sig.len() != actual_sig.len()
        || !expected_sig
            .iter()
            .zip(actual_sig.iter())
            .fold(true, |acc, (a, b)| acc & (a == b))
    {
        return Err(JwtError::Invalid("bad signature"));
    }

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|_| JwtError::Invalid("bad payload encoding"))?;
    let claims: Claims =
        serde_json::from_slice(&payload_bytes).map_err(|_| JwtError::Invalid("bad payload"))?;

    if now_unix >= claims.exp {
        return Err(JwtError::Expired);
    }

    Ok(claims)
}

/// Random OAuth `state` value. Returns hex-encoded.
pub fn generate_state() -> Result<String, ServiceError> {
    let mut bytes = [0u8; 16];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| ServiceError::Internal(format!("RNG failure: {e}")))?;
    Ok(hex::encode(bytes))
}

// ── Internal ────────────────────────────────────────────────────────────────

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn user() -> SessionUser {
        SessionUser {
            id: 42,
            username: "octocat".into(),
            email: Some("octo@example.com".into()),
            avatar: None,
        }
    }

    #[test]
    fn sign_then_verify_returns_claims() {
        let token = sign_jwt(&user(), SECRET, 1_000);
        let claims = verify_jwt(&token, SECRET, 1_001).unwrap();
        assert_eq!(claims.user(), user());
        assert_eq!(claims.iat, 1_000);
        assert_eq!(claims.exp, 1_000 + JWT_EXPIRY_SECS);
    }

    #[test]
    fn expired_token_is_distinguished() {
        let token = sign_jwt(&user(), SECRET, 1_000);
        let err = verify_jwt(&token, SECRET, 1_000 + JWT_EXPIRY_SECS).unwrap_err();
        assert_eq!(err, JwtError::Expired);
        assert_eq!(ServiceError::from(err).status_code(), 401);
    }

    #[test]
    fn wrong_secret_or_tampering_is_invalid() {
        let token = sign_jwt(&user(), SECRET, 1_000);
        let err = verify_jwt(&token, "other", 1_001).unwrap_err();
        assert!(matches!(err, JwtError::Invalid(_)));
        assert_eq!(ServiceError::from(err).status_code(), 403);

        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        parts[1] = URL_SAFE_NO_PAD.encode(br#"{"id":1,"username":"x","iat":0,"exp":99999999999}"#);
        assert!(matches!(
            verify_jwt(&parts.join("."), SECRET, 1_001),
            Err(JwtError::Invalid(_))
        ));
        assert!(matches!(
            verify_jwt("not-a-jwt", SECRET, 1_001),
            Err(JwtError::Invalid(_))
        ));
    }

    #[test]
    fn states_are_random_hex() {
        let a = generate_state().unwrap();
        let b = generate_state().unwrap();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }
}
