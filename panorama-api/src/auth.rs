//! Authentication: bearer tokens and password hashing.
//!
//! Login and registration issue JWT bearer tokens; protected routes
//! validate them. Passwords are stored as hex-encoded salted SHA-256
//! digests next to their per-user salt, never in the clear.

use crate::error::{ApiError, ApiResult};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use panorama_core::{EntityId, User};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Authentication configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret used to sign and verify tokens.
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub token_ttl_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "panorama-dev-secret".to_string(),
            token_ttl_secs: 86_400, // 24 hours
        }
    }
}

impl AuthConfig {
    /// Create AuthConfig from environment variables.
    ///
    /// Environment variables:
    /// - `PANORAMA_JWT_SECRET`: signing secret (default: dev secret)
    /// - `PANORAMA_TOKEN_TTL_SECS`: token lifetime (default: 86400)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            jwt_secret: std::env::var("PANORAMA_JWT_SECRET").unwrap_or(defaults.jwt_secret),
            token_ttl_secs: std::env::var("PANORAMA_TOKEN_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.token_ttl_secs),
        }
    }
}

// ============================================================================
// CLAIMS AND CONTEXT
// ============================================================================

/// JWT claims carried by issued tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: String,
    pub username: String,
    /// Issued-at, Unix seconds.
    pub iat: i64,
    /// Expiry, Unix seconds.
    pub exp: i64,
}

/// Authenticated caller identity, injected into request extensions by the
/// auth middleware.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: EntityId,
    pub username: String,
}

// ============================================================================
// TOKEN OPERATIONS
// ============================================================================

/// Issue a bearer token for a user.
pub fn generate_token(config: &AuthConfig, user: &User) -> ApiResult<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user.user_id.to_string(),
        username: user.username.clone(),
        iat: now,
        exp: now + config.token_ttl_secs,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!(error = %e, "failed to sign token");
        ApiError::internal_error("Internal server error")
    })
}

/// Validate a bearer token and extract the caller identity.
pub fn validate_token(config: &AuthConfig, token: &str) -> ApiResult<AuthContext> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => ApiError::token_expired(),
        _ => ApiError::invalid_token("Invalid authentication token"),
    })?;

    let user_id = data
        .claims
        .sub
        .parse()
        .map_err(|_| ApiError::invalid_token("Invalid subject claim"))?;

    Ok(AuthContext {
        user_id,
        username: data.claims.username,
    })
}

/// Extract the token from an `Authorization: Bearer ...` header value.
pub fn extract_bearer(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

// ============================================================================
// PASSWORD OPERATIONS
// ============================================================================

/// Generate a fresh random salt, hex-encoded.
pub fn generate_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Derive the stored digest for a password and salt.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check a candidate password against a user's stored digest.
pub fn verify_password(user: &User, password: &str) -> bool {
    hash_password(password, &user.salt) == user.password_hash
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_user() -> User {
        let salt = generate_salt();
        let hash = hash_password("password123", &salt);
        User::new("alice", &hash, &salt)
    }

    #[test]
    fn test_password_roundtrip() {
        let user = make_user();
        assert!(verify_password(&user, "password123"));
        assert!(!verify_password(&user, "password124"));
    }

    #[test]
    fn test_salts_differ_between_users() {
        assert_ne!(generate_salt(), generate_salt());
    }

    #[test]
    fn test_token_roundtrip() {
        let config = AuthConfig::default();
        let user = make_user();

        let token = generate_token(&config, &user).unwrap();
        let ctx = validate_token(&config, &token).unwrap();

        assert_eq!(ctx.user_id, user.user_id);
        assert_eq!(ctx.username, "alice");
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let config = AuthConfig::default();
        let user = make_user();
        let token = generate_token(&config, &user).unwrap();

        let other = AuthConfig {
            jwt_secret: "different-secret".to_string(),
            ..AuthConfig::default()
        };
        assert!(validate_token(&other, &token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = AuthConfig {
            token_ttl_secs: -120,
            ..AuthConfig::default()
        };
        let user = make_user();
        let token = generate_token(&config, &user).unwrap();

        let err = validate_token(&config, &token).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::TokenExpired);
    }
}
