//! Authentication Service
//!
//! Session token issuing and validation (HS256).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::shared::error::{PlatformError, Result};
use crate::user::entity::User;

/// JWT claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID, hex)
    pub sub: String,

    /// User email, used to resolve the caller's record
    pub email: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    pub iss: String,
    pub aud: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// JWT ID
    pub jti: String,
}

/// Configuration for the auth service
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for HS256
    pub secret_key: String,

    pub issuer: String,

    pub audience: String,

    /// Session token lifetime in seconds
    pub session_token_expiry_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            issuer: "pizzahub".to_string(),
            audience: "pizzahub".to_string(),
            session_token_expiry_secs: 86400 * 30, // 30 days
        }
    }
}

/// Authentication service for session token management
pub struct AuthService {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret_key.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret_key.as_bytes());

        info!(issuer = %config.issuer, "AuthService initialized with HS256");

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn session_ttl_secs(&self) -> i64 {
        self.config.session_token_expiry_secs
    }

    /// Issue a session token for a user
    pub fn issue_session_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.config.session_token_expiry_secs);

        let claims = SessionClaims {
            sub: user.id.to_hex(),
            email: user.email.clone(),
            name: user.name.clone(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| PlatformError::Internal { message: format!("Failed to encode JWT: {}", e) })
    }

    /// Validate a session token and extract claims
    pub fn validate_token(&self, token: &str) -> Result<SessionClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => PlatformError::TokenExpired,
                _ => PlatformError::InvalidToken { message: format!("{}", e) },
            })
    }
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
