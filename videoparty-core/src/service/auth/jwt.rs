use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::IdentityProvider;
use crate::{config::JwtConfig, models::UserId, Error, Result};

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID. Tokens that carry `user_id` instead of `sub` are accepted.
    #[serde(alias = "user_id")]
    pub sub: String,
    /// Token type, always "access" for tokens issued here
    #[serde(default = "default_token_type")]
    pub typ: String,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

fn default_token_type() -> String {
    "access".to_string()
}

impl Claims {
    pub fn user_id(&self) -> UserId {
        UserId::from_string(self.sub.clone())
    }

    pub fn is_access_token(&self) -> bool {
        self.typ == "access"
    }
}

/// HS256 bearer tokens signed with a shared secret
#[derive(Clone)]
pub struct JwtIdentityProvider {
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    algorithm: Algorithm,
    token_ttl: Duration,
}

impl std::fmt::Debug for JwtIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtIdentityProvider")
            .field("algorithm", &self.algorithm)
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl JwtIdentityProvider {
    pub fn new(secret: &str, token_ttl: Duration) -> Result<Self> {
        if secret.is_empty() {
            return Err(Error::Internal("JWT secret must not be empty".to_string()));
        }

        Ok(Self {
            encoding_key: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding_key: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            algorithm: Algorithm::HS256,
            token_ttl,
        })
    }

    pub fn from_config(config: &JwtConfig) -> Result<Self> {
        let hours = i64::try_from(config.access_token_duration_hours)
            .map_err(|_| Error::InvalidInput("Token duration out of range".to_string()))?;
        Self::new(&config.secret, Duration::hours(hours))
    }

    /// Sign an access token for `user_id`
    pub fn sign_token(&self, user_id: &UserId) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.as_str().to_string(),
            typ: "access".to_string(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };

        let header = Header::new(self.algorithm);
        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| Error::Internal(format!("Failed to sign token: {e}")))
    }

    /// Verify a token and extract claims
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 60; // 60 seconds leeway for clock skew

        let token_data: TokenData<Claims> = decode(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    Error::Unauthenticated("Token expired".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    Error::Unauthenticated("Invalid token".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    Error::Unauthenticated("Invalid token signature".to_string())
                }
                _ => Error::Unauthenticated(format!("Token verification failed: {e}")),
            })?;

        let claims = token_data.claims;
        if !claims.is_access_token() {
            return Err(Error::Unauthenticated("Not an access token".to_string()));
        }
        if claims.sub.is_empty() {
            return Err(Error::Unauthenticated("Token has no subject".to_string()));
        }
        Ok(claims)
    }
}

impl IdentityProvider for JwtIdentityProvider {
    fn authenticate(&self, token: &str) -> Result<UserId> {
        if token.is_empty() {
            return Err(Error::Unauthenticated("Missing credentials".to_string()));
        }
        self.verify_token(token).map(|claims| claims.user_id())
    }
}
