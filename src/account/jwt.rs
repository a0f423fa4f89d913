//! Access-token issuance and validation

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use std::time::{SystemTime, UNIX_EPOCH};

use super::models::Claims;

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    secret: String,
    expiration_minutes: u64,
}

impl JwtConfig {
    pub fn new(secret: String, expiration_minutes: u64) -> Self {
        Self {
            secret,
            expiration_minutes,
        }
    }

    /// Secret and TTL from the environment. The default TTL is deliberately
    /// short; a long-lived access token makes the refresh flow pointless.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").unwrap_or_else(|_| "default-secret-change-me".to_string());
        let expiration_minutes = std::env::var("JWT_EXPIRATION_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);
        Self::new(secret, expiration_minutes)
    }
}

/// JWT manager
#[derive(Clone)]
pub struct JwtManager {
    config: JwtConfig,
}

impl JwtManager {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    /// Create a signed access token carrying the login handle and surrogate key
    pub fn create_token(
        &self,
        user_id: &str,
        user_no: i64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards")
            .as_secs() as usize;

        let expiration = now + (self.config.expiration_minutes as usize * 60);

        let claims = Claims {
            sub: user_id.to_string(),
            user_no,
            exp: expiration,
            iat: now,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )
    }

    /// Verify and decode an access token
    pub fn verify_token(&self, token: &str) -> Result<TokenData<Claims>, jsonwebtoken::errors::Error> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_bytes()),
            &Validation::default(),
        )
    }

    /// Expiry instant embedded in a token we issued
    pub fn expiration_of(&self, token: &str) -> Result<DateTime<Utc>, jsonwebtoken::errors::Error> {
        let data = self.verify_token(token)?;
        DateTime::from_timestamp(data.claims.exp as i64, 0)
            .ok_or_else(|| jsonwebtoken::errors::ErrorKind::InvalidToken.into())
    }
}
