//! Refresh-token lifecycle
//!
//! One live refresh token per account. Login replaces the stored row in
//! place; renewing an access token does not rotate the refresh token. Expired
//! rows are deleted the moment they are detected, there is no background
//! sweep.

use chrono::{DateTime, Utc};

use super::database::AccountDatabase;
use super::errors::{AccountError, Result};
use super::models::{MessageResponse, RefreshToken};

/// Refresh-token policy knobs
#[derive(Debug, Clone)]
pub struct RefreshPolicy {
    pub horizon_days: i64,
}

impl RefreshPolicy {
    pub fn new(horizon_days: i64) -> Self {
        Self { horizon_days }
    }

    pub fn from_env() -> Self {
        let horizon_days = std::env::var("REFRESH_EXPIRATION_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(14);
        Self::new(horizon_days)
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self { horizon_days: 14 }
    }
}

/// Issues, validates and revokes the per-account refresh tokens
#[derive(Clone)]
pub struct RefreshTokenService {
    db: AccountDatabase,
    policy: RefreshPolicy,
}

impl RefreshTokenService {
    pub fn new(db: AccountDatabase, policy: RefreshPolicy) -> Self {
        Self { db, policy }
    }

    /// Issue a fresh token for the account behind `user_id`, overwriting any
    /// prior row for that account in a single upsert.
    pub fn create_refresh_token(&self, user_id: &str) -> Result<RefreshToken> {
        let user = self
            .db
            .find_user_by_handle(user_id)?
            .ok_or_else(|| AccountError::NotFound(format!("user id {}", user_id)))?;

        let token = generate_token();
        let now = Utc::now();
        let expiry_date = (now + chrono::Duration::days(self.policy.horizon_days)).to_rfc3339();
        let created_at = now.to_rfc3339();

        self.db
            .upsert_refresh_token(user.user_no, &token, &expiry_date, &created_at)?;

        self.db
            .find_refresh_token_by_user(user.user_no)?
            .ok_or(AccountError::Database(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Exact-match lookup; absence is a valid outcome, not an error.
    pub fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        Ok(self.db.find_refresh_token(token)?)
    }

    /// Check a stored row against the wall clock. An expired row is deleted
    /// and reported as `Expired`; a live row passes through unchanged.
    pub fn verify_expiration(&self, token: RefreshToken) -> Result<RefreshToken> {
        let expiry = DateTime::parse_from_rfc3339(&token.expiry_date)
            .map(|t| t.with_timezone(&Utc))
            // an unreadable expiry is never trusted
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        if expiry < Utc::now() {
            self.db.delete_refresh_token(&token.token)?;
            log::info!("refresh token for user {} expired, deleted", token.user_no);
            return Err(AccountError::Expired);
        }
        Ok(token)
    }

    /// Delete by token string. Idempotent: a missing row just reports that
    /// the session was already gone.
    pub fn delete_by_token(&self, token: &str) -> Result<MessageResponse> {
        let deleted = self.db.delete_refresh_token(token)?;
        let message = if deleted > 0 {
            "logged out".to_string()
        } else {
            "already logged out".to_string()
        };
        Ok(MessageResponse { message })
    }
}

/// Random opaque token string: 32 bytes from the OS CSPRNG, base64url.
/// Possession of this string alone grants access-token renewal, so it must
/// not be guessable or derived from account data.
fn generate_token() -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    let mut bytes = [0u8; 32];
    getrandom::getrandom(&mut bytes).expect("Failed to generate random bytes");
    URL_SAFE_NO_PAD.encode(bytes)
}
