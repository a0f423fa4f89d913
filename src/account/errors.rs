//! Typed account errors
//!
//! Every failure category callers can react to gets its own variant, so tests
//! and the HTTP layer can match on kinds instead of parsing messages.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("user id already taken: {0}")]
    DuplicateHandle(String),

    #[error("profile already registered for user {0}")]
    DuplicateProfile(i64),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("refresh token expired, please log in again")]
    Expired,

    /// Covers both unknown handle and wrong password so the caller cannot
    /// tell which one failed.
    #[error("check your user id or password")]
    InvalidCredentials,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("password hashing error: {0}")]
    PasswordHash(String),

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl AccountError {
    /// True when a rusqlite error is a UNIQUE constraint violation, used to
    /// map lost uniqueness races back to the matching Duplicate variant.
    pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
        matches!(
            err,
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}

pub type Result<T> = std::result::Result<T, AccountError>;
