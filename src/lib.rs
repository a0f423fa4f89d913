//! # Mentor Hub Account Library
//!
//! A small user-account backend for a mentor/mentee matching service.
//!
//! ## Features
//!
//! - **Accounts**: registration with duplicate-handle rejection, Argon2id
//!   password hashing, safe read projections
//! - **Tokens**: JWT access tokens plus server-side refresh tokens with
//!   at-most-one live token per account
//! - **Profiles**: one mentor profile per account, enforced by the store
//! - **HTTP API**: axum router mapping typed errors to status codes
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mentor_hub::account::{account_router, AccountState};
//! use std::sync::Arc;
//!
//! let state = Arc::new(AccountState::new("data/accounts.db").unwrap());
//! let app = axum::Router::new().nest("/api/user", account_router(state));
//! ```

/// Accounts, tokens, profiles and the HTTP layer
pub mod account;

pub use account::{
    account_router, AccountDatabase, AccountError, AccountService, AccountState, JwtConfig,
    JwtManager, RefreshPolicy, RefreshTokenService, Result,
};

// ============================================================================
// LIBRARY VERSION INFO
// ============================================================================

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
