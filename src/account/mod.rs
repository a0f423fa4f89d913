//! Account module
//!
//! Registration, login with password verification, JWT access tokens,
//! server-side refresh-token rotation and mentor-profile storage:
//! - Accounts and profiles persisted in SQLite
//! - Argon2id password hashing
//! - One live refresh token per account, replaced atomically on login
//! - Access tokens signed with HS256, expiry recoverable from the token

pub mod database;
pub mod errors;
pub mod jwt;
pub mod models;
pub mod password;
pub mod refresh;
pub mod routes;
pub mod service;

pub use database::AccountDatabase;
pub use errors::{AccountError, Result};
pub use jwt::{JwtConfig, JwtManager};
pub use models::*;
pub use refresh::{RefreshPolicy, RefreshTokenService};
pub use routes::{account_router, AccountState};
pub use service::AccountService;
