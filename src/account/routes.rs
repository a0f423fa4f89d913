//! Account REST API routes
//!
//! The only place errors become HTTP status codes; the service layer stays
//! transport-free.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use super::database::AccountDatabase;
use super::errors::AccountError;
use super::jwt::{JwtConfig, JwtManager};
use super::models::{
    AddProfileRequest, LoginRequest, LogoutRequest, MessageResponse, RefreshTokenRequest,
    SignupRequest,
};
use super::refresh::{RefreshPolicy, RefreshTokenService};
use super::service::AccountService;

/// Shared account state
pub struct AccountState {
    pub service: AccountService,
}

impl AccountState {
    pub fn new(db_path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let db = AccountDatabase::new(db_path)?;
        let refresh = RefreshTokenService::new(db.clone(), RefreshPolicy::from_env());
        let jwt = JwtManager::new(JwtConfig::from_env());

        Ok(Self {
            service: AccountService::new(db, refresh, jwt),
        })
    }

    pub fn in_memory() -> Result<Self, Box<dyn std::error::Error>> {
        let db = AccountDatabase::in_memory()?;
        let refresh = RefreshTokenService::new(db.clone(), RefreshPolicy::from_env());
        let jwt = JwtManager::new(JwtConfig::from_env());

        Ok(Self {
            service: AccountService::new(db, refresh, jwt),
        })
    }
}

/// Create account router
pub fn account_router(state: Arc<AccountState>) -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/refresh", post(refresh_token))
        .route("/logout", post(logout))
        .route("/profile", post(add_profile))
        .route("/list", get(list_users))
        .route("/{user_no}", get(get_user))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

fn status_for(err: &AccountError) -> StatusCode {
    match err {
        AccountError::DuplicateHandle(_) | AccountError::DuplicateProfile(_) => {
            StatusCode::CONFLICT
        }
        AccountError::NotFound(_) => StatusCode::NOT_FOUND,
        AccountError::Expired | AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AccountError::Database(_) | AccountError::PasswordHash(_) | AccountError::Token(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(err: &AccountError) -> impl IntoResponse {
    let status = status_for(err);
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        // internal detail stays in the logs
        log::error!("internal error: {}", err);
        "internal server error".to_string()
    } else {
        err.to_string()
    };
    (status, Json(MessageResponse { message }))
}

/// POST /api/user/signup - Register a new account
async fn signup(
    State(state): State<Arc<AccountState>>,
    Json(request): Json<SignupRequest>,
) -> impl IntoResponse {
    match state.service.signup(request) {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

/// POST /api/user/login - Verify credentials and issue tokens
async fn login(
    State(state): State<Arc<AccountState>>,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    match state.service.login(request) {
        Ok(response) => Json(response).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

/// POST /api/user/refresh - Exchange a refresh token for a new access token
async fn refresh_token(
    State(state): State<Arc<AccountState>>,
    Json(request): Json<RefreshTokenRequest>,
) -> impl IntoResponse {
    match state.service.refresh_token(request) {
        Ok(Some(response)) => Json(response).into_response(),
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            Json(MessageResponse {
                message: "unknown refresh token, please log in again".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

/// POST /api/user/logout - Revoke the stored refresh token
async fn logout(
    State(state): State<Arc<AccountState>>,
    Json(request): Json<LogoutRequest>,
) -> impl IntoResponse {
    match state.service.logout(request) {
        Ok(message) => Json(message).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

/// POST /api/user/profile - Attach a mentor profile to an account
async fn add_profile(
    State(state): State<Arc<AccountState>>,
    Json(request): Json<AddProfileRequest>,
) -> impl IntoResponse {
    match state.service.add_profile(request) {
        Ok(profile) => (StatusCode::CREATED, Json(profile)).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

/// GET /api/user/list - List all accounts
async fn list_users(State(state): State<Arc<AccountState>>) -> impl IntoResponse {
    match state.service.find_all() {
        Ok(users) => Json(users).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

/// GET /api/user/{user_no} - Single account view
async fn get_user(
    State(state): State<Arc<AccountState>>,
    Path(user_no): Path<i64>,
) -> impl IntoResponse {
    match state.service.find_user(user_no) {
        Ok(user) => Json(user).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}
