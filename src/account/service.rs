//! Account orchestration: signup, login, token renewal, profiles

use chrono::Utc;

use super::database::AccountDatabase;
use super::errors::{AccountError, Result};
use super::jwt::JwtManager;
use super::models::{
    AddProfileRequest, LoginRequest, LoginResponse, LogoutRequest, MessageResponse, Profile,
    ProfileResponse, RefreshTokenRequest, SignupRequest, User, UserResponse,
};
use super::password::{hash_password, verify_password};
use super::refresh::RefreshTokenService;

/// Account service wiring the store, the password hasher, the token signer
/// and the refresh-token service together.
#[derive(Clone)]
pub struct AccountService {
    db: AccountDatabase,
    refresh: RefreshTokenService,
    jwt: JwtManager,
}

impl AccountService {
    pub fn new(db: AccountDatabase, refresh: RefreshTokenService, jwt: JwtManager) -> Self {
        Self { db, refresh, jwt }
    }

    /// Register a new account. The handle must be unused; the password is
    /// hashed before it touches the store.
    pub fn signup(&self, request: SignupRequest) -> Result<UserResponse> {
        if self.db.find_user_by_handle(&request.user_id)?.is_some() {
            return Err(AccountError::DuplicateHandle(request.user_id));
        }

        let password_hash = hash_password(&request.password)
            .map_err(|e| AccountError::PasswordHash(e.to_string()))?;

        let user = User {
            user_no: 0,
            user_id: request.user_id.clone(),
            password_hash,
            user_name: request.user_name,
            user_email: request.user_email,
            user_nickname: request.user_nickname,
            user_sex: request.user_sex,
            user_phone: request.user_phone,
            user_age: request.user_age,
            user_type: request.user_type,
            mentor_profile: request.mentor_profile,
            mentor_univ: request.mentor_univ,
            mentor_class_num: request.mentor_class_num,
            mentor_major: request.mentor_major,
            mentor_intro: request.mentor_intro,
            mentor_mbti: request.mentor_mbti,
            created_at: Utc::now().to_rfc3339(),
        };

        // the UNIQUE constraint closes the race left open by the pre-check
        self.db.create_user(&user).map_err(|e| {
            if AccountError::is_unique_violation(&e) {
                AccountError::DuplicateHandle(request.user_id.clone())
            } else {
                e.into()
            }
        })?;

        let saved = self
            .db
            .find_user_by_handle(&request.user_id)?
            .ok_or_else(|| AccountError::NotFound(format!("user id {}", request.user_id)))?;

        log::info!("new account: {} (user_no {})", saved.user_id, saved.user_no);
        Ok(UserResponse::from(&saved))
    }

    /// Attach the mentor profile to an account; at most one per account.
    pub fn add_profile(&self, request: AddProfileRequest) -> Result<ProfileResponse> {
        let user = self
            .db
            .find_user_by_no(request.user_no)?
            .ok_or_else(|| AccountError::NotFound(format!("user_no {}", request.user_no)))?;

        if self.db.find_profile_by_user(user.user_no)?.is_some() {
            return Err(AccountError::DuplicateProfile(user.user_no));
        }

        let mut profile = Profile {
            profile_no: 0,
            user_no: user.user_no,
            profile_img: request.profile_img,
            univ: request.univ,
            class_num: request.class_num,
            major: request.major,
            intro: request.intro,
            mbti: request.mbti,
        };

        profile.profile_no = self.db.insert_profile(&profile).map_err(|e| {
            if AccountError::is_unique_violation(&e) {
                AccountError::DuplicateProfile(user.user_no)
            } else {
                e.into()
            }
        })?;

        Ok(ProfileResponse::from(&profile))
    }

    /// Verify credentials, rotate the refresh token and mint an access token.
    /// Unknown handle and wrong password are indistinguishable to the caller.
    pub fn login(&self, request: LoginRequest) -> Result<LoginResponse> {
        let user = match self.db.find_user_by_handle(&request.user_id)? {
            Some(user) => user,
            None => return Err(AccountError::InvalidCredentials),
        };

        let matches = verify_password(&request.password, &user.password_hash)
            .map_err(|e| AccountError::PasswordHash(e.to_string()))?;
        if !matches {
            return Err(AccountError::InvalidCredentials);
        }

        let refresh_token = self.refresh.create_refresh_token(&user.user_id)?;
        let access_token = self.jwt.create_token(&user.user_id, user.user_no)?;
        let expiry_date = self.jwt.expiration_of(&access_token)?.to_rfc3339();

        log::info!("login: {} (user_no {})", user.user_id, user.user_no);
        Ok(LoginResponse {
            access_token,
            refresh_token: refresh_token.token,
            expiry_date,
            user_no: user.user_no,
            user_id: user.user_id,
            user_name: Some(user.user_name),
        })
    }

    /// Exchange a stored refresh token for a new access token. An unknown
    /// token string yields `Ok(None)`; an expired one is deleted and fails.
    /// The refresh-token string itself is reused, only login rotates it.
    pub fn refresh_token(&self, request: RefreshTokenRequest) -> Result<Option<LoginResponse>> {
        let row = match self.refresh.find_by_token(&request.refresh_token)? {
            Some(row) => row,
            None => return Ok(None),
        };

        let row = self.refresh.verify_expiration(row)?;

        let user = self
            .db
            .find_user_by_no(row.user_no)?
            .ok_or_else(|| AccountError::NotFound(format!("user_no {}", row.user_no)))?;

        let access_token = self.jwt.create_token(&user.user_id, user.user_no)?;
        let expiry_date = self.jwt.expiration_of(&access_token)?.to_rfc3339();

        Ok(Some(LoginResponse {
            access_token,
            refresh_token: row.token,
            expiry_date,
            user_no: user.user_no,
            user_id: user.user_id,
            user_name: None,
        }))
    }

    /// Drop the stored refresh token; repeat logouts are not an error.
    pub fn logout(&self, request: LogoutRequest) -> Result<MessageResponse> {
        self.refresh.delete_by_token(&request.refresh_token)
    }

    pub fn find_all(&self) -> Result<Vec<UserResponse>> {
        let users = self.db.list_users()?;
        Ok(users.iter().map(UserResponse::from).collect())
    }

    pub fn find_user(&self, user_no: i64) -> Result<UserResponse> {
        let user = self
            .db
            .find_user_by_no(user_no)?
            .ok_or_else(|| AccountError::NotFound(format!("user_no {}", user_no)))?;
        Ok(UserResponse::from(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::jwt::JwtConfig;
    use crate::account::models::{UserSex, UserType};
    use crate::account::refresh::RefreshPolicy;
    use assert_matches::assert_matches;

    fn service() -> AccountService {
        let db = AccountDatabase::in_memory().unwrap();
        let refresh = RefreshTokenService::new(db.clone(), RefreshPolicy::new(14));
        let jwt = JwtManager::new(JwtConfig::new("test-secret".to_string(), 60));
        AccountService::new(db, refresh, jwt)
    }

    fn signup_request(user_id: &str) -> SignupRequest {
        SignupRequest {
            user_id: user_id.to_string(),
            password: "p1".to_string(),
            user_name: "Alice".to_string(),
            user_email: "alice@example.com".to_string(),
            user_nickname: "al".to_string(),
            user_sex: UserSex::Female,
            user_phone: "010-0000-0000".to_string(),
            user_age: 24,
            user_type: UserType::Mentor,
            mentor_profile: None,
            mentor_univ: Some("Hanium University".to_string()),
            mentor_class_num: Some("21".to_string()),
            mentor_major: Some("CS".to_string()),
            mentor_intro: None,
            mentor_mbti: None,
        }
    }

    #[test]
    fn test_signup_then_duplicate() {
        let service = service();

        let view = service.signup(signup_request("alice")).unwrap();
        assert_eq!(view.user_id, "alice");

        let err = service.signup(signup_request("alice")).unwrap_err();
        assert_matches!(err, AccountError::DuplicateHandle(handle) if handle == "alice");
    }

    #[test]
    fn test_login_generic_failure() {
        let service = service();
        service.signup(signup_request("alice")).unwrap();

        let unknown = service
            .login(LoginRequest {
                user_id: "bob".to_string(),
                password: "p1".to_string(),
            })
            .unwrap_err();
        let wrong = service
            .login(LoginRequest {
                user_id: "alice".to_string(),
                password: "wrong".to_string(),
            })
            .unwrap_err();

        // both failures collapse to the same variant and message
        assert_matches!(unknown, AccountError::InvalidCredentials);
        assert_matches!(wrong, AccountError::InvalidCredentials);
    }

    #[test]
    fn test_login_success_issues_both_tokens() {
        let service = service();
        service.signup(signup_request("alice")).unwrap();

        let response = service
            .login(LoginRequest {
                user_id: "alice".to_string(),
                password: "p1".to_string(),
            })
            .unwrap();

        assert_eq!(response.user_id, "alice");
        assert_eq!(response.user_name.as_deref(), Some("Alice"));
        assert!(!response.access_token.is_empty());
        assert!(!response.refresh_token.is_empty());
    }

    #[test]
    fn test_second_login_invalidates_prior_refresh_token() {
        let service = service();
        service.signup(signup_request("alice")).unwrap();

        let login = |s: &AccountService| {
            s.login(LoginRequest {
                user_id: "alice".to_string(),
                password: "p1".to_string(),
            })
            .unwrap()
        };
        let first = login(&service);
        let second = login(&service);

        let stale = service
            .refresh_token(RefreshTokenRequest {
                refresh_token: first.refresh_token,
            })
            .unwrap();
        assert!(stale.is_none());

        let live = service
            .refresh_token(RefreshTokenRequest {
                refresh_token: second.refresh_token.clone(),
            })
            .unwrap()
            .unwrap();
        assert_eq!(live.refresh_token, second.refresh_token);
    }

    #[test]
    fn test_refresh_reuses_token_string() {
        let service = service();
        service.signup(signup_request("alice")).unwrap();
        let login = service
            .login(LoginRequest {
                user_id: "alice".to_string(),
                password: "p1".to_string(),
            })
            .unwrap();

        let renewed = service
            .refresh_token(RefreshTokenRequest {
                refresh_token: login.refresh_token.clone(),
            })
            .unwrap()
            .unwrap();

        assert_eq!(renewed.refresh_token, login.refresh_token);
        assert!(renewed.user_name.is_none());
        assert_eq!(renewed.user_no, login.user_no);
    }

    #[test]
    fn test_logout_then_refresh_yields_none() {
        let service = service();
        service.signup(signup_request("alice")).unwrap();
        let login = service
            .login(LoginRequest {
                user_id: "alice".to_string(),
                password: "p1".to_string(),
            })
            .unwrap();

        service
            .logout(LogoutRequest {
                refresh_token: login.refresh_token.clone(),
            })
            .unwrap();

        let renewed = service
            .refresh_token(RefreshTokenRequest {
                refresh_token: login.refresh_token,
            })
            .unwrap();
        assert!(renewed.is_none());
    }

    #[test]
    fn test_add_profile_twice() {
        let service = service();
        let view = service.signup(signup_request("alice")).unwrap();

        let request = || AddProfileRequest {
            user_no: view.user_no,
            profile_img: None,
            univ: Some("Hanium University".to_string()),
            class_num: Some("21".to_string()),
            major: Some("CS".to_string()),
            intro: Some("hello".to_string()),
            mbti: Some("INTJ".to_string()),
        };

        let profile = service.add_profile(request()).unwrap();
        assert_eq!(profile.user_no, view.user_no);

        let err = service.add_profile(request()).unwrap_err();
        assert_matches!(err, AccountError::DuplicateProfile(no) if no == view.user_no);
    }

    #[test]
    fn test_add_profile_unknown_user() {
        let service = service();
        let err = service
            .add_profile(AddProfileRequest {
                user_no: 999,
                profile_img: None,
                univ: None,
                class_num: None,
                major: None,
                intro: None,
                mbti: None,
            })
            .unwrap_err();
        assert_matches!(err, AccountError::NotFound(_));
    }

    #[test]
    fn test_find_all_and_find_user() {
        let service = service();
        let alice = service.signup(signup_request("alice")).unwrap();
        let mut bob_request = signup_request("bob");
        bob_request.user_name = "Bob".to_string();
        service.signup(bob_request).unwrap();

        let all = service.find_all().unwrap();
        assert_eq!(all.len(), 2);

        let found = service.find_user(alice.user_no).unwrap();
        assert_eq!(found.user_id, "alice");

        let err = service.find_user(999).unwrap_err();
        assert_matches!(err, AccountError::NotFound(_));
    }
}
