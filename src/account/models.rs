//! Account data models

use serde::{Deserialize, Serialize};

/// User account row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_no: i64,
    pub user_id: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub user_name: String,
    pub user_email: String,
    pub user_nickname: String,
    pub user_sex: UserSex,
    pub user_phone: String,
    pub user_age: i64,
    pub user_type: UserType,
    pub mentor_profile: Option<String>,
    pub mentor_univ: Option<String>,
    pub mentor_class_num: Option<String>,
    pub mentor_major: Option<String>,
    pub mentor_intro: Option<String>,
    pub mentor_mbti: Option<String>,
    pub created_at: String,
}

/// Account role tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserType {
    Mentor,
    Mentee,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Mentor => "MENTOR",
            UserType::Mentee => "MENTEE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "MENTOR" => Some(UserType::Mentor),
            "MENTEE" => Some(UserType::Mentee),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserSex {
    Male,
    Female,
}

impl UserSex {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserSex::Male => "MALE",
            UserSex::Female => "FEMALE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "MALE" => Some(UserSex::Male),
            "FEMALE" => Some(UserSex::Female),
            _ => None,
        }
    }
}

/// Mentor profile row (1:1 with a user)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub profile_no: i64,
    pub user_no: i64,
    pub profile_img: Option<String>,
    pub univ: Option<String>,
    pub class_num: Option<String>,
    pub major: Option<String>,
    pub intro: Option<String>,
    pub mbti: Option<String>,
}

/// Server-side refresh token row. The token string is the sole credential
/// needed to mint new access tokens until it expires or is deleted.
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub token_no: i64,
    pub user_no: i64,
    pub token: String,
    pub expiry_date: String,
    pub created_at: String,
}

/// JWT claims carried by access tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // login handle
    pub user_no: i64,
    pub exp: usize, // expiration timestamp
    pub iat: usize, // issued at timestamp
}

/// API request/response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub user_id: String,
    pub password: String,
    pub user_name: String,
    pub user_email: String,
    pub user_nickname: String,
    pub user_sex: UserSex,
    pub user_phone: String,
    pub user_age: i64,
    pub user_type: UserType,
    pub mentor_profile: Option<String>,
    pub mentor_univ: Option<String>,
    pub mentor_class_num: Option<String>,
    pub mentor_major: Option<String>,
    pub mentor_intro: Option<String>,
    pub mentor_mbti: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_id: String,
    pub password: String,
}

/// Safe account view, never carries the password hash
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_no: i64,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub user_sex: UserSex,
    pub user_phone: String,
    pub user_type: UserType,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            user_no: user.user_no,
            user_id: user.user_id.clone(),
            user_name: user.user_name.clone(),
            user_email: user.user_email.clone(),
            user_sex: user.user_sex,
            user_phone: user.user_phone.clone(),
            user_type: user.user_type,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddProfileRequest {
    pub user_no: i64,
    pub profile_img: Option<String>,
    pub univ: Option<String>,
    pub class_num: Option<String>,
    pub major: Option<String>,
    pub intro: Option<String>,
    pub mbti: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub profile_no: i64,
    pub user_no: i64,
    pub profile_img: Option<String>,
    pub univ: Option<String>,
    pub class_num: Option<String>,
    pub major: Option<String>,
    pub intro: Option<String>,
    pub mbti: Option<String>,
}

impl From<&Profile> for ProfileResponse {
    fn from(profile: &Profile) -> Self {
        Self {
            profile_no: profile.profile_no,
            user_no: profile.user_no,
            profile_img: profile.profile_img.clone(),
            univ: profile.univ.clone(),
            class_num: profile.class_num.clone(),
            major: profile.major.clone(),
            intro: profile.intro.clone(),
            mbti: profile.mbti.clone(),
        }
    }
}

/// Successful login or token renewal. `user_name` is only present on login;
/// renewal reuses the stored refresh-token string unchanged.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expiry_date: String,
    pub user_no: i64,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_type_round_trip() {
        assert_eq!(UserType::from_str("MENTOR"), Some(UserType::Mentor));
        assert_eq!(UserType::from_str("mentee"), Some(UserType::Mentee));
        assert_eq!(UserType::from_str("admin"), None);
        assert_eq!(UserType::Mentor.as_str(), "MENTOR");
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let user = User {
            user_no: 1,
            user_id: "alice".to_string(),
            password_hash: "secret-hash".to_string(),
            user_name: "Alice".to_string(),
            user_email: "alice@example.com".to_string(),
            user_nickname: "al".to_string(),
            user_sex: UserSex::Female,
            user_phone: "010-0000-0000".to_string(),
            user_age: 24,
            user_type: UserType::Mentor,
            mentor_profile: None,
            mentor_univ: None,
            mentor_class_num: None,
            mentor_major: None,
            mentor_intro: None,
            mentor_mbti: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
    }

    #[test]
    fn test_login_response_omits_absent_user_name() {
        let renewed = LoginResponse {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expiry_date: chrono::Utc::now().to_rfc3339(),
            user_no: 7,
            user_id: "alice".to_string(),
            user_name: None,
        };

        let json = serde_json::to_string(&renewed).unwrap();
        assert!(!json.contains("userName"));
        assert!(json.contains("accessToken"));
    }
}
