use serde::{Deserialize, Serialize};

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response returned after a successful login. Field casing mirrors
/// what the clients already consume.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "roleId")]
    pub role_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    #[serde(rename = "profileImage")]
    pub profile_image: Option<String>,
    #[serde(rename = "resetPassword")]
    pub reset_password: bool,
}

/// Request body for forgot-password.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Request body for reset-code validation.
#[derive(Debug, Deserialize)]
pub struct ValidateCodeRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateCodeResponse {
    #[serde(rename = "userId")]
    pub user_id: i64,
}

/// Request body for the password-change endpoint. Either the user id or
/// the email identifies the account (reset completion sends the id the
/// code validation returned; the forced-change screen sends the email).
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<i64>,
    pub email: Option<String>,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Profile of the authenticated caller.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub district: Option<String>,
    pub sector: Option<String>,
    #[serde(rename = "profileImage")]
    pub profile_image: Option<String>,
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_uses_the_client_field_names() {
        let response = LoginResponse {
            token: "t".into(),
            user_id: 1,
            role_id: Some(2),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            profile_image: None,
            reset_password: false,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"userId\""));
        assert!(json.contains("\"roleId\""));
        assert!(json.contains("\"first_name\""));
        assert!(json.contains("\"last_name\""));
        assert!(json.contains("\"profileImage\""));
        assert!(json.contains("\"resetPassword\""));
    }

    #[test]
    fn change_password_accepts_either_identifier() {
        let by_id: ChangePasswordRequest =
            serde_json::from_str(r#"{"userId": 7, "newPassword": "s3cret!pw"}"#).unwrap();
        assert_eq!(by_id.user_id, Some(7));
        assert_eq!(by_id.email, None);

        let by_email: ChangePasswordRequest =
            serde_json::from_str(r#"{"email": "a@b.com", "newPassword": "s3cret!pw"}"#).unwrap();
        assert_eq!(by_email.user_id, None);
        assert_eq!(by_email.email.as_deref(), Some("a@b.com"));
    }

    #[test]
    fn validate_code_response_exposes_user_id() {
        let json = serde_json::to_string(&ValidateCodeResponse { user_id: 9 }).unwrap();
        assert_eq!(json, r#"{"userId":9}"#);
    }
}
