use axum::{
    extract::State,
    routing::{get, post, put},
    Extension, Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, LoginResponse,
            MeResponse, MessageResponse, ValidateCodeRequest, ValidateCodeResponse,
        },
        repo::User,
        reset, service,
    },
    authz::CurrentUser,
    error::AuthError,
    state::AppState,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/forgot-password", put(forgot_password))
        .route("/auth/validate-code", post(validate_code))
        .route("/auth/change-password", put(change_password))
        .route("/auth/logout", post(logout))
}

pub fn me_route() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        return Err(AuthError::BadRequest("Invalid email".into()));
    }

    let response = service::login(&state, &payload.email, &payload.password).await?;
    Ok(Json(response))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(mut payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        return Err(AuthError::BadRequest("Invalid email".into()));
    }

    reset::forgot_password(&state, &payload.email).await?;
    Ok(Json(MessageResponse {
        message: "Reset code sent".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn validate_code(
    State(state): State<AppState>,
    Json(payload): Json<ValidateCodeRequest>,
) -> Result<Json<ValidateCodeResponse>, AuthError> {
    let user_id = reset::validate_code(&state.db, payload.code.trim()).await?;
    Ok(Json(ValidateCodeResponse { user_id }))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    if payload.new_password.len() < 8 {
        return Err(AuthError::BadRequest("Password too short".into()));
    }

    reset::change_password(
        &state,
        payload.user_id,
        payload.email.as_deref(),
        &payload.new_password,
    )
    .await?;
    Ok(Json(MessageResponse {
        message: "Password changed".into(),
    }))
}

#[instrument]
pub async fn logout() -> Json<MessageResponse> {
    service::logout();
    Json(MessageResponse {
        message: "Logged out".into(),
    })
}

#[instrument(skip(state, current))]
pub async fn me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<MeResponse>, AuthError> {
    let user = User::find_by_id(&state.db, current.user_id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    Ok(Json(MeResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        phone: user.phone,
        district: user.district,
        sector: user.sector,
        profile_image: user.profile_image,
        role: current.role,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(is_valid_email("coordinator@district.example"));
        assert!(is_valid_email("j.doe+tag@example.co"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("two words@example.com"));
    }
}
