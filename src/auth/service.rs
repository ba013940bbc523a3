use axum::extract::FromRef;
use tracing::{info, warn};

use crate::auth::dto::LoginResponse;
use crate::auth::jwt::JwtKeys;
use crate::auth::lockout::{self, LockoutPolicy, LockoutState};
use crate::auth::{password, repo::User};
use crate::error::AuthError;
use crate::state::AppState;

/// Verify credentials and issue a session token.
///
/// Locked accounts are rejected before any password work, so a locked
/// account answers in constant time whatever the guess. A failed check
/// bumps the counter atomically; the attempt whose post-increment count
/// reaches the threshold already answers `AccountLocked`. A successful
/// login zeroes the counter. The `resetPassword` flag rides along in
/// the response so the client can route the user to the forced-change
/// screen before the dashboard.
pub async fn login(state: &AppState, email: &str, plain: &str) -> Result<LoginResponse, AuthError> {
    let user = User::find_by_email(&state.db, email)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    let policy = LockoutPolicy::from(&state.config.security);
    if policy.is_locked(user.login_attempts) {
        warn!(user_id = %user.id, "login rejected: account locked");
        return Err(AuthError::AccountLocked);
    }

    let ok = password::verify_password(plain, &user.password)?;
    if !ok {
        return match lockout::register_failure(&state.db, policy, user.id).await? {
            LockoutState::Locked => Err(AuthError::AccountLocked),
            LockoutState::Active => Err(AuthError::InvalidCredentials),
        };
    }

    lockout::unlock(&state.db, user.id).await?;

    let keys = JwtKeys::from_ref(state);
    let token = keys.sign(user.id, user.role_id)?;

    if user.reset_password {
        info!(user_id = %user.id, "login with forced password change pending");
    } else {
        info!(user_id = %user.id, "user logged in");
    }

    Ok(LoginResponse {
        token,
        user_id: user.id,
        role_id: user.role_id,
        first_name: user.first_name,
        last_name: user.last_name,
        profile_image: user.profile_image,
        reset_password: user.reset_password,
    })
}

/// Tokens are self-contained and short-lived, so there is nothing to
/// revoke server-side; logout exists for the audit trail and to tell
/// the client to drop its stored token.
pub fn logout() {
    info!("user logged out");
}
