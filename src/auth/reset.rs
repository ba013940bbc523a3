use rand::{rngs::OsRng, Rng};
use sqlx::PgPool;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{info, warn};

use crate::auth::{password, repo::User};
use crate::error::AuthError;
use crate::state::AppState;

/// Retries when a freshly generated code collides with another user's
/// active code on the partial unique index.
const CODE_RETRIES: u32 = 3;

/// Six decimal digits from the OS entropy source, zero-padded so every
/// code is human-enterable at fixed width.
pub fn generate_code() -> String {
    format!("{:06}", OsRng.gen_range(0..1_000_000))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// Begin the forgot-password workflow: issue a one-time code for the
/// account and hand it to the delivery collaborator. Locked accounts
/// are allowed through, since completing the reset is their unlock
/// path. Fails with `AlreadyPending` while an unexpired code exists.
pub async fn forgot_password(state: &AppState, email: &str) -> Result<(), AuthError> {
    let user = User::find_by_email(&state.db, email)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    let ttl = TimeDuration::minutes(state.config.security.reset_code_ttl_minutes);
    let mut code = generate_code();
    let mut retries = CODE_RETRIES;
    loop {
        let expires = OffsetDateTime::now_utc() + ttl;
        match User::claim_reset_code(&state.db, user.id, &code, expires).await {
            Ok(true) => break,
            Ok(false) => {
                warn!(user_id = %user.id, "reset code already pending");
                return Err(AuthError::AlreadyPending);
            }
            Err(e) if is_unique_violation(&e) && retries > 0 => {
                retries -= 1;
                code = generate_code();
            }
            Err(e) => return Err(AuthError::Database(e)),
        }
    }

    state
        .mailer
        .send_reset_code(&user.email, &user.first_name, &code)
        .await
        .map_err(AuthError::Internal)?;

    info!(user_id = %user.id, "password reset code issued");
    Ok(())
}

/// Resolve a submitted code to its user. The code stays in place: the
/// workflow keeps it valid until the password change consumes it, so a
/// user who validates and then abandons the flow can validate again.
pub async fn validate_code(db: &PgPool, code: &str) -> Result<i64, AuthError> {
    let user = User::find_by_active_reset_code(db, code)
        .await?
        .ok_or(AuthError::InvalidCode)?;
    info!(user_id = %user.id, "reset code validated");
    Ok(user.id)
}

/// Complete a reset (or a forced change): store the new hash, zero the
/// lockout counter, consume the code and lift the forced-change flag,
/// all in one store write. Refused unless a reset is actually in
/// flight for the account.
pub async fn change_password(
    state: &AppState,
    user_id: Option<i64>,
    email: Option<&str>,
    new_password: &str,
) -> Result<(), AuthError> {
    let user = match (user_id, email) {
        (Some(id), _) => User::find_by_id(&state.db, id).await?,
        (None, Some(email)) => User::find_by_email(&state.db, email).await?,
        (None, None) => {
            return Err(AuthError::BadRequest("userId or email is required".into()))
        }
    }
    .ok_or(AuthError::UserNotFound)?;

    let now = OffsetDateTime::now_utc();
    if !user.has_active_reset_code(now) && !user.reset_password {
        warn!(user_id = %user.id, "password change refused: no reset in flight");
        return Err(AuthError::InvalidCode);
    }

    let hash = password::hash_password(new_password)?;
    User::set_password(&state.db, user.id, &hash).await?;

    info!(user_id = %user.id, "password changed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn small_values_are_zero_padded() {
        // gen_range can produce values under 100000; formatting must
        // keep the width fixed.
        let code = format!("{:06}", 42u32);
        assert_eq!(code, "000042");
    }

    #[test]
    fn row_not_found_is_not_a_unique_violation() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
