use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tracing::{info, instrument};

use crate::{
    auth::{dto::MessageResponse, lockout, repo::User},
    authz::CurrentUser,
    error::AuthError,
    state::AppState,
};

/// Explicit administrative unlock: zeroes the account's failed-login
/// counter through the lockout tracker's reset primitive.
#[instrument(skip(state, current))]
pub async fn unlock_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AuthError> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    lockout::unlock(&state.db, user.id).await?;

    info!(user_id = %user.id, unlocked_by = %current.user_id, "account unlocked");
    Ok(Json(MessageResponse {
        message: "Account unlocked".into(),
    }))
}
