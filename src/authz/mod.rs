use axum::{
    extract::{FromRef, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::auth::{jwt::JwtKeys, repo::Role};
use crate::error::AuthError;
use crate::state::AppState;

pub mod permissions;

/// Authenticated identity attached to the request once the guard has
/// passed, for downstream handlers to consume.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: i64,
    pub role_id: Option<i64>,
    pub role: Option<String>,
}

/// Guard for role-agnostic protected routes.
pub async fn require_authenticated(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    authorize(&state, permissions::AUTHENTICATED, req, next).await
}

/// Guard for account-administration routes.
pub async fn require_account_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    authorize(&state, permissions::MANAGE_ACCOUNTS, req, next).await
}

/// The authorization gate: verify the bearer token, resolve the role
/// claim to a name, check it against the route's allowed set, and
/// attach the identity to the request. Pure gating, no retries, no
/// partial success.
async fn authorize(
    state: &AppState,
    allowed: &'static [&'static str],
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::Unauthenticated)?;

    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .ok_or(AuthError::Unauthenticated)?;

    let keys = JwtKeys::from_ref(state);
    let claims = keys.verify(token).map_err(|_| {
        warn!("invalid or expired session token");
        AuthError::Unauthenticated
    })?;

    let role = match claims.role {
        Some(role_id) => Role::find_by_id(&state.db, role_id)
            .await?
            .map(|r| r.name),
        None => None,
    };

    if !permissions::permits(allowed, role.as_deref()) {
        warn!(user_id = %claims.sub, role = ?role, "role not allowed for route");
        return Err(AuthError::Forbidden);
    }

    req.extensions_mut().insert(CurrentUser {
        user_id: claims.sub,
        role_id: claims.role,
        role,
    });
    Ok(next.run(req).await)
}
