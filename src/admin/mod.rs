use crate::state::AppState;
use axum::{middleware, routing::put, Router};

pub mod handlers;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/users/:id/unlock", put(handlers::unlock_user))
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::authz::require_account_admin,
        ))
}
