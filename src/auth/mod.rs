use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod jwt;
pub mod lockout;
pub mod password;
pub mod repo;
pub mod reset;
pub mod service;

pub fn router() -> Router<AppState> {
    handlers::router()
}
