//! Image analysis, X-ray upload, translation and speech routes.

mod dto;
pub mod handlers;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::xray_routes()
}
