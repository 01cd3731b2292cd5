mod dto;
pub mod handlers;
pub mod service;

use crate::state::AppState;
use axum::Router;

pub use service::PvzService;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::pvz_routes())
        .merge(handlers::reception_routes())
}
