mod dto;
pub mod handlers;
pub mod repo;
mod stats;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/habits",
            get(handlers::list_habits).post(handlers::create_habit),
        )
        .route("/habits/stats", get(handlers::get_stats))
        .route(
            "/habits/:id",
            put(handlers::update_habit).delete(handlers::delete_habit),
        )
        .route("/habits/:id/recount", post(handlers::recount_habit))
}
