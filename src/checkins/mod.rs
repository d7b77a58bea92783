mod dto;
pub mod handlers;
pub mod repo;
pub mod streak;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/checkins", post(handlers::create_check_in))
        .route("/checkins/habit/:habit_id", get(handlers::list_check_ins))
        .route("/checkins/recent", get(handlers::recent_check_ins))
        .route("/checkins/:id", delete(handlers::delete_check_in))
}
