mod dto;
pub mod handlers;
pub mod repo;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/search", get(handlers::search_users))
        .route(
            "/users/follow/:user_id",
            post(handlers::follow_user).delete(handlers::unfollow_user),
        )
        .route("/users/following", get(handlers::list_following))
        .route("/users/feed", get(handlers::get_feed))
        .route("/users/:user_id/habits", get(handlers::followed_user_habits))
}
