use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{FeedQuery, SearchQuery, SEARCH_LIMIT};
use super::repo::{self, FeedEntry, PublicHabit, UserSummary};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn search_users(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let term = query.term()?;
    let users = repo::search(&state.db, term, user_id, SEARCH_LIMIT).await?;
    Ok(Json(users))
}

#[instrument(skip(state))]
pub async fn follow_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(target): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    repo::follow(&state.db, user_id, target).await?;
    info!(user_id = %user_id, target = %target, "followed user");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn unfollow_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(target): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    repo::unfollow(&state.db, user_id, target).await?;
    info!(user_id = %user_id, target = %target, "unfollowed user");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn list_following(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let users = repo::following(&state.db, user_id).await?;
    Ok(Json(users))
}

#[instrument(skip(state))]
pub async fn get_feed(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<FeedQuery>,
) -> Result<Json<Vec<FeedEntry>>, ApiError> {
    let entries = repo::feed(&state.db, user_id, q.limit.clamp(1, 100)).await?;
    Ok(Json(entries))
}

#[instrument(skip(state))]
pub async fn followed_user_habits(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(target): Path<Uuid>,
) -> Result<Json<Vec<PublicHabit>>, ApiError> {
    if !repo::is_following(&state.db, user_id, target).await? {
        return Err(ApiError::MustFollow);
    }
    let habits = repo::public_habits(&state.db, target).await?;
    Ok(Json(habits))
}
