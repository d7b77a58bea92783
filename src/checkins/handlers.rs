use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{CheckInPage, CreateCheckInRequest, PageQuery, Pagination, RecentQuery};
use super::repo::{self, CheckIn, RecentCheckIn};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::habits;
use crate::state::AppState;

#[instrument(skip(state, payload))]
pub async fn create_check_in(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(mut payload): Json<CreateCheckInRequest>,
) -> Result<(StatusCode, Json<CheckIn>), ApiError> {
    payload.validate()?;

    let habit =
        habits::repo::find_active_for_owner(&state.db, payload.habit_id, user_id).await?;

    let today = OffsetDateTime::now_utc().date();
    let check_in = repo::create(
        &state.db,
        &habit,
        today,
        payload.completed,
        payload.notes.as_deref(),
    )
    .await?;

    info!(
        user_id = %user_id,
        habit_id = %habit.id,
        date = %check_in.date,
        completed = check_in.completed,
        "check-in recorded"
    );
    Ok((StatusCode::CREATED, Json(check_in)))
}

#[instrument(skip(state))]
pub async fn list_check_ins(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(habit_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> Result<Json<CheckInPage>, ApiError> {
    let habit = habits::repo::find_active_for_owner(&state.db, habit_id, user_id).await?;

    let (current, limit) = page.normalized();
    let offset = (current - 1) * limit;
    let (check_ins, total) = repo::list_for_habit(&state.db, habit.id, limit, offset).await?;

    Ok(Json(CheckInPage {
        check_ins,
        pagination: Pagination::new(current, limit, total),
    }))
}

#[instrument(skip(state))]
pub async fn recent_check_ins(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<RecentQuery>,
) -> Result<Json<Vec<RecentCheckIn>>, ApiError> {
    let rows = repo::recent_for_user(&state.db, user_id, q.limit.clamp(1, 100)).await?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn delete_check_in(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    repo::delete(&state.db, id, user_id).await?;
    info!(user_id = %user_id, check_in_id = %id, "check-in deleted");
    Ok(StatusCode::NO_CONTENT)
}
