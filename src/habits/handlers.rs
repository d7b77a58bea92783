use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{CreateHabitRequest, UpdateHabitRequest};
use super::repo::{self, Habit, HabitWithToday};
use super::stats::{self, HabitStats};
use crate::auth::AuthUser;
use crate::checkins;
use crate::error::ApiError;
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn list_habits(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<HabitWithToday>>, ApiError> {
    let today = OffsetDateTime::now_utc().date();
    let habits = repo::list_active_with_today(&state.db, user_id, today).await?;
    Ok(Json(habits))
}

#[instrument(skip(state, payload))]
pub async fn create_habit(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(mut payload): Json<CreateHabitRequest>,
) -> Result<(StatusCode, Json<Habit>), ApiError> {
    payload.validate()?;

    if repo::name_taken(&state.db, user_id, &payload.name, None).await? {
        warn!(user_id = %user_id, name = %payload.name, "duplicate habit name");
        return Err(ApiError::DuplicateName);
    }

    let habit = repo::create(
        &state.db,
        user_id,
        &payload.name,
        payload.description.as_deref(),
        payload.category,
        payload.frequency.unwrap_or_default(),
    )
    .await?;

    info!(user_id = %user_id, habit_id = %habit.id, "habit created");
    Ok((StatusCode::CREATED, Json(habit)))
}

#[instrument(skip(state, payload))]
pub async fn update_habit(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(mut payload): Json<UpdateHabitRequest>,
) -> Result<Json<Habit>, ApiError> {
    payload.validate()?;

    let mut habit = repo::find_active_for_owner(&state.db, id, user_id).await?;

    if let Some(name) = payload.name {
        if !name.eq_ignore_ascii_case(&habit.name)
            && repo::name_taken(&state.db, user_id, &name, Some(habit.id)).await?
        {
            warn!(user_id = %user_id, habit_id = %habit.id, name = %name, "duplicate habit name");
            return Err(ApiError::DuplicateName);
        }
        habit.name = name;
    }
    if let Some(description) = payload.description {
        // explicit empty string clears the description
        habit.description = if description.is_empty() {
            None
        } else {
            Some(description)
        };
    }
    if let Some(category) = payload.category {
        habit.category = category;
    }
    if let Some(frequency) = payload.frequency {
        habit.frequency = frequency;
    }

    let habit = repo::update_fields(&state.db, &habit).await?;
    info!(user_id = %user_id, habit_id = %habit.id, "habit updated");
    Ok(Json(habit))
}

#[instrument(skip(state))]
pub async fn delete_habit(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    repo::soft_delete(&state.db, id, user_id).await?;
    info!(user_id = %user_id, habit_id = %id, "habit deactivated");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn get_stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<HabitStats>, ApiError> {
    let habits = repo::list_active(&state.db, user_id).await?;
    Ok(Json(stats::compute(&habits)))
}

/// Rebuilds a habit's counters from its full check-in history. Intended for
/// reconciliation after a partial failure or a consistency audit.
#[instrument(skip(state))]
pub async fn recount_habit(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Habit>, ApiError> {
    let habit = repo::find_active_for_owner(&state.db, id, user_id).await?;
    let habit = checkins::repo::recount(&state.db, &habit).await?;
    info!(user_id = %user_id, habit_id = %habit.id, streak = habit.streak, "habit counters recounted");
    Ok(Json(habit))
}
