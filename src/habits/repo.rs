use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::error::{is_unique_violation, ApiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "habit_category", rename_all = "lowercase")]
pub enum Category {
    Health,
    Fitness,
    Learning,
    Productivity,
    Mindfulness,
    Social,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "habit_frequency", rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Habit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Category,
    pub frequency: Frequency,
    pub is_active: bool,
    pub streak: i32,
    pub longest_streak: i32,
    pub total_completions: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Habit annotated with whether a check-in exists for the given day.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HabitWithToday {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Category,
    pub frequency: Frequency,
    pub is_active: bool,
    pub streak: i32,
    pub longest_streak: i32,
    pub total_completions: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub checked_in_today: bool,
}

const HABIT_COLUMNS: &str = "id, user_id, name, description, category, frequency, is_active, \
     streak, longest_streak, total_completions, created_at, updated_at";

/// Authorized lookup shared by the check-in, update and delete flows.
///
/// Absent, inactive and foreign habits are indistinguishable to the caller.
pub async fn find_active_for_owner(
    db: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<Habit, ApiError> {
    let habit = sqlx::query_as::<_, Habit>(&format!(
        "SELECT {HABIT_COLUMNS} FROM habits WHERE id = $1 AND user_id = $2 AND is_active"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    habit.ok_or(ApiError::NotFound("habit"))
}

pub async fn list_active(db: &PgPool, user_id: Uuid) -> Result<Vec<Habit>, ApiError> {
    let rows = sqlx::query_as::<_, Habit>(&format!(
        "SELECT {HABIT_COLUMNS} FROM habits WHERE user_id = $1 AND is_active \
         ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn list_active_with_today(
    db: &PgPool,
    user_id: Uuid,
    today: Date,
) -> Result<Vec<HabitWithToday>, ApiError> {
    let rows = sqlx::query_as::<_, HabitWithToday>(&format!(
        "SELECT {HABIT_COLUMNS}, \
                EXISTS(SELECT 1 FROM check_ins c WHERE c.habit_id = habits.id AND c.date = $2) \
                    AS checked_in_today \
         FROM habits \
         WHERE user_id = $1 AND is_active \
         ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .bind(today)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// True when the owner already has an active habit with this name,
/// case-insensitively, other than `exclude`.
pub async fn name_taken(
    db: &PgPool,
    user_id: Uuid,
    name: &str,
    exclude: Option<Uuid>,
) -> Result<bool, ApiError> {
    let taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS( \
            SELECT 1 FROM habits \
            WHERE user_id = $1 AND lower(name) = lower($2) AND is_active \
              AND ($3::uuid IS NULL OR id <> $3) \
         )",
    )
    .bind(user_id)
    .bind(name)
    .bind(exclude)
    .fetch_one(db)
    .await?;
    Ok(taken)
}

pub async fn create(
    db: &PgPool,
    user_id: Uuid,
    name: &str,
    description: Option<&str>,
    category: Category,
    frequency: Frequency,
) -> Result<Habit, ApiError> {
    let res = sqlx::query_as::<_, Habit>(&format!(
        "INSERT INTO habits (user_id, name, description, category, frequency) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {HABIT_COLUMNS}"
    ))
    .bind(user_id)
    .bind(name)
    .bind(description)
    .bind(category)
    .bind(frequency)
    .fetch_one(db)
    .await;

    match res {
        Ok(habit) => Ok(habit),
        // backstop for the partial unique index when two creates race
        Err(e) if is_unique_violation(&e) => Err(ApiError::DuplicateName),
        Err(e) => Err(e.into()),
    }
}

/// Persist name/description/category/frequency as already mutated on `habit`.
pub async fn update_fields(db: &PgPool, habit: &Habit) -> Result<Habit, ApiError> {
    let res = sqlx::query_as::<_, Habit>(&format!(
        "UPDATE habits \
         SET name = $1, description = $2, category = $3, frequency = $4, updated_at = now() \
         WHERE id = $5 \
         RETURNING {HABIT_COLUMNS}"
    ))
    .bind(&habit.name)
    .bind(&habit.description)
    .bind(habit.category)
    .bind(habit.frequency)
    .bind(habit.id)
    .fetch_one(db)
    .await;

    match res {
        Ok(habit) => Ok(habit),
        Err(e) if is_unique_violation(&e) => Err(ApiError::DuplicateName),
        Err(e) => Err(e.into()),
    }
}

/// Soft delete: the habit keeps its counters but disappears from every
/// listing, stats and check-in flow.
pub async fn soft_delete(db: &PgPool, id: Uuid, user_id: Uuid) -> Result<(), ApiError> {
    let res = sqlx::query(
        "UPDATE habits SET is_active = false, updated_at = now() \
         WHERE id = $1 AND user_id = $2 AND is_active",
    )
    .bind(id)
    .bind(user_id)
    .execute(db)
    .await?;

    if res.rows_affected() == 0 {
        return Err(ApiError::NotFound("habit"));
    }
    Ok(())
}
