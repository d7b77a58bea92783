use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::streak::{self, Counters};
use crate::error::ApiError;
use crate::habits::repo::{Category, Habit};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CheckIn {
    pub id: Uuid,
    pub habit_id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub completed: bool,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Check-in joined with minimal habit info for the recent-activity view.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecentCheckIn {
    pub id: Uuid,
    pub habit_id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub completed: bool,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
    pub habit_name: String,
    pub habit_category: Category,
}

const CHECK_IN_COLUMNS: &str = "id, habit_id, user_id, date, completed, notes, created_at";

/// Record a check-in for `today` and fold it into the habit's counters.
///
/// The insert and the counter update commit together; the day-bucket unique
/// index is the gate that keeps two concurrent requests from both landing on
/// the same (habit, day).
pub async fn create(
    db: &PgPool,
    habit: &Habit,
    today: Date,
    completed: bool,
    notes: Option<&str>,
) -> Result<CheckIn, ApiError> {
    let mut tx = db.begin().await?;

    let inserted = sqlx::query_as::<_, CheckIn>(&format!(
        "INSERT INTO check_ins (habit_id, user_id, date, completed, notes) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (habit_id, date) DO NOTHING \
         RETURNING {CHECK_IN_COLUMNS}"
    ))
    .bind(habit.id)
    .bind(habit.user_id)
    .bind(today)
    .bind(completed)
    .bind(notes)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(check_in) = inserted else {
        return Err(ApiError::AlreadyCheckedIn);
    };

    let mut counters = lock_counters(&mut tx, habit.id)
        .await?
        .ok_or(ApiError::NotFound("habit"))?;
    counters.apply(completed);
    store_counters(&mut tx, habit.id, counters).await?;

    tx.commit().await?;
    Ok(check_in)
}

/// Delete a check-in owned by `user_id`, reversing its streak effect when it
/// was a completed one. The habit's counters are adjusted even for past
/// days, matching the incremental bookkeeping; `recount` exists for anyone
/// who wants the ledger-derived truth instead.
pub async fn delete(db: &PgPool, id: Uuid, user_id: Uuid) -> Result<(), ApiError> {
    let mut tx = db.begin().await?;

    let deleted = sqlx::query_as::<_, CheckIn>(&format!(
        "DELETE FROM check_ins WHERE id = $1 AND user_id = $2 RETURNING {CHECK_IN_COLUMNS}"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(check_in) = deleted else {
        return Err(ApiError::NotFound("check-in"));
    };

    if check_in.completed {
        if let Some(mut counters) = lock_counters(&mut tx, check_in.habit_id).await? {
            counters.reverse();
            store_counters(&mut tx, check_in.habit_id, counters).await?;
        }
    }

    tx.commit().await?;
    Ok(())
}

pub async fn list_for_habit(
    db: &PgPool,
    habit_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<(Vec<CheckIn>, i64), ApiError> {
    let rows = sqlx::query_as::<_, CheckIn>(&format!(
        "SELECT {CHECK_IN_COLUMNS} FROM check_ins \
         WHERE habit_id = $1 \
         ORDER BY date DESC, created_at DESC \
         LIMIT $2 OFFSET $3"
    ))
    .bind(habit_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM check_ins WHERE habit_id = $1")
        .bind(habit_id)
        .fetch_one(db)
        .await?;

    Ok((rows, total))
}

pub async fn recent_for_user(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<RecentCheckIn>, ApiError> {
    let rows = sqlx::query_as::<_, RecentCheckIn>(
        "SELECT c.id, c.habit_id, c.user_id, c.date, c.completed, c.notes, c.created_at, \
                h.name AS habit_name, h.category AS habit_category \
         FROM check_ins c \
         JOIN habits h ON h.id = c.habit_id \
         WHERE c.user_id = $1 \
         ORDER BY c.date DESC, c.created_at DESC \
         LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Recompute the habit's counters from its full ledger and persist them.
pub async fn recount(db: &PgPool, habit: &Habit) -> Result<Habit, ApiError> {
    let mut tx = db.begin().await?;

    let prior = lock_counters(&mut tx, habit.id)
        .await?
        .ok_or(ApiError::NotFound("habit"))?;

    let entries: Vec<(Date, bool)> =
        sqlx::query_as("SELECT date, completed FROM check_ins WHERE habit_id = $1 ORDER BY date")
            .bind(habit.id)
            .fetch_all(&mut *tx)
            .await?;

    let counters = streak::recompute(&entries, prior.longest_streak);

    let habit = sqlx::query_as::<_, Habit>(
        "UPDATE habits \
         SET streak = $1, longest_streak = $2, total_completions = $3, updated_at = now() \
         WHERE id = $4 \
         RETURNING id, user_id, name, description, category, frequency, is_active, \
                   streak, longest_streak, total_completions, created_at, updated_at",
    )
    .bind(counters.streak)
    .bind(counters.longest_streak)
    .bind(counters.total_completions)
    .bind(habit.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(habit)
}

/// Row-lock the habit's counters for the rest of the transaction so
/// concurrent check-ins on other days cannot interleave their updates.
async fn lock_counters(
    tx: &mut Transaction<'_, Postgres>,
    habit_id: Uuid,
) -> Result<Option<Counters>, sqlx::Error> {
    let row: Option<(i32, i32, i32)> = sqlx::query_as(
        "SELECT streak, longest_streak, total_completions FROM habits WHERE id = $1 FOR UPDATE",
    )
    .bind(habit_id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(row.map(
        |(streak, longest_streak, total_completions)| Counters {
            streak,
            longest_streak,
            total_completions,
        },
    ))
}

async fn store_counters(
    tx: &mut Transaction<'_, Postgres>,
    habit_id: Uuid,
    counters: Counters,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE habits \
         SET streak = $1, longest_streak = $2, total_completions = $3, updated_at = now() \
         WHERE id = $4",
    )
    .bind(counters.streak)
    .bind(counters.longest_streak)
    .bind(counters.total_completions)
    .bind(habit_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
