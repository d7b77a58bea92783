use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::error::ApiError;
use crate::habits::repo::Category;

/// Directory summary exposed to other users.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// Check-in of a followed user joined with its author and habit.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FeedEntry {
    pub id: Uuid,
    pub habit_id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub completed: bool,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
    pub username: String,
    pub habit_name: String,
    pub habit_category: Category,
}

/// Public view of a followed user's habit: counters only, no description.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PublicHabit {
    pub id: Uuid,
    pub name: String,
    pub category: Category,
    pub streak: i32,
    pub longest_streak: i32,
    pub total_completions: i32,
    pub created_at: OffsetDateTime,
}

pub async fn exists(db: &PgPool, id: Uuid) -> Result<bool, ApiError> {
    let found = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(id)
        .fetch_one(db)
        .await?;
    Ok(found)
}

/// Case-insensitive substring match on username or email, excluding the
/// caller, capped at `limit`.
pub async fn search(
    db: &PgPool,
    query: &str,
    exclude: Uuid,
    limit: i64,
) -> Result<Vec<UserSummary>, ApiError> {
    let pattern = format!("%{}%", escape_like(query));
    let rows = sqlx::query_as::<_, UserSummary>(
        "SELECT id, username, email FROM users \
         WHERE (username ILIKE $1 OR email ILIKE $1) AND id <> $2 \
         ORDER BY username \
         LIMIT $3",
    )
    .bind(pattern)
    .bind(exclude)
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Both directions of the relation live in one row, so "A follows B" and
/// "B is followed by A" cannot diverge.
pub async fn follow(db: &PgPool, follower: Uuid, followee: Uuid) -> Result<(), ApiError> {
    if follower == followee {
        return Err(ApiError::SelfFollow);
    }
    if !exists(db, followee).await? {
        return Err(ApiError::NotFound("user"));
    }

    let res = sqlx::query(
        "INSERT INTO follows (follower_id, followee_id) VALUES ($1, $2) \
         ON CONFLICT DO NOTHING",
    )
    .bind(follower)
    .bind(followee)
    .execute(db)
    .await?;

    if res.rows_affected() == 0 {
        return Err(ApiError::AlreadyFollowing);
    }
    Ok(())
}

pub async fn unfollow(db: &PgPool, follower: Uuid, followee: Uuid) -> Result<(), ApiError> {
    let res = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followee_id = $2")
        .bind(follower)
        .bind(followee)
        .execute(db)
        .await?;

    if res.rows_affected() == 0 {
        return Err(ApiError::NotFollowing);
    }
    Ok(())
}

pub async fn is_following(db: &PgPool, follower: Uuid, followee: Uuid) -> Result<bool, ApiError> {
    let found = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND followee_id = $2)",
    )
    .bind(follower)
    .bind(followee)
    .fetch_one(db)
    .await?;
    Ok(found)
}

pub async fn following(db: &PgPool, user_id: Uuid) -> Result<Vec<UserSummary>, ApiError> {
    let rows = sqlx::query_as::<_, UserSummary>(
        "SELECT u.id, u.username, u.email \
         FROM follows f \
         JOIN users u ON u.id = f.followee_id \
         WHERE f.follower_id = $1 \
         ORDER BY u.username",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Check-ins of everyone the viewer follows, newest first.
pub async fn feed(db: &PgPool, viewer: Uuid, limit: i64) -> Result<Vec<FeedEntry>, ApiError> {
    let rows = sqlx::query_as::<_, FeedEntry>(
        "SELECT c.id, c.habit_id, c.user_id, c.date, c.completed, c.notes, c.created_at, \
                u.username, h.name AS habit_name, h.category AS habit_category \
         FROM check_ins c \
         JOIN follows f ON f.followee_id = c.user_id AND f.follower_id = $1 \
         JOIN users u ON u.id = c.user_id \
         JOIN habits h ON h.id = c.habit_id \
         ORDER BY c.date DESC, c.created_at DESC \
         LIMIT $2",
    )
    .bind(viewer)
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Active habits of a followed user, strongest streak first.
pub async fn public_habits(db: &PgPool, user_id: Uuid) -> Result<Vec<PublicHabit>, ApiError> {
    let rows = sqlx::query_as::<_, PublicHabit>(
        "SELECT id, name, category, streak, longest_streak, total_completions, created_at \
         FROM habits \
         WHERE user_id = $1 AND is_active \
         ORDER BY streak DESC, created_at DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Escape ILIKE metacharacters so a search term matches literally.
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
