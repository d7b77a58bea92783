use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure taxonomy shared by every handler and repo function.
///
/// `NotFound` deliberately covers both "does not exist" and "exists but is
/// not yours" so callers cannot probe for other users' entities.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("{0}")]
    Unauthenticated(&'static str),

    #[error("must follow this user to view their habits")]
    MustFollow,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("you already have a habit with this name")]
    DuplicateName,

    #[error("already checked in for this habit today")]
    AlreadyCheckedIn,

    #[error("cannot follow yourself")]
    SelfFollow,

    #[error("already following this user")]
    AlreadyFollowing,

    #[error("not following this user")]
    NotFollowing,

    #[error("internal server error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::MustFollow => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::DuplicateName
            | ApiError::AlreadyCheckedIn
            | ApiError::SelfFollow
            | ApiError::AlreadyFollowing
            | ApiError::NotFollowing => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(e.into())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(e) = &self {
            tracing::error!(error = ?e, "request failed");
        }

        let body = match &self {
            ApiError::Validation { field, .. } => {
                json!({ "message": self.to_string(), "field": field })
            }
            _ => json!({ "message": self.to_string() }),
        };

        (self.status(), Json(body)).into_response()
    }
}

/// True when the database rejected a write on a unique index.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(d) if d.is_unique_violation())
}
