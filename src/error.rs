// Crate-wide error type and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::engine::beast::EvolveRejection;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    InvalidInput(String),

    #[error("no user")]
    MissingUser,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("already claimed")]
    AlreadyClaimed,

    #[error("not completed yet")]
    QuestIncomplete,

    #[error(transparent)]
    Evolve(#[from] EvolveRejection),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_)
            | Error::AlreadyClaimed
            | Error::QuestIncomplete
            | Error::Evolve(_) => StatusCode::BAD_REQUEST,
            Error::MissingUser => StatusCode::UNAUTHORIZED,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Error::Database(e) => {
                tracing::error!("Database error: {e}");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(Error::InvalidInput("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::MissingUser.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::NotFound("quest").status(), StatusCode::NOT_FOUND);
        assert_eq!(Error::AlreadyClaimed.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::Evolve(EvolveRejection::LevelRequired(5)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Database(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(Error::NotFound("spawn").to_string(), "spawn not found");
        assert_eq!(Error::QuestIncomplete.to_string(), "not completed yet");
        assert_eq!(
            Error::Evolve(EvolveRejection::AlreadyMaxStage).to_string(),
            "already at max stage"
        );
    }
}
