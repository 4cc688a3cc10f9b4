use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shelfmate_core::ShelfmateError;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing or invalid user identity")]
    Unauthorized,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(ref message) => {
                error!(%message, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, self.to_string()).into_response()
    }
}

impl From<ShelfmateError> for AppError {
    fn from(err: ShelfmateError) -> Self {
        match err {
            ShelfmateError::InvalidId(_) | ShelfmateError::ValidationError(_) => {
                AppError::BadRequest(err.to_string())
            }
            ShelfmateError::BookNotFound(_) => AppError::NotFound(err.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<JoinError> for AppError {
    fn from(err: JoinError) -> Self {
        AppError::Internal(err.to_string())
    }
}
