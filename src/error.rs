use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

/// Where every failed operation sends the user
pub const PROFILE_LIST_PATH: &str = "/profiles";

/// Application-level errors
///
/// Each variant is one outcome kind of a request; [`IntoResponse`] maps it
/// to a redirect so that no failure detail reaches the client.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External API error: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Status the rejection would carry if it were rendered instead of redirected
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::NotFound(what) => {
                tracing::warn!(status = %self.status(), "Attempted to access non-existent {}", what);
            }
            // Ownership failures stay silent so another account's profile is never confirmed
            AppError::Forbidden(_) => {}
            _ => {
                tracing::error!(status = %self.status(), error = %self, "Request failed");
            }
        }

        Redirect::to(PROFILE_LIST_PATH).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
