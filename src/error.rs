use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::{Display, Error};
use serde_json::json;

#[derive(Debug, Display, Error)]
pub enum AppError {
    /// Malformed or inconsistent input.
    #[display(fmt = "{}", _0)]
    Validation(#[error(not(source))] String),

    /// A unique index rejected the write.
    #[display(fmt = "There is a duplicate entry for this value")]
    Duplicate,

    #[display(fmt = "{} does not exist", _0)]
    NotFound(#[error(not(source))] &'static str),

    #[display(fmt = "{}", _0)]
    Forbidden(#[error(not(source))] &'static str),

    #[display(fmt = "Internal Server Error")]
    Database(sqlx::Error),

    #[display(fmt = "Internal Server Error")]
    Internal(#[error(not(source))] String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// Errors reported inside the AJAX envelope instead of aborting the request.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::Validation(_) | AppError::Duplicate)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        // MySQL reports every integrity violation as SQLSTATE 23000; only
        // unique-key errors are duplicates
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AppError::Duplicate;
            }
        }
        tracing::error!(error = %e, "Database error");
        AppError::Database(e)
    }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        tracing::error!(error = %e, "Failed to write CSV");
        AppError::Internal(e.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Duplicate => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": self.to_string()
        }))
    }
}
