use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use compute::ComputeError;
use sea_orm::DbErr;
use thiserror::Error;
use tracing::error;

use crate::genai::GenAiError;
use crate::schemas::ErrorResponse;

/// Errors a handler can return. Each variant maps to one HTTP status.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or incomplete input (400)
    #[error("{0}")]
    BadRequest(String),

    /// Missing or invalid bearer token, or bad credentials (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but acting on someone else's resource (403)
    #[error("{0}")]
    Forbidden(String),

    /// Record does not exist or has been deleted (404)
    #[error("{0}")]
    NotFound(String),

    /// Any downstream failure: database, AI provider, file system (500)
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        ApiError::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            code: self.code().to_string(),
            error: self.to_string(),
            success: false,
        };
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        error!("Database error: {}", err);
        ApiError::internal("Internal server error")
    }
}

impl From<ComputeError> for ApiError {
    fn from(err: ComputeError) -> Self {
        match err {
            ComputeError::BusinessNotFound(id) => {
                ApiError::not_found(format!("Business with ID {} not found", id))
            }
            ComputeError::NoFinancials(id) => {
                ApiError::not_found(format!("Business with ID {} has no financial records", id))
            }
            ComputeError::Database(db_err) => db_err.into(),
        }
    }
}

impl From<GenAiError> for ApiError {
    fn from(err: GenAiError) -> Self {
        error!("AI provider error: {}", err);
        ApiError::internal("AI service failed to produce a response")
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        error!("File storage error: {}", err);
        ApiError::internal("Failed to store uploaded file")
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
