use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;

use crate::usecase::UseCaseError;

/// Failure envelope: `{"status":"fail"|"error","message":...}`.
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub status: &'static str,
    pub message: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")] NotFound(String),
    /// Authenticated, but not the owner of the resource.
    #[error("{0}")] Forbidden(String),
    /// Missing or invalid access token.
    #[error("{0}")] Unauthenticated(String),
    #[error("{0}")] BadRequest(String),
    #[error("internal error")] Internal,
}

impl From<UseCaseError> for ApiError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(msg) => ApiError::NotFound(msg),
            UseCaseError::Unauthorized(msg) => ApiError::Forbidden(msg),
            UseCaseError::Validation(err) => ApiError::BadRequest(err.message()),
            UseCaseError::UnknownUser(msg) => ApiError::BadRequest(msg),
            UseCaseError::Internal(cause) => {
                tracing::error!(%cause, "request failed");
                ApiError::Internal
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = match self {
            ApiError::Internal => "error",
            _ => "fail",
        };
        HttpResponse::build(self.status_code()).json(ApiErrorBody { status, message: self.to_string() })
    }
}
