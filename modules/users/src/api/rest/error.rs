use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::domain::error::DomainError;

/// Errors the REST layer reports back to clients as plain text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Malformed identifier or body, or a required field missing on create.
    #[error("{0}")]
    InvalidInput(String),
    /// No matching row; for read/update/delete also any statement failure.
    #[error("{0}")]
    NotFound(String),
    /// Connectivity failure, or a statement failure on create.
    #[error("{0}")]
    StorageError(String),
}

impl ApiError {
    pub fn invalid_id() -> Self {
        Self::InvalidInput("invalid id".to_string())
    }

    pub fn invalid_body() -> Self {
        Self::InvalidInput("invalid JSON body".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), format!("{self}\n")).into_response()
    }
}

/// Which endpoint a domain error came from; read/update/delete fold
/// statement failures into their not-found answer, create does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserOp {
    Create,
    Read,
    Update,
    Delete,
}

impl UserOp {
    fn not_found_message(self) -> &'static str {
        match self {
            Self::Create | Self::Read => "User not found",
            Self::Update => "User not found or update failed",
            Self::Delete => "User not found or delete failed",
        }
    }
}

/// Map domain error to the response for the given endpoint.
pub fn map_domain_error(e: &DomainError, op: UserOp) -> ApiError {
    match e {
        DomainError::EmptyField { .. } => {
            ApiError::InvalidInput("Name and Email are required".to_string())
        }
        DomainError::UserNotFound { .. } => ApiError::NotFound(op.not_found_message().to_string()),
        DomainError::Unavailable { message } => {
            tracing::error!(error = %message, ?op, "Database unreachable");
            ApiError::StorageError(format!("DB connect error: {message}"))
        }
        DomainError::Database { message } => match op {
            UserOp::Create => {
                tracing::error!(error = %message, "Insert failed");
                ApiError::StorageError(format!("Failed to create user: {message}"))
            }
            UserOp::Read | UserOp::Update | UserOp::Delete => {
                // The client only sees 404; keep the real cause in the logs.
                tracing::warn!(error = %message, ?op, "Statement failed, reporting not found");
                ApiError::NotFound(op.not_found_message().to_string())
            }
        },
    }
}
