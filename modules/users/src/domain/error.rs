use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{field} cannot be empty")]
    EmptyField { field: &'static str },

    #[error("User not found: {id}")]
    UserNotFound { id: i64 },

    #[error("{message}")]
    Unavailable { message: String },

    #[error("{message}")]
    Database { message: String },
}

impl DomainError {
    pub fn empty_field(field: &'static str) -> Self {
        Self::EmptyField { field }
    }

    pub fn user_not_found(id: i64) -> Self {
        Self::UserNotFound { id }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
