use crate::contract::model::{NewUser, User, UserUpdate};
use async_trait::async_trait;
use thiserror::Error;

/// Storage failures as seen by the domain. The adapter only separates
/// "could not reach the engine" from "the engine rejected the statement".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    #[error("{message}")]
    Connection { message: String },

    #[error("{message}")]
    Query { message: String },
}

impl RepoError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for the domain layer: persistence operations the domain needs.
/// Every method runs exactly one statement.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Insert a row and return the id storage assigned to it.
    async fn insert(&self, new_user: NewUser) -> Result<i64, RepoError>;
    /// Load a user by id; `None` when no row matches.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError>;
    /// Overwrite name and email. Returns false if no row matched.
    async fn update(&self, id: i64, update: UserUpdate) -> Result<bool, RepoError>;
    /// Delete by id. Returns true if a row was deleted.
    async fn delete(&self, id: i64) -> Result<bool, RepoError>;
}
