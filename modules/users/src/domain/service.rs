use std::sync::Arc;

use crate::contract::model::{NewUser, User, UserUpdate};
use crate::domain::error::DomainError;
use crate::domain::repo::{RepoError, UsersRepository};
use tracing::{debug, info, instrument};

/// Domain service for user management.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
}

impl Service {
    pub fn new(repo: Arc<dyn UsersRepository>) -> Self {
        Self { repo }
    }

    #[instrument(
        name = "users.service.create_user",
        skip(self),
        fields(name = %new_user.name, email = %new_user.email)
    )]
    pub async fn create_user(&self, new_user: NewUser) -> Result<i64, DomainError> {
        info!("Creating new user");

        if new_user.name.is_empty() {
            return Err(DomainError::empty_field("name"));
        }
        if new_user.email.is_empty() {
            return Err(DomainError::empty_field("email"));
        }

        let id = self.repo.insert(new_user).await.map_err(into_domain)?;

        info!("Successfully created user with id={}", id);
        Ok(id)
    }

    #[instrument(name = "users.service.get_user", skip(self), fields(user_id = id))]
    pub async fn get_user(&self, id: i64) -> Result<User, DomainError> {
        debug!("Getting user by id");

        let user = self
            .repo
            .find_by_id(id)
            .await
            .map_err(into_domain)?
            .ok_or_else(|| DomainError::user_not_found(id))?;

        debug!("Successfully retrieved user");
        Ok(user)
    }

    /// Unlike `create_user`, empty values are written as-is.
    #[instrument(name = "users.service.update_user", skip(self), fields(user_id = id))]
    pub async fn update_user(&self, id: i64, update: UserUpdate) -> Result<(), DomainError> {
        info!("Updating user");

        let matched = self.repo.update(id, update).await.map_err(into_domain)?;
        if !matched {
            return Err(DomainError::user_not_found(id));
        }

        info!("Successfully updated user");
        Ok(())
    }

    #[instrument(name = "users.service.delete_user", skip(self), fields(user_id = id))]
    pub async fn delete_user(&self, id: i64) -> Result<(), DomainError> {
        info!("Deleting user");

        let deleted = self.repo.delete(id).await.map_err(into_domain)?;
        if !deleted {
            return Err(DomainError::user_not_found(id));
        }

        info!("Successfully deleted user");
        Ok(())
    }
}

fn into_domain(e: RepoError) -> DomainError {
    match e {
        RepoError::Connection { message } => DomainError::unavailable(message),
        RepoError::Query { message } => DomainError::database(message),
    }
}
