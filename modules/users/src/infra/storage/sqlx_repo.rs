//! sqlx-backed repository implementation for the domain port.
//!
//! Each call checks a connection out of the shared pool, runs one statement
//! on it and hands it back on every exit path. A failed checkout means the
//! engine could not be reached; everything after that is a statement error.
//! No transactions, no retries.

use async_trait::async_trait;
use sqlx::any::Any;
use sqlx::pool::PoolConnection;
use sqlx::AnyPool;
use tracing::debug;

use crate::contract::model::{NewUser, User, UserUpdate};
use crate::domain::repo::{RepoError, UsersRepository};
use crate::infra::storage::entity::UserRow;
use crate::infra::storage::pool::Backend;

const INSERT_USER: &str = "INSERT INTO users (name, email) VALUES (?, ?)";
// The Any driver does not surface SQLite's rowid, so ask for it directly.
const INSERT_USER_RETURNING_ID: &str =
    "INSERT INTO users (name, email) VALUES (?, ?) RETURNING id";
const SELECT_USER: &str = "SELECT id, name, email FROM users WHERE id = ?";
const UPDATE_USER: &str = "UPDATE users SET name = ?, email = ? WHERE id = ?";
const DELETE_USER: &str = "DELETE FROM users WHERE id = ?";

pub struct SqlxUsersRepository {
    pool: AnyPool,
    backend: Backend,
}

impl SqlxUsersRepository {
    pub fn new(pool: AnyPool, backend: Backend) -> Self {
        Self { pool, backend }
    }

    async fn acquire(&self) -> Result<PoolConnection<Any>, RepoError> {
        self.pool.acquire().await.map_err(|e| {
            debug!(error = %e, "connection checkout failed");
            RepoError::connection(e.to_string())
        })
    }
}

#[async_trait]
impl UsersRepository for SqlxUsersRepository {
    async fn insert(&self, new_user: NewUser) -> Result<i64, RepoError> {
        let mut conn = self.acquire().await?;

        match self.backend {
            Backend::Sqlite => sqlx::query_scalar::<_, i64>(INSERT_USER_RETURNING_ID)
                .bind(new_user.name)
                .bind(new_user.email)
                .fetch_one(&mut *conn)
                .await
                .map_err(map_sqlx_error),
            Backend::MySql => {
                let res = sqlx::query(INSERT_USER)
                    .bind(new_user.name)
                    .bind(new_user.email)
                    .execute(&mut *conn)
                    .await
                    .map_err(map_sqlx_error)?;

                res.last_insert_id()
                    .ok_or_else(|| RepoError::query("driver did not report the inserted id"))
            }
        }
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        let mut conn = self.acquire().await?;
        let row = sqlx::query_as::<_, UserRow>(SELECT_USER)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn update(&self, id: i64, update: UserUpdate) -> Result<bool, RepoError> {
        let mut conn = self.acquire().await?;
        let res = sqlx::query(UPDATE_USER)
            .bind(update.name)
            .bind(update.email)
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let mut conn = self.acquire().await?;
        let res = sqlx::query(DELETE_USER)
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;
        Ok(res.rows_affected() > 0)
    }
}

/// Classify a statement-time driver error. Transport failures can still
/// happen mid-statement on a pooled connection, so they stay connection errors.
fn map_sqlx_error(error: sqlx::Error) -> RepoError {
    debug!(error = %error, "sqlx operation failed");
    match &error {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Configuration(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => RepoError::connection(error.to_string()),
        _ => RepoError::query(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::pool::{connect_lazy, PoolSettings};

    #[test]
    fn pool_and_transport_failures_are_connection_errors() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            RepoError::Connection { .. }
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolClosed),
            RepoError::Connection { .. }
        ));
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(matches!(
            map_sqlx_error(sqlx::Error::Io(io)),
            RepoError::Connection { .. }
        ));
    }

    #[test]
    fn statement_failures_are_query_errors() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            RepoError::Query { .. }
        ));
        let err = map_sqlx_error(sqlx::Error::Protocol("bad packet".into()));
        match err {
            RepoError::Query { message } => assert!(message.contains("bad packet")),
            other => panic!("expected query error, got {other:?}"),
        }
    }

    async fn sqlite_repo(dir: &tempfile::TempDir) -> SqlxUsersRepository {
        let dsn = format!("sqlite://{}?mode=rwc", dir.path().join("users.db").display());
        let pool = connect_lazy(&dsn, &PoolSettings::default()).unwrap();
        sqlx::query(
            "CREATE TABLE users (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, email TEXT NOT NULL)",
        )
        .execute(&pool)
        .await
        .unwrap();
        SqlxUsersRepository::new(pool, Backend::Sqlite)
    }

    fn ada() -> NewUser {
        NewUser {
            name: "Ada".into(),
            email: "ada@example.com".into(),
        }
    }

    #[tokio::test]
    async fn sqlite_insert_reports_assigned_ids() {
        let dir = tempfile::tempdir().unwrap();
        let repo = sqlite_repo(&dir).await;

        let first = repo.insert(ada()).await.unwrap();
        let second = repo.insert(ada()).await.unwrap();
        assert_eq!(second, first + 1);

        let stored = repo.find_by_id(second).await.unwrap().unwrap();
        assert_eq!(stored.id, second);
        assert_eq!(stored.name, "Ada");
    }

    #[tokio::test]
    async fn unopenable_database_is_a_connection_error_for_every_statement() {
        let pool = connect_lazy(
            "sqlite:///nonexistent_dir_for_users_tests/users.db",
            &PoolSettings::default(),
        )
        .unwrap();
        let repo = SqlxUsersRepository::new(pool, Backend::Sqlite);

        let results = [
            repo.insert(ada()).await.map(|_| ()),
            repo.find_by_id(1).await.map(|_| ()),
            repo.update(1, UserUpdate::default()).await.map(|_| ()),
            repo.delete(1).await.map(|_| ()),
        ];
        for result in results {
            match result {
                Err(RepoError::Connection { message }) => {
                    assert!(message.contains("unable to open database file"), "{message}")
                }
                other => panic!("expected connection error, got {other:?}"),
            }
        }
    }
}
