#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use sqlx::AnyPool;
use tempfile::TempDir;
use tower::ServiceExt;

use users::contract::model::{NewUser, User, UserUpdate};
use users::domain::repo::{RepoError, UsersRepository};
use users::infra::storage::pool::{connect_lazy, Backend, PoolSettings};
use users::Users;

/// SQLite flavour of `src/infra/storage/schema.sql`; AUTOINCREMENT keeps
/// deleted ids from being handed out again.
pub const SQLITE_SCHEMA: &str = "CREATE TABLE users (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL,
    email TEXT NOT NULL
)";

pub struct TestDb {
    pub pool: AnyPool,
    _dir: TempDir,
}

/// Fresh SQLite file in a temp dir, without the users table.
pub async fn empty_sqlite_db() -> TestDb {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("users.db");
    let dsn = format!("sqlite://{}?mode=rwc", path.to_string_lossy().replace('\\', "/"));
    let pool = connect_lazy(&dsn, &PoolSettings::default()).expect("pool");
    TestDb { pool, _dir: dir }
}

/// Fresh SQLite file in a temp dir with the users table created.
pub async fn sqlite_db() -> TestDb {
    let db = empty_sqlite_db().await;
    sqlx::query(SQLITE_SCHEMA)
        .execute(&db.pool)
        .await
        .expect("create users table");
    db
}

pub async fn count_users(pool: &AnyPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .expect("count users")
}

/// Build an Axum router by calling the real route registration.
pub fn router_for_pool(pool: AnyPool) -> Router {
    Users::from_pool(pool, Backend::Sqlite).register_rest(Router::new())
}

pub fn router_for_repo(repo: Arc<dyn UsersRepository>) -> Router {
    Users::with_repository(repo).register_rest(Router::new())
}

/// Send one request and return status, content type and body text.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<&str>,
) -> (StatusCode, Option<String>, String) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .expect("request");

    let response = app.clone().oneshot(req).await.expect("infallible");
    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, content_type, String::from_utf8_lossy(&bytes).into_owned())
}

/// Pull the id out of "User created successfully (id=<n>)\n".
pub fn created_id(body: &str) -> i64 {
    body.trim_end()
        .strip_prefix("User created successfully (id=")
        .and_then(|rest| rest.strip_suffix(')'))
        .and_then(|n| n.parse().ok())
        .unwrap_or_else(|| panic!("unexpected create body: {body:?}"))
}

/// In-memory repository that counts calls and can be told to fail every call.
#[derive(Default)]
pub struct MockUsersRepository {
    pub calls: AtomicUsize,
    fail_with: Option<RepoError>,
    rows: Mutex<BTreeMap<i64, User>>,
    next_id: AtomicUsize,
}

impl MockUsersRepository {
    pub fn failing(error: RepoError) -> Self {
        Self {
            fail_with: Some(error),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Result<(), RepoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl UsersRepository for MockUsersRepository {
    async fn insert(&self, new_user: NewUser) -> Result<i64, RepoError> {
        self.enter()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        self.rows.lock().unwrap().insert(
            id,
            User {
                id,
                name: new_user.name,
                email: new_user.email,
            },
        );
        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        self.enter()?;
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn update(&self, id: i64, update: UserUpdate) -> Result<bool, RepoError> {
        self.enter()?;
        Ok(match self.rows.lock().unwrap().get_mut(&id) {
            Some(row) => {
                row.name = update.name;
                row.email = update.email;
                true
            }
            None => false,
        })
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        self.enter()?;
        Ok(self.rows.lock().unwrap().remove(&id).is_some())
    }
}
