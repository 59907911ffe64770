use std::sync::Arc;

use sqlx::AnyPool;
use tracing::info;

use crate::api::rest::routes;
use crate::domain::repo::UsersRepository;
use crate::domain::service::Service;
use crate::infra::storage::pool::Backend;
use crate::infra::storage::sqlx_repo::SqlxUsersRepository;

/// The users feature, wired: repository (infra) → domain service → REST routes.
#[derive(Clone)]
pub struct Users {
    service: Arc<Service>,
}

impl Users {
    /// Wire the feature on top of a shared connection pool for `backend`.
    pub fn from_pool(pool: AnyPool, backend: Backend) -> Self {
        Self::with_repository(Arc::new(SqlxUsersRepository::new(pool, backend)))
    }

    /// Wire the feature on top of any repository implementation.
    pub fn with_repository(repo: Arc<dyn UsersRepository>) -> Self {
        Self {
            service: Arc::new(Service::new(repo)),
        }
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    pub fn register_rest(&self, router: axum::Router) -> axum::Router {
        info!("Registering users REST routes");
        routes::register_routes(router, self.service.clone())
    }
}
