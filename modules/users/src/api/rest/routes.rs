use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Mount the user endpoints on `router`:
///
/// | Method | Path        | Handler       |
/// |--------|-------------|---------------|
/// | POST   | /user       | create_user   |
/// | GET    | /user/{id}  | get_user      |
/// | PUT    | /user/{id}  | update_user   |
/// | DELETE | /user/{id}  | delete_user   |
pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    let users = Router::new()
        .route("/user", post(handlers::create_user))
        .route(
            "/user/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .layer(Extension(service));

    router.merge(users)
}
