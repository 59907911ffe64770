use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use tracing::{debug, info};

use crate::api::rest::dto::{UserBody, UserDto};
use crate::api::rest::error::{map_domain_error, ApiError, UserOp};
use crate::domain::service::Service;

/// Parse a path segment as a base-10 integer id.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::invalid_id())
}

fn parse_body(raw: &[u8]) -> Result<UserBody, ApiError> {
    UserBody::parse(raw).map_err(|e| {
        info!("Rejecting request body: {}", e);
        ApiError::invalid_body()
    })
}

/// Create a new user
pub async fn create_user(
    Extension(svc): Extension<Arc<Service>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let req_body = parse_body(&body)?;
    info!("Creating user: {:?}", req_body);

    match svc.create_user(req_body.into()).await {
        Ok(id) => Ok((
            StatusCode::CREATED,
            format!("User created successfully (id={id})\n"),
        )),
        Err(e) => {
            debug!("Failed to create user: {}", e);
            Err(map_domain_error(&e, UserOp::Create))
        }
    }
}

/// Encode as a JSON document followed by a newline.
fn json_line(dto: &UserDto) -> Result<Response, ApiError> {
    let mut buf =
        serde_json::to_vec(dto).map_err(|e| ApiError::StorageError(e.to_string()))?;
    buf.push(b'\n');
    Ok(([(header::CONTENT_TYPE, "application/json")], buf).into_response())
}

/// Get a specific user by ID
pub async fn get_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&raw_id)?;
    info!("Getting user with id: {}", id);

    match svc.get_user(id).await {
        Ok(user) => json_line(&UserDto::from(user)),
        Err(e) => {
            debug!("Failed to get user {}: {}", id, e);
            Err(map_domain_error(&e, UserOp::Read))
        }
    }
}

/// Overwrite name and email of an existing user
pub async fn update_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    let id = parse_id(&raw_id)?;
    let req_body = parse_body(&body)?;
    info!("Updating user {} with: {:?}", id, req_body);

    match svc.update_user(id, req_body.into()).await {
        Ok(()) => Ok("User updated successfully\n"),
        Err(e) => {
            debug!("Failed to update user {}: {}", id, e);
            Err(map_domain_error(&e, UserOp::Update))
        }
    }
}

/// Delete a user by ID
pub async fn delete_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(raw_id): Path<String>,
) -> Result<&'static str, ApiError> {
    let id = parse_id(&raw_id)?;
    info!("Deleting user: {}", id);

    match svc.delete_user(id).await {
        Ok(()) => Ok("User deleted successfully\n"),
        Err(e) => {
            debug!("Failed to delete user {}: {}", id, e);
            Err(map_domain_error(&e, UserOp::Delete))
        }
    }
}
