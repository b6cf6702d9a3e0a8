use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    http::StatusCode,
};
use tracing::{info, instrument};

use glucose_guide_domain::services::UserServiceTrait;

use crate::api::error::ApiError;
use crate::entities::{CreateUserBody, UserResponse};

/// Service type for dependency injection
pub type UserService = Arc<dyn UserServiceTrait>;

/// List every live user
#[instrument(skip(service))]
pub async fn list_users(
    State(service): State<UserService>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = service.find_all().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Register a user
#[instrument(skip(service, payload))]
pub async fn create_user(
    State(service): State<UserService>,
    payload: Result<Json<CreateUserBody>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let Json(body) = payload?;
    let user = service.create_one(body.into()).await?;
    info!("Registered user {}", user.id);
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Get a single user
#[instrument(skip(service))]
pub async fn get_user(
    State(service): State<UserService>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = service.find_one(&id).await?;
    Ok(Json(user.into()))
}

/// Mark the user as having agreed to the terms of service
#[instrument(skip(service))]
pub async fn agree_to_terms(
    State(service): State<UserService>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = service.agree_to_terms(&id).await?;
    Ok(Json(user.into()))
}
