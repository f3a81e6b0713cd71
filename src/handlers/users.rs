use axum::{
    extract::{Path, State},
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use model::entities::user;
use sea_orm::{ActiveModelTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::{hash_password, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::handlers::auth::ensure_unique_identity;
use crate::helpers::access::find_user;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Request body for updating a user. Only provided fields change.
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
}

/// User response model. The password hash is never exposed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Get the authenticated user
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "users",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let user = find_user(&state.db, auth.user_id).await?;
    Ok(Json(ApiResponse::new(UserResponse::from(user), "User retrieved successfully")))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/users/{user_id}",
    tag = "users",
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = ApiResponse<UserResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<i32>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    trace!("Entering get_user function");
    let user = find_user(&state.db, user_id).await?;
    debug!("Found user {}", user.username);
    Ok(Json(ApiResponse::new(UserResponse::from(user), "User retrieved successfully")))
}

/// Update own profile
#[utoipa::path(
    put,
    path = "/users/{user_id}",
    tag = "users",
    params(("user_id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid input or username/email taken", body = ErrorResponse),
        (status = 403, description = "Not your account", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, request))]
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<i32>,
    Valid(Json(request)): Valid<Json<UpdateUserRequest>>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    trace!("Entering update_user function");
    if auth.user_id != user_id {
        warn!("User {} attempted to update user {}", auth.user_id, user_id);
        return Err(ApiError::forbidden("You can only update your own account"));
    }

    let existing = find_user(&state.db, user_id).await?;
    let username = request.username.as_deref().map(str::trim);
    let email = request.email.as_deref().map(|e| e.trim().to_lowercase());
    ensure_unique_identity(&state.db, username, email.as_deref(), Some(user_id)).await?;

    let mut active: user::ActiveModel = existing.clone().into();
    let mut updated_fields = Vec::new();

    if let Some(username) = username {
        active.username = Set(username.to_string());
        updated_fields.push(format!("username: {}", username));
    }
    if let Some(email) = email {
        updated_fields.push(format!("email: {}", email));
        active.email = Set(email);
    }
    if let Some(password) = request.password.as_deref() {
        active.password_hash = Set(hash_password(password)?);
        updated_fields.push("password".to_string());
    }

    if updated_fields.is_empty() {
        debug!("No fields to update for user {}", user_id);
        return Ok(Json(ApiResponse::new(UserResponse::from(existing), "No changes")));
    }
    debug!("Updating fields: {}", updated_fields.join(", "));
    active.updated_at = Set(Utc::now());

    let updated = active.update(&state.db).await?;
    info!("User {} updated", updated.id);
    Ok(Json(ApiResponse::new(UserResponse::from(updated), "User updated successfully")))
}
