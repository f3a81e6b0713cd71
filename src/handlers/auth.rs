use axum::{extract::State, http::StatusCode, response::Json};
use axum_valid::Valid;
use chrono::Utc;
use model::entities::user;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::{hash_password, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::handlers::users::UserResponse;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Request body for registering a new user
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Issued bearer token with the user it belongs to
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: i64,
    pub user: UserResponse,
}

/// Reject a username or email already held by another account, deleted or not.
pub(crate) async fn ensure_unique_identity(
    db: &DatabaseConnection,
    username: Option<&str>,
    email: Option<&str>,
    except_user: Option<i32>,
) -> ApiResult<()> {
    if username.is_none() && email.is_none() {
        return Ok(());
    }
    let mut any = Condition::any();
    if let Some(username) = username {
        any = any.add(user::Column::Username.eq(username));
    }
    if let Some(email) = email {
        any = any.add(user::Column::Email.eq(email));
    }

    let mut query = user::Entity::find().filter(any);
    if let Some(id) = except_user {
        query = query.filter(user::Column::Id.ne(id));
    }
    if let Some(existing) = query.one(db).await? {
        let field = if Some(existing.username.as_str()) == username {
            "Username"
        } else {
            "Email"
        };
        warn!("{} already registered to user {}", field, existing.id);
        return Err(ApiError::bad_request(format!("{} is already taken", field)));
    }
    Ok(())
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid input or username/email taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(username = %request.username))]
pub async fn register(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<RegisterRequest>>,
) -> ApiResult<(StatusCode, Json<ApiResponse<UserResponse>>)> {
    trace!("Entering register function");
    let username = request.username.trim().to_string();
    let email = request.email.trim().to_lowercase();

    ensure_unique_identity(&state.db, Some(&username), Some(&email), None).await?;

    let now = Utc::now();
    let created = user::ActiveModel {
        username: Set(username),
        email: Set(email),
        password_hash: Set(hash_password(&request.password)?),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!("Registered user {} ({})", created.id, created.username);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(UserResponse::from(created), "User registered successfully")),
    ))
}

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<TokenResponse>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(username = %request.username))]
pub async fn login(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<LoginRequest>>,
) -> ApiResult<Json<ApiResponse<TokenResponse>>> {
    trace!("Entering login function");

    let found = user::Entity::find()
        .filter(user::Column::Username.eq(request.username.trim()))
        .filter(user::Column::DeletedAt.is_null())
        .one(&state.db)
        .await?;

    let Some(account) = found.filter(|u| verify_password(&request.password, &u.password_hash)) else {
        debug!("Rejected login attempt");
        return Err(ApiError::unauthorized("Invalid username or password"));
    };

    let token = state.jwt.issue(account.id)?;
    info!("User {} logged in", account.id);
    Ok(Json(ApiResponse::new(
        TokenResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: crate::auth::TOKEN_TTL_HOURS * 3600,
            user: UserResponse::from(account),
        },
        "Login successful",
    )))
}
