use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::{ApiError, ApiResult};
use crate::api::extract::AppJson;
use crate::api::handlers::users::UserResponse;
use crate::api::middleware::auth::{suspended_message, AuthUser};
use crate::api::state::AppState;
use crate::auth::jwt::create_token;
use crate::auth::password::{check_password, hash_password, verify_password};
use crate::domain::errors::validate_length;
use crate::domain::repositories::User;
use crate::domain::user::{Email, Role};

/// Request body for user registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

/// Request body for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response from successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
    pub role: Role,
}

/// Register a new user on the free plan
///
/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let email = Email::new(&req.email)
        .map_err(|e| ApiError::bad_request(format!("Invalid email: {}", e)))?;
    check_password(&req.password).map_err(ApiError::bad_request)?;
    validate_length("Display name", &req.display_name, 1, 50)?;

    let password_hash = hash_password(&req.password).map_err(|e| {
        tracing::error!(error = %e, "password hashing failed");
        ApiError::internal_server_error()
    })?;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        email,
        password_hash,
        display_name: req.display_name.trim().to_string(),
        bio: None,
        avatar_url: None,
        role: Role::User,
        is_premium: false,
        job_id: None,
        style_ids: vec![],
        created_at: now,
        updated_at: now,
    };
    state.users.create(&user).await?;

    // Provisions the default-plan subscription
    state.subscription_repo.current(user.id).await?;
    tracing::info!(user_id = %user.id, "user registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// Login with email and password
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let email =
        Email::new(&req.email).map_err(|_| ApiError::unauthorized("Invalid credentials"))?;

    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let valid = verify_password(&req.password, &user.password_hash).map_err(|e| {
        tracing::error!(error = %e, "password verification failed");
        ApiError::internal_server_error()
    })?;
    if !valid {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    if let Some(suspension) = state
        .moderation_repo
        .active_suspension(user.id, Utc::now())
        .await?
    {
        return Err(ApiError::forbidden(suspended_message(suspension.end_date)));
    }

    if let Err(e) = state.users.update_last_login(user.id).await {
        tracing::warn!(user_id = %user.id, error = %e, "could not record login time");
    }

    let token = create_token(
        user.id,
        user.role,
        &state.config.jwt_secret,
        state.config.jwt_expires_hours,
    )
    .map_err(|e| {
        tracing::error!(error = %e, "token signing failed");
        ApiError::internal_server_error()
    })?;

    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        role: user.role,
    }))
}

/// GET /api/auth/me
pub async fn me(auth: AuthUser) -> Json<UserResponse> {
    Json(UserResponse::from(&auth.0))
}

/// Health check endpoint
///
/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}
