//! Authentication handlers

use axum::{extract::State, Json};
use serde::Deserialize;

use shared::models::User;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::auth::{AuthTokens, CreateUserInput};
use crate::services::AuthService;
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<AuthTokens>> {
    let service = AuthService::new(state.db.clone(), &state.config);
    let tokens = service.login(&body.email, &body.password).await?;
    Ok(Json(tokens))
}

/// Refresh token endpoint handler
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> AppResult<Json<AuthTokens>> {
    let service = AuthService::new(state.db.clone(), &state.config);
    let tokens = service.refresh_token(&body.refresh_token).await?;
    Ok(Json(tokens))
}

/// Current user endpoint handler
pub async fn me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<User>> {
    let service = AuthService::new(state.db.clone(), &state.config);
    let user = service.get_user(current_user.0.user_id).await?;
    Ok(Json(user))
}

/// Create a user account (admin only)
pub async fn create_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateUserInput>,
) -> AppResult<Json<User>> {
    if !current_user.0.is_admin() {
        return Err(AppError::InsufficientPermissions);
    }

    let service = AuthService::new(state.db.clone(), &state.config);
    let user = service.create_user(input).await?;
    Ok(Json(user))
}
