//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::user::{LoginRequest, RegisterRequest, User},
};

use super::AuthenticatedUser;

/// Response for register and login: the user plus a fresh bearer token
#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    /// Status message
    pub message: String,
    /// The authenticated user
    pub user: User,
    /// Bearer token
    pub token: String,
}

/// Plain status message response
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let (user, token) = state.services.auth.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "Registration successful".to_string(),
            user,
            token,
        }),
    ))
}

/// Log in with email and password.
/// All previously issued tokens are revoked.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let (user, token) = state.services.auth.login(request).await?;

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user,
        token,
    }))
}

/// Log out, revoking the current token set
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn logout(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<MessageResponse>> {
    state.services.auth.logout(claims.user_id).await?;

    Ok(Json(MessageResponse {
        message: "Logout successful".to_string(),
    }))
}

/// Get the acting user
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<User>> {
    let user = state.services.auth.current_user(claims.user_id).await?;
    Ok(Json(user))
}
