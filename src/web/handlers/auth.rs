//! Authentication handlers.

use axum::{extract::State, Json};
use std::sync::Arc;
use validator::Validate;

use crate::blog::PostRepository;
use crate::db::{NewUser, RefreshTokenRepository, UserRepository};
use crate::web::dto::{
    ApiResponse, LoginRequest, LoginResponse, LogoutRequest, MeResponse, RefreshRequest,
    RefreshResponse, RegisterRequest, UserInfo,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// POST /api/auth/login - User login.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    let user = UserRepository::new(state.db.pool())
        .get_by_username(&req.username)
        .await
        .map_err(|_| ApiError::unauthorized("Invalid username or password"))?
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?;

    crate::auth::verify_password(&req.password, &user.password)
        .map_err(|_| ApiError::unauthorized("Invalid username or password"))?;

    if !user.is_active {
        return Err(ApiError::forbidden("Account is disabled"));
    }

    let access_token = state.generate_access_token(user.id, &user.username)?;
    let refresh_token = state.issue_refresh_token(user.id).await?;

    let _ = UserRepository::new(state.db.pool())
        .update_last_login(user.id)
        .await;

    let response = LoginResponse {
        access_token,
        refresh_token,
        expires_in: state.access_token_expiry,
        user: UserInfo {
            id: user.id,
            username: user.username,
            nickname: user.nickname,
        },
    };

    Ok(Json(ApiResponse::new(response)))
}

/// POST /api/auth/logout - User logout.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LogoutRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    // Revoke the refresh token
    let repo = RefreshTokenRepository::new(state.db.pool());
    let _ = repo.revoke(&req.refresh_token).await;

    Ok(Json(ApiResponse::new(())))
}

/// POST /api/auth/refresh - Refresh access token.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<RefreshResponse>>, ApiError> {
    let repo = RefreshTokenRepository::new(state.db.pool());

    let token = repo
        .get_valid_token(&req.refresh_token)
        .await
        .map_err(|_| ApiError::internal("Database error"))?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired refresh token"))?;

    let user = UserRepository::new(state.db.pool())
        .get_by_id(token.user_id)
        .await
        .map_err(|_| ApiError::internal("Database error"))?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    if !user.is_active {
        return Err(ApiError::forbidden("Account is disabled"));
    }

    // Rotate: revoke the old token before issuing a new one
    let _ = repo.revoke(&req.refresh_token).await;

    let access_token = state.generate_access_token(user.id, &user.username)?;
    let new_refresh_token = state.issue_refresh_token(user.id).await?;

    let response = RefreshResponse {
        access_token,
        refresh_token: new_refresh_token,
        expires_in: state.access_token_expiry,
    };

    Ok(Json(ApiResponse::new(response)))
}

/// POST /api/auth/register - User registration.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    req.validate().map_err(ApiError::from_validation_errors)?;

    crate::auth::validate_password(&req.password)
        .map_err(|e| ApiError::unprocessable(format!("Password error: {e}")))?;

    let password_hash = crate::auth::hash_password(&req.password)
        .map_err(|_| ApiError::internal("Failed to hash password"))?;

    let user = UserRepository::new(state.db.pool())
        .create(&NewUser::new(&req.username, password_hash, &req.nickname))
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE") {
                ApiError::conflict("Username already exists")
            } else {
                tracing::error!("User creation failed: {}", e);
                ApiError::internal("Failed to create user")
            }
        })?;

    let access_token = state.generate_access_token(user.id, &user.username)?;
    let refresh_token = state.issue_refresh_token(user.id).await?;

    let response = LoginResponse {
        access_token,
        refresh_token,
        expires_in: state.access_token_expiry,
        user: UserInfo {
            id: user.id,
            username: user.username,
            nickname: user.nickname,
        },
    };

    Ok(Json(ApiResponse::new(response)))
}

/// GET /api/auth/me - Get current user info.
pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<MeResponse>>, ApiError> {
    let user = UserRepository::new(state.db.pool())
        .get_by_id(claims.sub)
        .await
        .map_err(|_| ApiError::internal("Database error"))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let post_count = PostRepository::new(state.db.pool())
        .count_by_author(user.id)
        .await
        .unwrap_or(0);

    let response = MeResponse {
        id: user.id,
        username: user.username,
        nickname: user.nickname,
        post_count: post_count as u64,
        created_at: user.created_at,
        last_login_at: user.last_login,
    };

    Ok(Json(ApiResponse::new(response)))
}
