//! Request DTOs for the Web API.

use serde::Deserialize;
use validator::Validate;

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Logout request.
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    /// Refresh token to invalidate.
    pub refresh_token: String,
}

/// Token refresh request.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token.
    pub refresh_token: String,
}

/// User registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Username.
    #[validate(length(min = 3, max = 32, message = "username must be 3-32 characters"))]
    pub username: String,
    /// Password.
    pub password: String,
    /// Nickname.
    #[validate(length(min = 1, max = 64, message = "nickname must be 1-64 characters"))]
    pub nickname: String,
}

/// Post creation request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    /// Post text.
    #[validate(length(max = 10000, message = "text is too long"))]
    pub text: String,
    /// Group to assign the post to (optional).
    #[serde(default)]
    pub group_id: Option<i64>,
}

/// Post edit request.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostRequest {
    /// New post text.
    #[validate(length(max = 10000, message = "text is too long"))]
    pub text: String,
    /// New group assignment (omitted or null clears the group).
    #[serde(default)]
    pub group_id: Option<i64>,
}

/// Pagination query parameters for listing endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PaginationQuery {
    /// 1-indexed page number.
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_page() -> u32 {
    1
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
        }
    }
}

impl PaginationQuery {
    /// Normalized page number (at least 1).
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }
}
