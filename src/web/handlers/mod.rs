//! API handlers for the Web API.

pub mod auth;
pub mod groups;
pub mod posts;

pub use auth::*;
pub use groups::*;
pub use posts::*;

use std::sync::Arc;

use jsonwebtoken::{encode, EncodingKey, Header};

use crate::config::{AuthConfig, ListingConfig};
use crate::db::{NewRefreshToken, RefreshTokenRepository};
use crate::web::error::ApiError;
use crate::web::middleware::JwtClaims;
use crate::Database;

/// Shared database handle for the Web API.
pub type SharedDatabase = Arc<Database>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle.
    pub db: SharedDatabase,
    /// JWT encoding key.
    pub encoding_key: EncodingKey,
    /// Access token expiry in seconds.
    pub access_token_expiry: u64,
    /// Refresh token expiry in days.
    pub refresh_token_expiry_days: u64,
    /// Listing configuration (page size).
    pub listing: ListingConfig,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: SharedDatabase, auth: &AuthConfig, listing: &ListingConfig) -> Self {
        Self {
            db,
            encoding_key: EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
            access_token_expiry: auth.jwt_access_token_expiry_secs,
            refresh_token_expiry_days: auth.jwt_refresh_token_expiry_days,
            listing: listing.clone(),
        }
    }

    /// Generate an access token for a user.
    pub fn generate_access_token(
        &self,
        user_id: i64,
        username: &str,
    ) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = JwtClaims {
            sub: user_id,
            username: username.to_string(),
            iat: now,
            exp: now + self.access_token_expiry,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            ApiError::internal("Failed to generate token")
        })
    }

    /// Generate and persist a refresh token for a user.
    pub async fn issue_refresh_token(&self, user_id: i64) -> Result<String, ApiError> {
        let token = uuid::Uuid::new_v4().to_string();
        let expires_at = chrono::Utc::now()
            + chrono::Duration::days(self.refresh_token_expiry_days as i64);

        let repo = RefreshTokenRepository::new(self.db.pool());
        repo.create(&NewRefreshToken {
            user_id,
            token: token.clone(),
            expires_at: expires_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        })
        .await
        .map_err(|e| {
            tracing::error!("Failed to store refresh token: {}", e);
            ApiError::internal("Failed to create session")
        })?;

        Ok(token)
    }
}
