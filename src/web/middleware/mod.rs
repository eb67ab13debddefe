//! Middleware for the Web API.

mod auth;
mod cors;
mod rate_limit;

pub use auth::{jwt_auth, AuthUser, JwtClaims, JwtState, OptionalAuthUser};
pub use cors::create_cors_layer;
pub use rate_limit::{rate_limit_api, rate_limit_login, RateLimitState};
