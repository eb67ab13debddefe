//! Router configuration for the Web API.

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    create_post, get_group, get_post, list_author_posts, list_group_posts, list_groups,
    list_posts, login, logout, me, refresh, register, update_post, AppState,
};
use super::middleware::{
    create_cors_layer, jwt_auth, rate_limit_api, rate_limit_login, JwtState, RateLimitState,
};

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    rate_limit: Arc<RateLimitState>,
    cors_origins: &[String],
) -> Router {
    // Credential endpoints get the stricter login rate limit
    let rate_limit_for_login = rate_limit.clone();
    let auth_credential_routes = Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .layer(middleware::from_fn(move |req, next| {
            let state = rate_limit_for_login.clone();
            rate_limit_login(state, req, next)
        }));

    let auth_session_routes = Router::new()
        .route("/logout", post(logout))
        .route("/refresh", post(refresh))
        .route("/me", get(me));

    let auth_routes = Router::new()
        .merge(auth_credential_routes)
        .merge(auth_session_routes);

    let post_routes = Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/:id", get(get_post).put(update_post));

    let group_routes = Router::new()
        .route("/", get(list_groups))
        .route("/:slug", get(get_group))
        .route("/:slug/posts", get(list_group_posts));

    let user_routes = Router::new().route("/:username/posts", get(list_author_posts));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/posts", post_routes)
        .nest("/groups", group_routes)
        .nest("/users", user_routes);

    // Clone states for the middleware closures
    let jwt_state_for_middleware = jwt_state.clone();
    let rate_limit_for_api = rate_limit.clone();

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state_for_middleware.clone();
                    jwt_auth(state, req, next)
                }))
                .layer(middleware::from_fn(move |req, next| {
                    let state = rate_limit_for_api.clone();
                    rate_limit_api(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
