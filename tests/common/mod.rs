//! Test helpers for Web API tests.
//!
//! Provides a TestServer over the API router with an in-memory database.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use serde_json::{json, Value};

use quill::blog::{GroupRepository, NewGroup};
use quill::config::Config;
use quill::web::handlers::AppState;
use quill::web::middleware::{JwtState, RateLimitState};
use quill::web::router::{create_health_router, create_router};
use quill::Database;

/// Create a test configuration with generous rate limits.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.jwt_secret = "test-secret-key-for-testing-only".to_string();
    config.auth.login_rate_limit = 100;
    config.auth.api_rate_limit = 10_000;
    config
}

/// Create a test server with an in-memory database.
pub async fn create_test_server() -> (TestServer, Arc<Database>) {
    create_test_server_with_config(test_config()).await
}

/// Create a test server with custom configuration.
pub async fn create_test_server_with_config(config: Config) -> (TestServer, Arc<Database>) {
    let db = Arc::new(
        Database::open_in_memory()
            .await
            .expect("Failed to create test database"),
    );

    let app_state = Arc::new(AppState::new(db.clone(), &config.auth, &config.listing));
    let jwt_state = Arc::new(JwtState::new(&config.auth.jwt_secret));
    let rate_limit = Arc::new(RateLimitState::new(
        config.auth.login_rate_limit,
        config.auth.api_rate_limit,
    ));

    let router = create_router(
        app_state,
        jwt_state,
        rate_limit,
        &config.server.cors_origins,
    )
    .merge(create_health_router());

    let server = TestServer::new(router).expect("Failed to create test server");

    (server, db)
}

/// Register a test user and return the response body.
pub async fn register_test_user(
    server: &TestServer,
    username: &str,
    password: &str,
    nickname: &str,
) -> Value {
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "username": username,
            "password": password,
            "nickname": nickname
        }))
        .await;

    response.json::<Value>()
}

/// Register a test user and return just the access token.
pub async fn register_and_get_token(server: &TestServer, username: &str) -> String {
    let body = register_test_user(server, username, "password123", username).await;
    body["data"]["access_token"]
        .as_str()
        .expect("registration should return an access token")
        .to_string()
}

/// Create a test group directly in the database.
///
/// Groups are provisioned out of band (there is no public group-creation
/// endpoint), so tests insert them through the repository.
pub async fn create_test_group(db: &Database, title: &str, slug: &str) -> i64 {
    let repo = GroupRepository::new(db.pool());
    repo.create(&NewGroup::new(title, slug).with_description(format!("{title} group")))
        .await
        .expect("Failed to create test group")
        .id
}
