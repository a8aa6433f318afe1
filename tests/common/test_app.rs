//! Test application setup utilities
//!
//! Provides utilities for setting up test instances of the application
//! backed by a temporary SQLite database.

use axum::{body::Body, http::Request, Router};
use tower::{Layer, ServiceExt};
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use uuid::Uuid;

use skillnexus_admin::{
    api_router,
    config::{AppConfig, AuthConfig, DashboardConfig, DatabaseConfig, LoggingConfig, ServerConfig},
    db,
    middleware::auth::create_access_token,
    AppState,
};

/// Test application wrapper for integration testing
pub struct TestApp {
    pub router: NormalizePath<Router>,
    pub state: AppState,
}

impl TestApp {
    /// Create a new test application with a fresh database
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Create a new test application with custom configuration
    pub async fn with_config(config: AppConfig) -> Self {
        let db = db::init_pool(&config.database)
            .await
            .expect("Failed to initialize test database");

        let state = AppState { config, db };

        let router = NormalizePathLayer::trim_trailing_slash().layer(api_router(state.clone()));

        Self { router, state }
    }

    /// Sign an access token for a user id
    pub fn token_for(&self, user_id: i64) -> String {
        create_access_token(
            user_id,
            &format!("user{}@example.com", user_id),
            &self.state.config.auth.jwt_secret,
            1,
        )
        .expect("Failed to generate test token")
    }

    /// Make an unauthenticated GET request
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Make an authenticated GET request
    pub async fn get_as(&self, uri: &str, token: &str) -> TestResponse {
        self.request_with_auth(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
            token,
        )
        .await
    }

    /// Make an authenticated request with a JSON body
    pub async fn send_json_as(
        &self,
        method: &str,
        uri: &str,
        body: serde_json::Value,
        token: &str,
    ) -> TestResponse {
        self.request_with_auth(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            token,
        )
        .await
    }

    /// Make an authenticated POST request with JSON body
    pub async fn post_json_as(&self, uri: &str, body: serde_json::Value, token: &str) -> TestResponse {
        self.send_json_as("POST", uri, body, token).await
    }

    /// Make an authenticated DELETE request
    pub async fn delete_as(&self, uri: &str, token: &str) -> TestResponse {
        self.request_with_auth(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
            token,
        )
        .await
    }

    /// Make a request with authentication
    pub async fn request_with_auth(&self, request: Request<Body>, token: &str) -> TestResponse {
        let (mut parts, body) = request.into_parts();
        parts.headers.insert(
            "Authorization",
            format!("Bearer {}", token).parse().unwrap(),
        );
        self.request(Request::from_parts(parts, body)).await
    }

    /// Make an arbitrary request
    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: axum::http::StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: bytes::Bytes,
}

impl TestResponse {
    /// Get the response body as a string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Parse the response body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse response as JSON")
    }

    /// Assert the response status
    pub fn assert_status(&self, expected: axum::http::StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
        self
    }

    pub fn assert_ok(&self) -> &Self {
        self.assert_status(axum::http::StatusCode::OK)
    }

    pub fn assert_created(&self) -> &Self {
        self.assert_status(axum::http::StatusCode::CREATED)
    }

    pub fn assert_no_content(&self) -> &Self {
        self.assert_status(axum::http::StatusCode::NO_CONTENT)
    }

    pub fn assert_unauthorized(&self) -> &Self {
        self.assert_status(axum::http::StatusCode::UNAUTHORIZED)
    }

    pub fn assert_forbidden(&self) -> &Self {
        self.assert_status(axum::http::StatusCode::FORBIDDEN)
    }

    pub fn assert_not_found(&self) -> &Self {
        self.assert_status(axum::http::StatusCode::NOT_FOUND)
    }

    pub fn assert_conflict(&self) -> &Self {
        self.assert_status(axum::http::StatusCode::CONFLICT)
    }

    pub fn assert_unprocessable(&self) -> &Self {
        self.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY)
    }
}

/// Create a test configuration with a temporary SQLite database
pub fn test_config() -> AppConfig {
    // Use a unique temp file for each test to avoid conflicts
    let db_path = format!(
        "/tmp/skillnexus_test_{}.db",
        Uuid::new_v4().to_string().replace('-', "")
    );

    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors_allowed_origins: Vec::new(),
        },
        database: DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", db_path),
            max_connections: 4,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        },
        auth: AuthConfig {
            jwt_secret: "test_secret_key_that_is_at_least_32_bytes_long".to_string(),
            token_expiry_hours: 1,
        },
        logging: LoggingConfig::default(),
        dashboard: DashboardConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = TestApp::new().await;
        let response = app.get("/api/v1/admin/health").await;
        response.assert_ok();
        let json: serde_json::Value = response.json();
        assert!(json.get("status").is_some());
    }
}
