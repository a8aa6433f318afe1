//! Health probe and routing tests

use crate::common::TestApp;

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/admin/health").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_detailed_health_endpoint() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/admin/health/detailed").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["components"]["database"]["status"], "healthy");
}

#[tokio::test]
async fn test_liveness_and_readiness_probes() {
    let app = TestApp::new().await;
    app.get("/api/v1/admin/health/live").await.assert_ok();
    app.get("/api/v1/admin/health/ready").await.assert_ok();
}

#[tokio::test]
async fn test_trailing_slash_is_equivalent() {
    let app = TestApp::new().await;
    app.get("/api/v1/admin/health/").await.assert_ok();
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new().await;

    for uri in [
        "/api/v1/admin/system-admins",
        "/api/v1/admin/school-admins",
        "/api/v1/admin/audit-logs",
        "/api/v1/admin/dashboard",
    ] {
        app.get(uri).await.assert_unauthorized();
    }
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let app = TestApp::new().await;
    app.get_as("/api/v1/admin/dashboard", "not-a-jwt")
        .await
        .assert_unauthorized();
}

#[tokio::test]
async fn test_token_for_unknown_user_is_rejected() {
    let app = TestApp::new().await;
    let token = app.token_for(9999);
    app.get_as("/api/v1/admin/dashboard", &token)
        .await
        .assert_unauthorized();
}
