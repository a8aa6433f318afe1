//! Bulk activate/deactivate tests

use serde_json::json;

use skillnexus_admin::models::{SchoolAdminPermissions, UserRole};

use crate::common::{
    audit_row_count, seed_school, seed_school_admin, seed_user, user_is_active, Campus, TestApp,
};

const BULK_ACTIVATE: &str = "/api/v1/admin/users/bulk_activate";
const BULK_DEACTIVATE: &str = "/api/v1/admin/users/bulk_deactivate";

#[tokio::test]
async fn test_school_admin_bulk_deactivate_skips_foreign_rows() {
    let app = TestApp::new().await;

    let lincoln = seed_school(&app, "Lincoln High", "LHS001").await;
    let other = seed_school(&app, "Harbor Academy", "HBA003").await;

    let admin_user =
        seed_user(&app, lincoln.id, "Grace", "Hopper", UserRole::SchoolAdmin).await;
    seed_school_admin(
        &app,
        admin_user.id,
        lincoln.id,
        SchoolAdminPermissions::provisioning_defaults(),
    )
    .await;

    let first = seed_user(&app, lincoln.id, "Ana", "Student", UserRole::Student).await;
    let second = seed_user(&app, lincoln.id, "Ben", "Student", UserRole::Student).await;
    let foreign = seed_user(&app, other.id, "Cora", "Student", UserRole::Student).await;

    let token = app.token_for(admin_user.id);
    let response = app
        .post_json_as(
            BULK_DEACTIVATE,
            json!({ "ids": [first.id, second.id, foreign.id] }),
            &token,
        )
        .await;
    response.assert_ok();

    let result: serde_json::Value = response.json();
    assert_eq!(result["message"], "Successfully deactivated 2 items");
    assert_eq!(result["updated"], 2);
    assert_eq!(result["requested"], 3);

    assert!(!user_is_active(&app, first.id).await);
    assert!(!user_is_active(&app, second.id).await);
    assert!(user_is_active(&app, foreign.id).await);

    let entries: Vec<serde_json::Value> = app
        .get_as("/api/v1/admin/audit-logs", &token)
        .await
        .json();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["action_type"], "user_management");
    assert_eq!(
        entries[0]["description"],
        "Bulk deactivated 2 users (3 requested)"
    );
    assert_eq!(entries[0]["resource_type"], "users");
    assert_eq!(entries[0]["resource_id"], "");
}

#[tokio::test]
async fn test_school_admin_without_grant_is_forbidden() {
    let app = TestApp::new().await;
    let campus = Campus::seed(&app).await;
    let token = app.token_for(campus.roosevelt_admin.id);
    let target = campus.roosevelt_students[0].id;

    let response = app
        .post_json_as(BULK_DEACTIVATE, json!({ "ids": [target] }), &token)
        .await;
    response.assert_forbidden();
    assert!(response.text().contains("can_manage_users"));

    assert!(user_is_active(&app, target).await);
    assert_eq!(audit_row_count(&app).await, 0);
}

#[tokio::test]
async fn test_system_admin_bulk_spans_schools() {
    let app = TestApp::new().await;
    let campus = Campus::seed(&app).await;
    let token = app.token_for(campus.root.id);

    let ids = vec![campus.lincoln_students[0].id, campus.roosevelt_students[0].id];
    app.post_json_as(BULK_DEACTIVATE, json!({ "ids": ids }), &token)
        .await
        .assert_ok();
    for id in &ids {
        assert!(!user_is_active(&app, *id).await);
    }

    let result: serde_json::Value = app
        .post_json_as(BULK_ACTIVATE, json!({ "ids": ids }), &token)
        .await
        .json();
    assert_eq!(result["message"], "Successfully activated 2 items");
    for id in &ids {
        assert!(user_is_active(&app, *id).await);
    }

    assert_eq!(audit_row_count(&app).await, 2);
}

#[tokio::test]
async fn test_duplicate_and_unknown_ids() {
    let app = TestApp::new().await;
    let campus = Campus::seed(&app).await;
    let token = app.token_for(campus.root.id);
    let id = campus.lincoln_students[1].id;

    let result: serde_json::Value = app
        .post_json_as(BULK_DEACTIVATE, json!({ "ids": [id, id, 90210] }), &token)
        .await
        .json();
    assert_eq!(result["requested"], 2);
    assert_eq!(result["updated"], 1);
}

#[tokio::test]
async fn test_empty_or_invalid_ids_are_rejected() {
    let app = TestApp::new().await;
    let campus = Campus::seed(&app).await;
    let token = app.token_for(campus.root.id);

    app.post_json_as(BULK_ACTIVATE, json!({ "ids": [] }), &token)
        .await
        .assert_unprocessable();
    app.post_json_as(BULK_ACTIVATE, json!({ "ids": [-4] }), &token)
        .await
        .assert_unprocessable();

    assert_eq!(audit_row_count(&app).await, 0);
}

#[tokio::test]
async fn test_plain_user_cannot_bulk_toggle() {
    let app = TestApp::new().await;
    let campus = Campus::seed(&app).await;
    let token = app.token_for(campus.lincoln_students[0].id);

    app.post_json_as(
        BULK_DEACTIVATE,
        json!({ "ids": [campus.lincoln_students[1].id] }),
        &token,
    )
    .await
    .assert_forbidden();
}

#[tokio::test]
async fn test_school_admin_cannot_deactivate_system_admin() {
    let app = TestApp::new().await;
    let campus = Campus::seed(&app).await;
    let token = app.token_for(campus.lincoln_admin.id);
    let student = campus.lincoln_students[0].id;

    let result: serde_json::Value = app
        .post_json_as(
            BULK_DEACTIVATE,
            json!({ "ids": [campus.root.id, student] }),
            &token,
        )
        .await
        .json();
    assert_eq!(result["updated"], 1);
    assert_eq!(result["requested"], 2);

    assert!(user_is_active(&app, campus.root.id).await);
    assert!(!user_is_active(&app, student).await);
    app.get_as("/api/v1/admin/dashboard", &app.token_for(campus.root.id))
        .await
        .assert_ok();
}

#[tokio::test]
async fn test_failed_ledger_write_rolls_back_bulk_update() {
    let app = TestApp::new().await;
    let campus = Campus::seed(&app).await;
    let token = app.token_for(campus.root.id);
    let target = campus.lincoln_students[0].id;

    sqlx::query(
        "CREATE TRIGGER reject_audit_insert BEFORE INSERT ON admin_audit_logs \
         BEGIN SELECT RAISE(ABORT, 'ledger unavailable'); END",
    )
    .execute(&app.state.db)
    .await
    .unwrap();

    app.post_json_as(BULK_DEACTIVATE, json!({ "ids": [target] }), &token)
        .await
        .assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);

    assert!(user_is_active(&app, target).await);
    assert_eq!(audit_row_count(&app).await, 0);
}

#[tokio::test]
async fn test_authorization_precedes_body_parsing() {
    let app = TestApp::new().await;
    let campus = Campus::seed(&app).await;

    for token in [
        app.token_for(campus.roosevelt_admin.id),
        app.token_for(campus.lincoln_students[0].id),
    ] {
        app.post_json_as(BULK_DEACTIVATE, json!({ "ids": "oops" }), &token)
            .await
            .assert_forbidden();
    }
}
