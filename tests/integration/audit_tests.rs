//! Admin audit ledger tests

use axum::{body::Body, http::Request};
use serde_json::json;

use skillnexus_admin::models::{AdminActionType, NewAuditLogEntry, UserRole};
use skillnexus_admin::services::AuditService;

use crate::common::{audit_row_count, seed_user, Campus, TestApp};

const AUDIT_LOGS: &str = "/api/v1/admin/audit-logs";

#[tokio::test]
async fn test_admin_changes_are_recorded_newest_first() {
    let app = TestApp::new().await;
    let campus = Campus::seed(&app).await;
    let token = app.token_for(campus.root.id);
    let teacher = seed_user(&app, campus.lincoln.id, "Kath", "Johnson", UserRole::Teacher).await;

    let created: serde_json::Value = app
        .post_json_as(
            "/api/v1/admin/system-admins",
            json!({ "user": teacher.id }),
            &token,
        )
        .await
        .json();
    let uri = format!("/api/v1/admin/system-admins/{}", created["id"]);
    app.send_json_as("PATCH", &uri, json!({ "is_active": false }), &token)
        .await
        .assert_ok();
    app.delete_as(&uri, &token).await.assert_no_content();

    let response = app.get_as(AUDIT_LOGS, &token).await;
    response.assert_ok();
    let entries: Vec<serde_json::Value> = response.json();

    let descriptions: Vec<&str> = entries
        .iter()
        .map(|e| e["description"].as_str().unwrap())
        .collect();
    assert_eq!(
        descriptions,
        vec![
            "Deleted system admin: Kath Johnson",
            "Updated system admin: Kath Johnson",
            "Created system admin: Kath Johnson",
        ]
    );

    let expected_id = created["id"].to_string();
    for entry in &entries {
        assert_eq!(entry["action_type"], "system_config");
        assert_eq!(entry["resource_type"], "system_admin");
        assert_eq!(entry["resource_id"], expected_id.as_str());
        assert_eq!(entry["admin"], campus.root.id);
        assert_eq!(entry["admin_email"], campus.root.email.as_str());
    }
}

#[tokio::test]
async fn test_ledger_captures_forwarded_client_ip() {
    let app = TestApp::new().await;
    let campus = Campus::seed(&app).await;
    let token = app.token_for(campus.root.id);
    let teacher = seed_user(&app, campus.lincoln.id, "Kath", "Johnson", UserRole::Teacher).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/admin/system-admins")
        .header("Content-Type", "application/json")
        .header("X-Forwarded-For", "203.0.113.7, 10.0.0.1")
        .body(Body::from(json!({ "user": teacher.id }).to_string()))
        .unwrap();
    app.request_with_auth(request, &token).await.assert_created();

    let entries: Vec<serde_json::Value> = app.get_as(AUDIT_LOGS, &token).await.json();
    assert_eq!(entries[0]["ip_address"], "203.0.113.7");
}

#[tokio::test]
async fn test_invalid_action_type_persists_nothing() {
    let app = TestApp::new().await;
    let campus = Campus::seed(&app).await;

    let mut entry =
        NewAuditLogEntry::new(campus.root.id, AdminActionType::DataExport, "Exported grades");
    entry.action_type = "wipe_database".to_string();

    let mut conn = app.state.db.acquire().await.unwrap();
    let result = AuditService::record(&mut conn, entry).await;
    drop(conn);

    assert!(result.is_err());
    assert_eq!(audit_row_count(&app).await, 0);
}

#[tokio::test]
async fn test_ledger_rows_are_immutable() {
    let app = TestApp::new().await;
    let campus = Campus::seed(&app).await;

    let mut conn = app.state.db.acquire().await.unwrap();
    let entry = AuditService::record(
        &mut conn,
        NewAuditLogEntry::new(
            campus.root.id,
            AdminActionType::AccessOverride,
            "Granted temporary access",
        ),
    )
    .await
    .unwrap();

    let update = sqlx::query("UPDATE admin_audit_logs SET description = 'edited' WHERE id = ?")
        .bind(entry.id)
        .execute(&mut *conn)
        .await;
    assert!(update.is_err());

    let delete = sqlx::query("DELETE FROM admin_audit_logs WHERE id = ?")
        .bind(entry.id)
        .execute(&mut *conn)
        .await;
    assert!(delete.is_err());
    drop(conn);

    assert_eq!(audit_row_count(&app).await, 1);
}

#[tokio::test]
async fn test_audit_endpoints_are_read_only() {
    let app = TestApp::new().await;
    let campus = Campus::seed(&app).await;
    let token = app.token_for(campus.root.id);

    let response = app
        .post_json_as(
            AUDIT_LOGS,
            json!({ "action_type": "data_export", "description": "forged" }),
            &token,
        )
        .await;
    assert_eq!(response.status, axum::http::StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(audit_row_count(&app).await, 0);
}

#[tokio::test]
async fn test_school_admin_sees_only_own_school_entries() {
    let app = TestApp::new().await;
    let campus = Campus::seed(&app).await;

    let mut conn = app.state.db.acquire().await.unwrap();
    let root_entry = AuditService::record(
        &mut conn,
        NewAuditLogEntry::new(campus.root.id, AdminActionType::SystemConfig, "Rotated keys"),
    )
    .await
    .unwrap();
    let roosevelt_entry = AuditService::record(
        &mut conn,
        NewAuditLogEntry::new(
            campus.roosevelt_admin.id,
            AdminActionType::ContentModeration,
            "Hid a forum post",
        ),
    )
    .await
    .unwrap();
    drop(conn);

    let roosevelt_token = app.token_for(campus.roosevelt_admin.id);
    let visible: Vec<serde_json::Value> = app.get_as(AUDIT_LOGS, &roosevelt_token).await.json();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0]["id"], roosevelt_entry.id);

    app.get_as(&format!("{}/{}", AUDIT_LOGS, root_entry.id), &roosevelt_token)
        .await
        .assert_not_found();
    app.get_as(
        &format!("{}/{}", AUDIT_LOGS, roosevelt_entry.id),
        &roosevelt_token,
    )
    .await
    .assert_ok();

    let root_token = app.token_for(campus.root.id);
    let everything: Vec<serde_json::Value> = app.get_as(AUDIT_LOGS, &root_token).await.json();
    assert_eq!(everything.len(), 2);
}

#[tokio::test]
async fn test_audit_list_filters() {
    let app = TestApp::new().await;
    let campus = Campus::seed(&app).await;

    let mut conn = app.state.db.acquire().await.unwrap();
    for (action, description) in [
        (AdminActionType::UserManagement, "Bulk activated 2 users (2 requested)"),
        (AdminActionType::DataExport, "Exported attendance"),
        (AdminActionType::UserManagement, "Bulk deactivated 1 users (1 requested)"),
    ] {
        AuditService::record(
            &mut conn,
            NewAuditLogEntry::new(campus.root.id, action, description),
        )
        .await
        .unwrap();
    }
    drop(conn);

    let token = app.token_for(campus.root.id);

    let by_action: Vec<serde_json::Value> = app
        .get_as(&format!("{}?action_type=user_management", AUDIT_LOGS), &token)
        .await
        .json();
    assert_eq!(by_action.len(), 2);

    let by_search: Vec<serde_json::Value> = app
        .get_as(&format!("{}?search=attendance", AUDIT_LOGS), &token)
        .await
        .json();
    assert_eq!(by_search.len(), 1);
    assert_eq!(by_search[0]["action_type"], "data_export");

    let limited: Vec<serde_json::Value> = app
        .get_as(&format!("{}?limit=1", AUDIT_LOGS), &token)
        .await
        .json();
    assert_eq!(limited.len(), 1);
    assert_eq!(
        limited[0]["description"],
        "Bulk deactivated 1 users (1 requested)"
    );

    for wildcard in ["_", "%25"] {
        let literal: Vec<serde_json::Value> = app
            .get_as(&format!("{}?search={}", AUDIT_LOGS, wildcard), &token)
            .await
            .json();
        assert!(literal.is_empty(), "search {:?} matched {:?}", wildcard, literal);
    }

    app.get_as(&format!("{}?action_type=nonsense", AUDIT_LOGS), &token)
        .await
        .assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_system_admin_actions_stay_out_of_school_views() {
    let app = TestApp::new().await;
    let campus = Campus::seed(&app).await;
    let root_token = app.token_for(campus.root.id);
    let rosa = seed_user(&app, campus.roosevelt.id, "Rosa", "Parks", UserRole::Teacher).await;

    app.post_json_as(
        "/api/v1/admin/school-admins",
        json!({ "user": rosa.id, "school": campus.roosevelt.id }),
        &root_token,
    )
    .await
    .assert_created();

    let mut conn = app.state.db.acquire().await.unwrap();
    AuditService::record(
        &mut conn,
        NewAuditLogEntry::new(
            campus.lincoln_admin.id,
            AdminActionType::ContentModeration,
            "Hid a forum post",
        ),
    )
    .await
    .unwrap();
    drop(conn);

    let lincoln: Vec<serde_json::Value> = app
        .get_as(AUDIT_LOGS, &app.token_for(campus.lincoln_admin.id))
        .await
        .json();
    let descriptions: Vec<&str> = lincoln
        .iter()
        .map(|e| e["description"].as_str().unwrap())
        .collect();
    assert_eq!(descriptions, vec!["Hid a forum post"]);

    let roosevelt: Vec<serde_json::Value> = app
        .get_as(AUDIT_LOGS, &app.token_for(campus.roosevelt_admin.id))
        .await
        .json();
    assert!(roosevelt.is_empty());

    let everything: Vec<serde_json::Value> = app.get_as(AUDIT_LOGS, &root_token).await.json();
    assert_eq!(everything.len(), 2);
    assert_eq!(
        everything[1]["description"],
        "Created school admin: Rosa Parks (Roosevelt Middle)"
    );
}
