//! Dashboard endpoint tests

use skillnexus_admin::models::{AdminActionType, NewAuditLogEntry, UserRole};
use skillnexus_admin::services::AuditService;

use crate::common::{seed_user, Campus, TestApp};

const DASHBOARD: &str = "/api/v1/admin/dashboard";
const USER_MANAGEMENT: &str = "/api/v1/admin/dashboard/user_management";

#[tokio::test]
async fn test_system_admin_dashboard_counts_all_users() {
    let app = TestApp::new().await;
    let campus = Campus::seed(&app).await;
    let token = app.token_for(campus.root.id);

    let response = app.get_as(DASHBOARD, &token).await;
    response.assert_ok();

    let summary: serde_json::Value = response.json();
    assert_eq!(summary["admin_type"], "system");
    assert_eq!(summary["total_users"], 7);
    assert_eq!(summary["system_status"], "active");
    assert_eq!(summary["recent_activity"], serde_json::json!([]));
}

#[tokio::test]
async fn test_school_admin_dashboard_counts_own_school() {
    let app = TestApp::new().await;
    let campus = Campus::seed(&app).await;

    let lincoln: serde_json::Value = app
        .get_as(DASHBOARD, &app.token_for(campus.lincoln_admin.id))
        .await
        .json();
    assert_eq!(lincoln["admin_type"], "school");
    assert_eq!(lincoln["total_users"], 4);

    let roosevelt: serde_json::Value = app
        .get_as(DASHBOARD, &app.token_for(campus.roosevelt_admin.id))
        .await
        .json();
    assert_eq!(roosevelt["total_users"], 3);
}

#[tokio::test]
async fn test_recent_activity_is_own_and_capped() {
    let app = TestApp::new().await;
    let campus = Campus::seed(&app).await;

    let mut conn = app.state.db.acquire().await.unwrap();
    for n in 1..=12 {
        AuditService::record(
            &mut conn,
            NewAuditLogEntry::new(
                campus.root.id,
                AdminActionType::DataExport,
                format!("Export #{}", n),
            ),
        )
        .await
        .unwrap();
    }
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

    let root: serde_json::Value = app
        .get_as(DASHBOARD, &app.token_for(campus.root.id))
        .await
        .json();
    let activity = root["recent_activity"].as_array().unwrap();
    assert_eq!(activity.len(), 10);
    assert_eq!(activity[0]["description"], "Export #12");
    assert_eq!(activity[9]["description"], "Export #3");
    assert_eq!(activity[0]["action_type"], "data_export");

    let school: serde_json::Value = app
        .get_as(DASHBOARD, &app.token_for(campus.lincoln_admin.id))
        .await
        .json();
    let activity = school["recent_activity"].as_array().unwrap();
    assert_eq!(activity.len(), 1);
    assert_eq!(activity[0]["description"], "Hid a forum post");
}

#[tokio::test]
async fn test_user_management_is_school_scoped() {
    let app = TestApp::new().await;
    let campus = Campus::seed(&app).await;

    let users: Vec<serde_json::Value> = app
        .get_as(USER_MANAGEMENT, &app.token_for(campus.lincoln_admin.id))
        .await
        .json();
    let ids: Vec<i64> = users.iter().map(|u| u["id"].as_i64().unwrap()).collect();

    let mut expected = vec![
        campus.root.id,
        campus.lincoln_admin.id,
        campus.lincoln_students[0].id,
        campus.lincoln_students[1].id,
    ];
    expected.sort();
    assert_eq!(ids, expected);
    assert_eq!(users[0]["name"], "Ada Lovelace");
    assert_eq!(users[0]["role"], "ADMIN");
    assert_eq!(users[0]["is_active"], true);
}

#[tokio::test]
async fn test_user_management_requires_grant() {
    let app = TestApp::new().await;
    let campus = Campus::seed(&app).await;

    app.get_as(USER_MANAGEMENT, &app.token_for(campus.roosevelt_admin.id))
        .await
        .assert_forbidden();

    let all: Vec<serde_json::Value> = app
        .get_as(USER_MANAGEMENT, &app.token_for(campus.root.id))
        .await
        .json();
    assert_eq!(all.len(), 7);
}

#[tokio::test]
async fn test_user_management_returns_first_fifty_by_id() {
    let app = TestApp::new().await;
    let campus = Campus::seed(&app).await;
    for n in 0..55 {
        seed_user(
            &app,
            campus.lincoln.id,
            &format!("Pupil{}", n),
            "Extra",
            UserRole::Student,
        )
        .await;
    }

    let users: Vec<serde_json::Value> = app
        .get_as(USER_MANAGEMENT, &app.token_for(campus.root.id))
        .await
        .json();
    assert_eq!(users.len(), 50);

    let ids: Vec<i64> = users.iter().map(|u| u["id"].as_i64().unwrap()).collect();
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(ids[0], campus.root.id);
}
