//! Audit log API endpoints (read-only)

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use crate::{
    db::AuditRepository,
    middleware::{policy, Authorized},
    models::{AdminAuditLog, AuditLogQuery},
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_audit_logs))
        .route("/{id}", get(get_audit_log))
}

async fn list_audit_logs(
    State(state): State<AppState>,
    principal: Authorized<policy::AnyAdmin>,
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<Vec<AdminAuditLog>>, AppError> {
    let scope = principal.scope()?;

    let mut conn = state.db.acquire().await?;
    let logs = AuditRepository::new(&mut conn)
        .list(&query, scope)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list audit logs: {:#}", e);
            AppError::internal("Failed to list audit logs")
        })?;

    Ok(Json(logs))
}

async fn get_audit_log(
    State(state): State<AppState>,
    principal: Authorized<policy::AnyAdmin>,
    Path(id): Path<i64>,
) -> Result<Json<AdminAuditLog>, AppError> {
    let scope = principal.scope()?;

    let mut conn = state.db.acquire().await?;
    let log = AuditRepository::new(&mut conn)
        .get_by_id(id, scope)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get audit log {}: {:#}", id, e);
            AppError::internal("Failed to get audit log")
        })?
        .ok_or_else(|| AppError::not_found(format!("Audit log entry {} not found", id)))?;

    Ok(Json(log))
}
