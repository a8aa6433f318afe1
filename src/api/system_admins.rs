//! System admin management API endpoints
//!
//! Full CRUD, restricted to active system admins.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use validator::Validate;

use crate::{
    db::SystemAdminRepository,
    middleware::{policy, Authorized, ClientIp},
    models::{AdminListQuery, CreateSystemAdminRequest, SystemAdmin, UpdateSystemAdminRequest},
    services::{Actor, AdminService},
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_system_admins).post(create_system_admin))
        .route(
            "/{id}",
            get(get_system_admin)
                .put(update_system_admin)
                .patch(update_system_admin)
                .delete(delete_system_admin),
        )
}

async fn list_system_admins(
    State(state): State<AppState>,
    _: Authorized<policy::SystemAdmin>,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<Vec<SystemAdmin>>, AppError> {
    let mut conn = state.db.acquire().await?;
    let admins = SystemAdminRepository::new(&mut conn)
        .list(&query)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list system admins: {:#}", e);
            AppError::internal("Failed to list system admins")
        })?;

    Ok(Json(admins))
}

async fn get_system_admin(
    State(state): State<AppState>,
    _: Authorized<policy::SystemAdmin>,
    Path(id): Path<i64>,
) -> Result<Json<SystemAdmin>, AppError> {
    let mut conn = state.db.acquire().await?;
    let admin = SystemAdminRepository::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("System admin {} not found", id)))?;

    Ok(Json(admin))
}

async fn create_system_admin(
    State(state): State<AppState>,
    principal: Authorized<policy::SystemAdmin>,
    client_ip: ClientIp,
    Json(payload): Json<CreateSystemAdminRequest>,
) -> Result<(StatusCode, Json<SystemAdmin>), AppError> {
    payload.validate()?;

    let actor = Actor::new(principal.user_id(), client_ip.into_string());
    let admin = AdminService::new(state.db.clone())
        .create_system_admin(&actor, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(admin)))
}

async fn update_system_admin(
    State(state): State<AppState>,
    principal: Authorized<policy::SystemAdmin>,
    client_ip: ClientIp,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateSystemAdminRequest>,
) -> Result<Json<SystemAdmin>, AppError> {
    payload.validate()?;

    let actor = Actor::new(principal.user_id(), client_ip.into_string());
    let admin = AdminService::new(state.db.clone())
        .update_system_admin(&actor, id, &payload)
        .await?;

    Ok(Json(admin))
}

async fn delete_system_admin(
    State(state): State<AppState>,
    principal: Authorized<policy::SystemAdmin>,
    client_ip: ClientIp,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let actor = Actor::new(principal.user_id(), client_ip.into_string());
    AdminService::new(state.db.clone())
        .delete_system_admin(&actor, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
