//! School admin management API endpoints
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
    db::SchoolAdminRepository,
    middleware::{policy, Authorized, ClientIp},
    models::{AdminListQuery, CreateSchoolAdminRequest, SchoolAdmin, UpdateSchoolAdminRequest},
    services::{Actor, AdminService},
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_school_admins).post(create_school_admin))
        .route(
            "/{id}",
            get(get_school_admin)
                .put(update_school_admin)
                .patch(update_school_admin)
                .delete(delete_school_admin),
        )
}

async fn list_school_admins(
    State(state): State<AppState>,
    principal: Authorized<policy::SystemAdmin>,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<Vec<SchoolAdmin>>, AppError> {
    let scope = principal.scope()?;

    let mut conn = state.db.acquire().await?;
    let admins = SchoolAdminRepository::new(&mut conn)
        .list(&query, scope)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list school admins: {:#}", e);
            AppError::internal("Failed to list school admins")
        })?;

    Ok(Json(admins))
}

async fn get_school_admin(
    State(state): State<AppState>,
    _: Authorized<policy::SystemAdmin>,
    Path(id): Path<i64>,
) -> Result<Json<SchoolAdmin>, AppError> {
    let mut conn = state.db.acquire().await?;
    let admin = SchoolAdminRepository::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("School admin {} not found", id)))?;

    Ok(Json(admin))
}

async fn create_school_admin(
    State(state): State<AppState>,
    principal: Authorized<policy::SystemAdmin>,
    client_ip: ClientIp,
    Json(payload): Json<CreateSchoolAdminRequest>,
) -> Result<(StatusCode, Json<SchoolAdmin>), AppError> {
    payload.validate()?;

    let actor = Actor::new(principal.user_id(), client_ip.into_string());
    let admin = AdminService::new(state.db.clone())
        .create_school_admin(&actor, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(admin)))
}

async fn update_school_admin(
    State(state): State<AppState>,
    principal: Authorized<policy::SystemAdmin>,
    client_ip: ClientIp,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateSchoolAdminRequest>,
) -> Result<Json<SchoolAdmin>, AppError> {
    payload.validate()?;

    let actor = Actor::new(principal.user_id(), client_ip.into_string());
    let admin = AdminService::new(state.db.clone())
        .update_school_admin(&actor, id, &payload)
        .await?;

    Ok(Json(admin))
}

async fn delete_school_admin(
    State(state): State<AppState>,
    principal: Authorized<policy::SystemAdmin>,
    client_ip: ClientIp,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let actor = Actor::new(principal.user_id(), client_ip.into_string());
    AdminService::new(state.db.clone())
        .delete_school_admin(&actor, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
