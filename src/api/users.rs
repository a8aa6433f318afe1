//! User bulk actions

use axum::{extract::State, routing::post, Json, Router};
use validator::Validate;

use crate::{
    db::ScopedResource,
    middleware::{policy, Authorized, ClientIp},
    services::{Actor, BulkAction, BulkIdsRequest, BulkResult, BulkService},
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bulk_activate", post(bulk_activate))
        .route("/bulk_deactivate", post(bulk_deactivate))
}

async fn bulk_activate(
    State(state): State<AppState>,
    principal: Authorized<policy::ManageUsers>,
    client_ip: ClientIp,
    Json(payload): Json<BulkIdsRequest>,
) -> Result<Json<BulkResult>, AppError> {
    bulk_toggle(state, principal, client_ip, payload, BulkAction::Activate).await
}

async fn bulk_deactivate(
    State(state): State<AppState>,
    principal: Authorized<policy::ManageUsers>,
    client_ip: ClientIp,
    Json(payload): Json<BulkIdsRequest>,
) -> Result<Json<BulkResult>, AppError> {
    bulk_toggle(state, principal, client_ip, payload, BulkAction::Deactivate).await
}

async fn bulk_toggle(
    state: AppState,
    principal: Authorized<policy::ManageUsers>,
    client_ip: ClientIp,
    payload: BulkIdsRequest,
    action: BulkAction,
) -> Result<Json<BulkResult>, AppError> {
    payload.validate()?;
    let scope = principal.scope()?;

    let actor = Actor::new(principal.user_id(), client_ip.into_string());
    let result = BulkService::new(state.db.clone())
        .apply(&actor, ScopedResource::Users, scope, action, &payload.ids)
        .await?;

    Ok(Json(result))
}
