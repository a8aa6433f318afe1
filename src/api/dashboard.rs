//! Admin dashboard endpoints

use axum::{extract::State, routing::get, Json, Router};

use crate::{
    middleware::{policy, Authorized},
    models::{DashboardSummary, UserSummary},
    services::DashboardService,
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_dashboard))
        .route("/user_management", get(get_user_management))
}

async fn get_dashboard(
    State(state): State<AppState>,
    principal: Authorized<policy::AnyAdmin>,
) -> Result<Json<DashboardSummary>, AppError> {
    let summary = DashboardService::new(state.db.clone(), state.config.dashboard.clone())
        .summary(&principal)
        .await?;

    Ok(Json(summary))
}

async fn get_user_management(
    State(state): State<AppState>,
    principal: Authorized<policy::ManageUsers>,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    let users = DashboardService::new(state.db.clone(), state.config.dashboard.clone())
        .user_management(&principal)
        .await?;

    Ok(Json(users))
}
