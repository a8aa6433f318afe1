//! API routes and handlers
//!
//! This module defines all admin API endpoints and their routing.

use axum::{routing::get, Router};

use crate::AppState;

mod audit_logs;
mod dashboard;
mod health;
mod school_admins;
mod system_admins;
mod users;

pub use health::*;

/// Public API routes (no authentication required)
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/detailed", get(health::health_check_detailed))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
}

/// Protected API routes (authentication required)
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .nest("/system-admins", system_admins::routes())
        .nest("/school-admins", school_admins::routes())
        .nest("/audit-logs", audit_logs::routes())
        .nest("/dashboard", dashboard::routes())
        .nest("/users", users::routes())
}
