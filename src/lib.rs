//! SkillNexus Admin Library
//!
//! Administrative back-office for the SkillNexus school platform: system and
//! school admin accounts, the admin audit ledger, scoped user management and
//! the admin dashboard.

use axum::Router;

pub mod api;
pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AppConfig;
pub use db::DbPool;
pub use middleware::{auth_middleware, AuthUser, Claims};

/// Path prefix of every admin endpoint
pub const API_PREFIX: &str = "/api/v1/admin";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Database connection pool
    pub db: DbPool,
}

/// Build the admin API router.
///
/// Authentication is applied to protected routes only so the health probes
/// stay reachable.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .nest(API_PREFIX, api::public_routes())
        .nest(
            API_PREFIX,
            api::protected_routes().layer(axum::middleware::from_fn_with_state(
                state.clone(),
                middleware::auth::auth_middleware,
            )),
        )
        .with_state(state)
}
