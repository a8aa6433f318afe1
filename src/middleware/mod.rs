//! Middleware components
//!
//! This module contains middleware and extractors for:
//! - Authentication (JWT)
//! - Admin principal resolution
//! - Client address capture

pub mod auth;
pub mod client_ip;
pub mod principal;

pub use auth::{auth_middleware, AuthUser, Claims};
pub use client_ip::ClientIp;
pub use principal::{policy, AdminPrincipal, Authorized, PolicySpec};
