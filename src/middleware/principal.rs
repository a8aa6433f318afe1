//! Admin principal resolution
//!
//! Resolves the authenticated identity to its user row and admin role records
//! so handlers can evaluate policies and scope queries.

use std::marker::PhantomData;
use std::ops::Deref;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::auth::AuthUser;
use crate::{
    db::{Scope, SchoolAdminRepository, SystemAdminRepository, UserRepository},
    models::User,
    services::permissions::{AdminRoles, Policy},
    utils::{AppError, AppResult},
    AppState,
};

/// The calling user together with its admin role records
#[derive(Debug, Clone)]
pub struct AdminPrincipal {
    pub user: User,
    pub roles: AdminRoles,
}

impl AdminPrincipal {
    pub fn user_id(&self) -> i64 {
        self.user.id
    }

    pub fn is_system_admin(&self) -> bool {
        self.roles.is_system_admin()
    }

    pub fn is_school_admin(&self) -> bool {
        self.roles.is_school_admin()
    }

    pub fn can_manage_users(&self) -> bool {
        self.roles.can_manage_users()
    }

    /// Fail with 403 unless `policy` allows this caller
    pub fn authorize(&self, policy: Policy) -> AppResult<()> {
        let check = self.roles.check(policy);
        if check.allowed {
            return Ok(());
        }

        tracing::warn!(
            user_id = self.user.id,
            policy = policy.as_str(),
            "Admin permission denied"
        );
        Err(AppError::forbidden(
            check
                .reason
                .unwrap_or_else(|| "Permission denied".to_string()),
        ))
    }

    /// Row visibility for this caller; 403 when it holds no active role
    pub fn scope(&self) -> AppResult<Scope> {
        self.roles
            .scope()
            .ok_or_else(|| AppError::forbidden("Admin access required"))
    }
}

impl FromRequestParts<AppState> for AdminPrincipal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_user = parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("Authentication required"))?;

        let mut conn = state.db.acquire().await.map_err(|e| {
            tracing::error!("Failed to acquire database connection: {}", e);
            AppError::internal("Failed to resolve admin principal")
        })?;

        let user = UserRepository::new(&mut conn)
            .get_by_id(auth_user.id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Unknown user"))?;

        if !user.is_active {
            return Err(AppError::unauthorized("User account is inactive"));
        }

        let system_admin = SystemAdminRepository::new(&mut conn)
            .get_by_user_id(user.id)
            .await?;
        let school_admin = SchoolAdminRepository::new(&mut conn)
            .get_by_user_id(user.id)
            .await?;

        Ok(AdminPrincipal {
            user,
            roles: AdminRoles {
                system_admin,
                school_admin,
            },
        })
    }
}

/// Binds a [`Policy`] to a type so it can be checked by an extractor
pub trait PolicySpec {
    const POLICY: Policy;
}

/// Marker types for [`Authorized`]
pub mod policy {
    use super::{Policy, PolicySpec};

    pub struct SystemAdmin;
    pub struct AnyAdmin;
    pub struct ManageUsers;

    impl PolicySpec for SystemAdmin {
        const POLICY: Policy = Policy::SystemAdmin;
    }

    impl PolicySpec for AnyAdmin {
        const POLICY: Policy = Policy::AnyAdmin;
    }

    impl PolicySpec for ManageUsers {
        const POLICY: Policy = Policy::ManageUsers;
    }
}

/// An [`AdminPrincipal`] that already passed policy `P`.
///
/// The check runs while request parts are extracted, so a denied caller gets
/// 403 before any body extractor runs.
pub struct Authorized<P: PolicySpec> {
    principal: AdminPrincipal,
    _policy: PhantomData<P>,
}

impl<P: PolicySpec> Deref for Authorized<P> {
    type Target = AdminPrincipal;

    fn deref(&self) -> &Self::Target {
        &self.principal
    }
}

impl<P> FromRequestParts<AppState> for Authorized<P>
where
    P: PolicySpec + Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal = AdminPrincipal::from_request_parts(parts, state).await?;
        principal.authorize(P::POLICY)?;
        Ok(Self {
            principal,
            _policy: PhantomData,
        })
    }
}
