//! Admin permission predicates
//!
//! Each policy is an explicit predicate over the caller's admin role records.
//! Inactive records grant nothing, and a caller without any active record is
//! denied every policy.

use crate::db::Scope;
use crate::models::{SchoolAdmin, SystemAdmin};

/// Access policies attached to admin endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Active system admin only
    SystemAdmin,
    /// Any active admin, system or school
    AnyAdmin,
    /// Active system admin, or active school admin holding `can_manage_users`
    ManageUsers,
}

impl Policy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Policy::SystemAdmin => "system_admin",
            Policy::AnyAdmin => "any_admin",
            Policy::ManageUsers => "manage_users",
        }
    }
}

/// Outcome of a policy evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionCheck {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl PermissionCheck {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// The admin role records held by one user identity
#[derive(Debug, Clone, Default)]
pub struct AdminRoles {
    pub system_admin: Option<SystemAdmin>,
    pub school_admin: Option<SchoolAdmin>,
}

impl AdminRoles {
    pub fn is_system_admin(&self) -> bool {
        self.system_admin.as_ref().is_some_and(|sa| sa.is_active)
    }

    pub fn is_school_admin(&self) -> bool {
        self.school_admin.as_ref().is_some_and(|sa| sa.is_active)
    }

    pub fn can_manage_users(&self) -> bool {
        if self.is_system_admin() {
            return true;
        }
        self.school_admin
            .as_ref()
            .is_some_and(|sa| sa.is_active && sa.permissions.can_manage_users())
    }

    /// Row visibility of this caller; `None` when it holds no active role
    pub fn scope(&self) -> Option<Scope> {
        if self.is_system_admin() {
            return Some(Scope::Global);
        }
        self.school_admin
            .as_ref()
            .filter(|sa| sa.is_active)
            .map(|sa| Scope::School(sa.school_id))
    }

    pub fn check(&self, policy: Policy) -> PermissionCheck {
        match policy {
            Policy::SystemAdmin if self.is_system_admin() => PermissionCheck::allow(),
            Policy::SystemAdmin => PermissionCheck::deny("System admin access required"),
            Policy::AnyAdmin if self.is_system_admin() || self.is_school_admin() => {
                PermissionCheck::allow()
            }
            Policy::AnyAdmin => PermissionCheck::deny("Admin access required"),
            Policy::ManageUsers if self.can_manage_users() => PermissionCheck::allow(),
            Policy::ManageUsers if self.is_school_admin() => {
                PermissionCheck::deny("School admin lacks the can_manage_users permission")
            }
            Policy::ManageUsers => PermissionCheck::deny("User management permission required"),
        }
    }
}
