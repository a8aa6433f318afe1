//! Admin account models

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::validate_permission_keys;

pub const CAN_MANAGE_USERS: &str = "can_manage_users";
pub const CAN_MODERATE_CONTENT: &str = "can_moderate_content";
pub const CAN_VIEW_ANALYTICS: &str = "can_view_analytics";

/// Open key→boolean grant map attached to a school admin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct SchoolAdminPermissions(pub BTreeMap<String, bool>);

impl SchoolAdminPermissions {
    /// Grants applied when a school admin is provisioned without an explicit map
    pub fn provisioning_defaults() -> Self {
        let mut grants = BTreeMap::new();
        grants.insert(CAN_MANAGE_USERS.to_string(), true);
        grants.insert(CAN_MODERATE_CONTENT.to_string(), true);
        grants.insert(CAN_VIEW_ANALYTICS.to_string(), true);
        Self(grants)
    }

    /// Whether a grant is present and true; absent keys deny
    pub fn grants(&self, key: &str) -> bool {
        self.0.get(key).copied().unwrap_or(false)
    }

    pub fn can_manage_users(&self) -> bool {
        self.grants(CAN_MANAGE_USERS)
    }
}

impl From<BTreeMap<String, bool>> for SchoolAdminPermissions {
    fn from(grants: BTreeMap<String, bool>) -> Self {
        Self(grants)
    }
}

/// Platform-wide administrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemAdmin {
    pub id: i64,
    #[serde(rename = "user")]
    pub user_id: i64,
    pub user_email: String,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Administrator confined to one school
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolAdmin {
    pub id: i64,
    #[serde(rename = "user")]
    pub user_id: i64,
    pub user_email: String,
    pub user_name: String,
    #[serde(rename = "school")]
    pub school_id: i64,
    pub school_name: String,
    pub permissions: SchoolAdminPermissions,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSystemAdminRequest {
    #[validate(range(min = 1))]
    pub user: i64,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateSystemAdminRequest {
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSchoolAdminRequest {
    #[validate(range(min = 1))]
    pub user: i64,
    #[validate(range(min = 1))]
    pub school: i64,
    #[validate(custom(function = "validate_permission_keys"))]
    pub permissions: Option<BTreeMap<String, bool>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateSchoolAdminRequest {
    #[validate(range(min = 1))]
    pub school: Option<i64>,
    #[validate(custom(function = "validate_permission_keys"))]
    pub permissions: Option<BTreeMap<String, bool>>,
    pub is_active: Option<bool>,
}

/// Filters accepted by the admin account listings
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AdminListQuery {
    pub school: Option<i64>,
    pub is_active: Option<bool>,
}
