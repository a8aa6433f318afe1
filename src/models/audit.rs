//! Admin audit ledger models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::validate_action_type;

/// Kind of administrative action recorded in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminActionType {
    UserManagement,
    ContentModeration,
    SystemConfig,
    DataExport,
    AccessOverride,
}

impl AdminActionType {
    pub fn all() -> [AdminActionType; 5] {
        [
            AdminActionType::UserManagement,
            AdminActionType::ContentModeration,
            AdminActionType::SystemConfig,
            AdminActionType::DataExport,
            AdminActionType::AccessOverride,
        ]
    }

    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminActionType::UserManagement => "user_management",
            AdminActionType::ContentModeration => "content_moderation",
            AdminActionType::SystemConfig => "system_config",
            AdminActionType::DataExport => "data_export",
            AdminActionType::AccessOverride => "access_override",
        }
    }
}

impl fmt::Display for AdminActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminActionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdminActionType::all()
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Invalid action type: {}", s))
    }
}

/// A persisted ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAuditLog {
    pub id: i64,
    /// Acting user identity
    #[serde(rename = "admin")]
    pub admin_id: i64,
    pub admin_name: String,
    pub admin_email: String,
    pub action_type: AdminActionType,
    pub description: String,
    pub resource_id: String,
    pub resource_type: String,
    pub timestamp: DateTime<Utc>,
    pub ip_address: Option<String>,
}

/// A ledger entry about to be written.
///
/// `action_type` stays a string until it crosses the persistence boundary so
/// that unknown values are rejected there as validation failures.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAuditLogEntry {
    pub admin_id: i64,
    #[validate(custom(function = "validate_action_type"))]
    pub action_type: String,
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
    #[validate(length(max = 100))]
    pub resource_id: String,
    #[validate(length(max = 50))]
    pub resource_type: String,
    #[validate(length(max = 45))]
    pub ip_address: Option<String>,
}

impl NewAuditLogEntry {
    pub fn new(admin_id: i64, action_type: AdminActionType, description: impl Into<String>) -> Self {
        Self {
            admin_id,
            action_type: action_type.as_str().to_string(),
            description: description.into(),
            resource_id: String::new(),
            resource_type: String::new(),
            ip_address: None,
        }
    }

    pub fn with_resource(
        mut self,
        resource_id: impl Into<String>,
        resource_type: impl Into<String>,
    ) -> Self {
        self.resource_id = resource_id.into();
        self.resource_type = resource_type.into();
        self
    }

    pub fn with_ip(mut self, ip_address: Option<String>) -> Self {
        self.ip_address = ip_address;
        self
    }
}

/// Filters accepted by the audit log listing
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuditLogQuery {
    pub action_type: Option<AdminActionType>,
    /// Acting user id
    pub admin: Option<i64>,
    pub resource_type: Option<String>,
    /// Substring match on description or acting admin email
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Condensed ledger entry shown on the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecentActivity {
    pub action_type: AdminActionType,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl From<AdminAuditLog> for RecentActivity {
    fn from(entry: AdminAuditLog) -> Self {
        Self {
            action_type: entry.action_type,
            description: entry.description,
            timestamp: entry.timestamp,
        }
    }
}
