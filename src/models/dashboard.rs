//! Dashboard response models

use serde::{Deserialize, Serialize};

use super::RecentActivity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminType {
    System,
    School,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub admin_type: AdminType,
    pub total_users: i64,
    pub recent_activity: Vec<RecentActivity>,
    pub system_status: String,
}
