//! Dashboard aggregation

use crate::config::DashboardConfig;
use crate::db::{AuditRepository, DbPool, UserRepository};
use crate::middleware::AdminPrincipal;
use crate::models::{AdminType, DashboardSummary, RecentActivity, UserSummary};
use crate::utils::AppResult;

pub const SYSTEM_STATUS_ACTIVE: &str = "active";

pub struct DashboardService {
    pool: DbPool,
    config: DashboardConfig,
}

impl DashboardService {
    pub fn new(pool: DbPool, config: DashboardConfig) -> Self {
        Self { pool, config }
    }

    pub async fn summary(&self, principal: &AdminPrincipal) -> AppResult<DashboardSummary> {
        let scope = principal.scope()?;
        let mut conn = self.pool.acquire().await?;

        let total_users = UserRepository::new(&mut conn).count(scope).await?;
        let recent_activity = AuditRepository::new(&mut conn)
            .recent_for_admin(principal.user_id(), self.config.recent_activity_limit)
            .await?
            .into_iter()
            .map(RecentActivity::from)
            .collect();

        let admin_type = if principal.is_system_admin() {
            AdminType::System
        } else {
            AdminType::School
        };

        Ok(DashboardSummary {
            admin_type,
            total_users,
            recent_activity,
            system_status: SYSTEM_STATUS_ACTIVE.to_string(),
        })
    }

    /// Users the caller may manage, ordered by id
    pub async fn user_management(&self, principal: &AdminPrincipal) -> AppResult<Vec<UserSummary>> {
        let scope = principal.scope()?;
        let mut conn = self.pool.acquire().await?;

        let users = UserRepository::new(&mut conn)
            .list(scope, self.config.user_management_limit)
            .await?;

        Ok(users.into_iter().map(UserSummary::from).collect())
    }
}
