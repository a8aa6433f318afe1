//! Scoped bulk activation state updates

use anyhow::{Context, Result};
use sqlx::SqliteConnection;

use super::{Scope, ScopeFilter, ScopedResource};

pub struct BulkRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> BulkRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Set `is_active` on every row of `resource` whose id is in `ids` and
    /// which lies inside `scope`. School-scoped callers never reach rows
    /// excluded by the resource's write guard. Returns the number of rows matched.
    pub async fn set_active(
        &mut self,
        resource: ScopedResource,
        scope: Scope,
        ids: &[i64],
        active: bool,
    ) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let table = resource.table();
        let filter = ScopeFilter::new(resource, scope, "t");
        let placeholders = vec!["?"; ids.len()].join(", ");
        let mut sql = format!(
            "UPDATE {table} AS t SET is_active = ? WHERE t.id IN ({placeholders})"
        );
        filter.push_and(&mut sql);
        if matches!(scope, Scope::School(_)) {
            if let Some(guard) = resource.school_write_guard("t") {
                sql.push_str(" AND ");
                sql.push_str(&guard);
            }
        }

        let mut q = sqlx::query(&sql).bind(active);
        for id in ids {
            q = q.bind(*id);
        }
        if let Some(school_id) = filter.school_id() {
            q = q.bind(school_id);
        }

        let result = q
            .execute(&mut *self.conn)
            .await
            .with_context(|| format!("Failed to bulk update {table}"))?;

        Ok(result.rows_affected())
    }
}
