//! System admin and school admin repositories

use anyhow::{Context, Result};
use sqlx::SqliteConnection;

use super::{now_timestamp, parse_db_timestamp, Scope, ScopeFilter, ScopedResource};
use crate::models::{AdminListQuery, SchoolAdmin, SchoolAdminPermissions, SystemAdmin};

#[derive(Debug, sqlx::FromRow)]
struct SystemAdminRow {
    id: i64,
    user_id: i64,
    user_email: String,
    user_name: String,
    created_at: String,
    is_active: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct SchoolAdminRow {
    id: i64,
    user_id: i64,
    user_email: String,
    user_name: String,
    school_id: i64,
    school_name: String,
    permissions: String,
    created_at: String,
    is_active: bool,
}

const SYSTEM_ADMIN_SELECT: &str = r#"
    SELECT sa.id, sa.user_id, u.email AS user_email,
           u.first_name || ' ' || u.last_name AS user_name,
           sa.created_at, sa.is_active
    FROM system_admins sa
    JOIN users u ON u.id = sa.user_id
    WHERE 1 = 1"#;

const SCHOOL_ADMIN_SELECT: &str = r#"
    SELECT sch.id, sch.user_id, u.email AS user_email,
           u.first_name || ' ' || u.last_name AS user_name,
           sch.school_id, s.name AS school_name,
           sch.permissions, sch.created_at, sch.is_active
    FROM school_admins sch
    JOIN users u ON u.id = sch.user_id
    JOIN schools s ON s.id = sch.school_id
    WHERE 1 = 1"#;

/// Repository for platform-wide administrators
pub struct SystemAdminRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> SystemAdminRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&mut self, query: &AdminListQuery) -> Result<Vec<SystemAdmin>> {
        let mut sql = String::from(SYSTEM_ADMIN_SELECT);
        if query.is_active.is_some() {
            sql.push_str(" AND sa.is_active = ?");
        }
        sql.push_str(" ORDER BY sa.id");

        let mut q = sqlx::query_as::<_, SystemAdminRow>(&sql);
        if let Some(is_active) = query.is_active {
            q = q.bind(is_active);
        }

        let rows = q
            .fetch_all(&mut *self.conn)
            .await
            .context("Failed to list system admins")?;

        Ok(rows.into_iter().map(row_to_system_admin).collect())
    }

    pub async fn get_by_id(&mut self, id: i64) -> Result<Option<SystemAdmin>> {
        let sql = format!("{SYSTEM_ADMIN_SELECT} AND sa.id = ?");
        let row = sqlx::query_as::<_, SystemAdminRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await
            .context("Failed to get system admin")?;

        Ok(row.map(row_to_system_admin))
    }

    pub async fn get_by_user_id(&mut self, user_id: i64) -> Result<Option<SystemAdmin>> {
        let sql = format!("{SYSTEM_ADMIN_SELECT} AND sa.user_id = ?");
        let row = sqlx::query_as::<_, SystemAdminRow>(&sql)
            .bind(user_id)
            .fetch_optional(&mut *self.conn)
            .await
            .context("Failed to get system admin by user")?;

        Ok(row.map(row_to_system_admin))
    }

    pub async fn create(&mut self, user_id: i64, is_active: bool) -> Result<SystemAdmin> {
        let id = sqlx::query(
            r#"
            INSERT INTO system_admins (user_id, is_active, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(is_active)
        .bind(now_timestamp())
        .execute(&mut *self.conn)
        .await
        .context("Failed to create system admin")?
        .last_insert_rowid();

        self.get_by_id(id)
            .await?
            .context("Failed to retrieve created system admin")
    }

    pub async fn update(&mut self, id: i64, is_active: Option<bool>) -> Result<Option<SystemAdmin>> {
        if let Some(is_active) = is_active {
            sqlx::query("UPDATE system_admins SET is_active = ? WHERE id = ?")
                .bind(is_active)
                .bind(id)
                .execute(&mut *self.conn)
                .await
                .context("Failed to update system admin")?;
        }

        self.get_by_id(id).await
    }

    pub async fn delete(&mut self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM system_admins WHERE id = ?")
            .bind(id)
            .execute(&mut *self.conn)
            .await
            .context("Failed to delete system admin")?;

        Ok(result.rows_affected() > 0)
    }
}

/// Changes applied to an existing school admin
#[derive(Debug, Clone, Default)]
pub struct SchoolAdminChanges {
    pub school_id: Option<i64>,
    pub permissions: Option<SchoolAdminPermissions>,
    pub is_active: Option<bool>,
}

/// Repository for school-confined administrators
pub struct SchoolAdminRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> SchoolAdminRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&mut self, query: &AdminListQuery, scope: Scope) -> Result<Vec<SchoolAdmin>> {
        let filter = ScopeFilter::new(ScopedResource::SchoolAdmins, scope, "sch");
        let mut sql = String::from(SCHOOL_ADMIN_SELECT);
        filter.push_and(&mut sql);
        if query.school.is_some() {
            sql.push_str(" AND sch.school_id = ?");
        }
        if query.is_active.is_some() {
            sql.push_str(" AND sch.is_active = ?");
        }
        sql.push_str(" ORDER BY sch.id");

        let mut q = sqlx::query_as::<_, SchoolAdminRow>(&sql);
        if let Some(school_id) = filter.school_id() {
            q = q.bind(school_id);
        }
        if let Some(school) = query.school {
            q = q.bind(school);
        }
        if let Some(is_active) = query.is_active {
            q = q.bind(is_active);
        }

        let rows = q
            .fetch_all(&mut *self.conn)
            .await
            .context("Failed to list school admins")?;

        rows.into_iter().map(row_to_school_admin).collect()
    }

    pub async fn get_by_id(&mut self, id: i64) -> Result<Option<SchoolAdmin>> {
        let sql = format!("{SCHOOL_ADMIN_SELECT} AND sch.id = ?");
        let row = sqlx::query_as::<_, SchoolAdminRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await
            .context("Failed to get school admin")?;

        row.map(row_to_school_admin).transpose()
    }

    pub async fn get_by_user_id(&mut self, user_id: i64) -> Result<Option<SchoolAdmin>> {
        let sql = format!("{SCHOOL_ADMIN_SELECT} AND sch.user_id = ?");
        let row = sqlx::query_as::<_, SchoolAdminRow>(&sql)
            .bind(user_id)
            .fetch_optional(&mut *self.conn)
            .await
            .context("Failed to get school admin by user")?;

        row.map(row_to_school_admin).transpose()
    }

    pub async fn create(
        &mut self,
        user_id: i64,
        school_id: i64,
        permissions: &SchoolAdminPermissions,
        is_active: bool,
    ) -> Result<SchoolAdmin> {
        let permissions_json =
            serde_json::to_string(permissions).context("Failed to serialize permissions")?;

        let id = sqlx::query(
            r#"
            INSERT INTO school_admins (user_id, school_id, permissions, is_active, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(school_id)
        .bind(&permissions_json)
        .bind(is_active)
        .bind(now_timestamp())
        .execute(&mut *self.conn)
        .await
        .context("Failed to create school admin")?
        .last_insert_rowid();

        self.get_by_id(id)
            .await?
            .context("Failed to retrieve created school admin")
    }

    pub async fn update(
        &mut self,
        id: i64,
        changes: &SchoolAdminChanges,
    ) -> Result<Option<SchoolAdmin>> {
        let mut sets = Vec::new();
        if changes.school_id.is_some() {
            sets.push("school_id = ?");
        }
        if changes.permissions.is_some() {
            sets.push("permissions = ?");
        }
        if changes.is_active.is_some() {
            sets.push("is_active = ?");
        }

        if !sets.is_empty() {
            let sql = format!("UPDATE school_admins SET {} WHERE id = ?", sets.join(", "));
            let mut q = sqlx::query(&sql);
            if let Some(school_id) = changes.school_id {
                q = q.bind(school_id);
            }
            if let Some(ref permissions) = changes.permissions {
                let permissions_json = serde_json::to_string(permissions)
                    .context("Failed to serialize permissions")?;
                q = q.bind(permissions_json);
            }
            if let Some(is_active) = changes.is_active {
                q = q.bind(is_active);
            }

            q.bind(id)
                .execute(&mut *self.conn)
                .await
                .context("Failed to update school admin")?;
        }

        self.get_by_id(id).await
    }

    pub async fn delete(&mut self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM school_admins WHERE id = ?")
            .bind(id)
            .execute(&mut *self.conn)
            .await
            .context("Failed to delete school admin")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_system_admin(row: SystemAdminRow) -> SystemAdmin {
    SystemAdmin {
        id: row.id,
        user_id: row.user_id,
        user_email: row.user_email,
        user_name: row.user_name,
        created_at: parse_db_timestamp(&row.created_at),
        is_active: row.is_active,
    }
}

fn row_to_school_admin(row: SchoolAdminRow) -> Result<SchoolAdmin> {
    let permissions: SchoolAdminPermissions = serde_json::from_str(&row.permissions)
        .with_context(|| format!("School admin {} has malformed permissions", row.id))?;

    Ok(SchoolAdmin {
        id: row.id,
        user_id: row.user_id,
        user_email: row.user_email,
        user_name: row.user_name,
        school_id: row.school_id,
        school_name: row.school_name,
        permissions,
        created_at: parse_db_timestamp(&row.created_at),
        is_active: row.is_active,
    })
}
