//! Admin audit ledger repository
//!
//! The ledger is append-only: this repository exposes no update or delete,
//! and the schema rejects both with triggers.

use anyhow::{Context, Result};
use sqlx::SqliteConnection;
use validator::Validate;

use super::{now_timestamp, parse_db_timestamp, Scope, ScopeFilter, ScopedResource};
use crate::models::{AdminActionType, AdminAuditLog, AuditLogQuery, NewAuditLogEntry};

pub const DEFAULT_LIST_LIMIT: u32 = 100;
pub const MAX_LIST_LIMIT: u32 = 500;

#[derive(Debug, sqlx::FromRow)]
struct AuditLogRow {
    id: i64,
    admin_id: i64,
    admin_name: String,
    admin_email: String,
    action_type: String,
    description: String,
    resource_id: String,
    resource_type: String,
    timestamp: String,
    ip_address: Option<String>,
}

const AUDIT_SELECT: &str = r#"
    SELECT l.id, l.admin_id,
           u.first_name || ' ' || u.last_name AS admin_name,
           u.email AS admin_email,
           l.action_type, l.description, l.resource_id, l.resource_type,
           l.timestamp, l.ip_address
    FROM admin_audit_logs l
    JOIN users u ON u.id = l.admin_id
    WHERE 1 = 1"#;

pub struct AuditRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> AuditRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Append an entry. Invalid entries are rejected before any row is written.
    pub async fn insert(&mut self, entry: &NewAuditLogEntry) -> Result<AdminAuditLog> {
        entry.validate().context("Invalid audit log entry")?;

        let id = sqlx::query(
            r#"
            INSERT INTO admin_audit_logs
                (admin_id, action_type, description, resource_id, resource_type, timestamp, ip_address)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.admin_id)
        .bind(&entry.action_type)
        .bind(&entry.description)
        .bind(&entry.resource_id)
        .bind(&entry.resource_type)
        .bind(now_timestamp())
        .bind(&entry.ip_address)
        .execute(&mut *self.conn)
        .await
        .context("Failed to insert audit log entry")?
        .last_insert_rowid();

        self.get_by_id(id, Scope::Global)
            .await?
            .context("Failed to retrieve inserted audit log entry")
    }

    /// Fetch one entry, `None` when it does not exist or lies outside `scope`
    pub async fn get_by_id(&mut self, id: i64, scope: Scope) -> Result<Option<AdminAuditLog>> {
        let filter = ScopeFilter::new(ScopedResource::AuditLogs, scope, "l");
        let mut sql = String::from(AUDIT_SELECT);
        filter.push_and(&mut sql);
        sql.push_str(" AND l.id = ?");

        let mut q = sqlx::query_as::<_, AuditLogRow>(&sql);
        if let Some(school_id) = filter.school_id() {
            q = q.bind(school_id);
        }
        let row = q
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await
            .context("Failed to get audit log entry")?;

        row.map(row_to_audit_log).transpose()
    }

    /// List entries newest first
    pub async fn list(&mut self, query: &AuditLogQuery, scope: Scope) -> Result<Vec<AdminAuditLog>> {
        let filter = ScopeFilter::new(ScopedResource::AuditLogs, scope, "l");
        let mut sql = String::from(AUDIT_SELECT);
        filter.push_and(&mut sql);

        if query.action_type.is_some() {
            sql.push_str(" AND l.action_type = ?");
        }
        if query.admin.is_some() {
            sql.push_str(" AND l.admin_id = ?");
        }
        if query.resource_type.is_some() {
            sql.push_str(" AND l.resource_type = ?");
        }
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", escape_like(s)));
        if search.is_some() {
            sql.push_str(
                " AND (l.description LIKE ? ESCAPE '\\' OR u.email LIKE ? ESCAPE '\\')",
            );
        }
        sql.push_str(" ORDER BY l.timestamp DESC, l.id DESC LIMIT ? OFFSET ?");

        let mut q = sqlx::query_as::<_, AuditLogRow>(&sql);
        if let Some(school_id) = filter.school_id() {
            q = q.bind(school_id);
        }
        if let Some(action_type) = query.action_type {
            q = q.bind(action_type.as_str());
        }
        if let Some(admin) = query.admin {
            q = q.bind(admin);
        }
        if let Some(ref resource_type) = query.resource_type {
            q = q.bind(resource_type.clone());
        }
        if let Some(ref pattern) = search {
            q = q.bind(pattern.clone()).bind(pattern.clone());
        }

        let limit = query
            .limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT);
        let offset = query.offset.unwrap_or(0);

        let rows = q
            .bind(i64::from(limit))
            .bind(i64::from(offset))
            .fetch_all(&mut *self.conn)
            .await
            .context("Failed to list audit log entries")?;

        rows.into_iter().map(row_to_audit_log).collect()
    }

    /// Most recent entries written by one acting user, newest first
    pub async fn recent_for_admin(&mut self, admin_id: i64, limit: u32) -> Result<Vec<AdminAuditLog>> {
        let sql = format!("{AUDIT_SELECT} AND l.admin_id = ? ORDER BY l.timestamp DESC, l.id DESC LIMIT ?");
        let rows = sqlx::query_as::<_, AuditLogRow>(&sql)
            .bind(admin_id)
            .bind(i64::from(limit))
            .fetch_all(&mut *self.conn)
            .await
            .context("Failed to get recent audit log entries")?;

        rows.into_iter().map(row_to_audit_log).collect()
    }
}

/// Escape `LIKE` wildcards so user input matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn row_to_audit_log(row: AuditLogRow) -> Result<AdminAuditLog> {
    let action_type = row
        .action_type
        .parse::<AdminActionType>()
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("Audit log entry {} has an unknown action type", row.id))?;

    Ok(AdminAuditLog {
        id: row.id,
        admin_id: row.admin_id,
        admin_name: row.admin_name,
        admin_email: row.admin_email,
        action_type,
        description: row.description,
        resource_id: row.resource_id,
        resource_type: row.resource_type,
        timestamp: parse_db_timestamp(&row.timestamp),
        ip_address: row.ip_address,
    })
}
