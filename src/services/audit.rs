//! Audit recorder
//!
//! Appends entries to the admin ledger. Callers pass the connection of the
//! transaction that carries the change so both commit or roll back together.

use anyhow::Result;
use sqlx::SqliteConnection;

use crate::db::AuditRepository;
use crate::models::{AdminActionType, AdminAuditLog, NewAuditLogEntry, SchoolAdmin, SystemAdmin};

/// Acting identity and origin of an administrative change
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: i64,
    pub ip_address: Option<String>,
}

impl Actor {
    pub fn new(user_id: i64, ip_address: Option<String>) -> Self {
        Self {
            user_id,
            ip_address,
        }
    }
}

/// Kind of change recorded by [`AuditService::record_change`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Created => "Created",
            ChangeKind::Updated => "Updated",
            ChangeKind::Deleted => "Deleted",
        }
    }
}

/// A resource whose changes are written to the ledger
pub trait Audited {
    /// Label stored in `resource_type`
    const RESOURCE_TYPE: &'static str;
    /// Human-readable singular name used in descriptions
    const VERBOSE_NAME: &'static str;

    fn audit_id(&self) -> i64;
    fn display_name(&self) -> String;
}

impl Audited for SystemAdmin {
    const RESOURCE_TYPE: &'static str = "system_admin";
    const VERBOSE_NAME: &'static str = "system admin";

    fn audit_id(&self) -> i64 {
        self.id
    }

    fn display_name(&self) -> String {
        self.user_name.clone()
    }
}

impl Audited for SchoolAdmin {
    const RESOURCE_TYPE: &'static str = "school_admin";
    const VERBOSE_NAME: &'static str = "school admin";

    fn audit_id(&self) -> i64 {
        self.id
    }

    fn display_name(&self) -> String {
        format!("{} ({})", self.user_name, self.school_name)
    }
}

pub struct AuditService;

impl AuditService {
    /// Append one ledger entry. An unrecognized action type is rejected and
    /// nothing is written.
    pub async fn record(conn: &mut SqliteConnection, entry: NewAuditLogEntry) -> Result<AdminAuditLog> {
        let logged = AuditRepository::new(conn).insert(&entry).await?;

        tracing::info!(
            audit_id = logged.id,
            admin_id = logged.admin_id,
            action_type = %logged.action_type,
            resource_type = %logged.resource_type,
            resource_id = %logged.resource_id,
            "Admin action recorded"
        );

        Ok(logged)
    }

    /// Record a create, update or delete of an audited resource
    pub async fn record_change<T: Audited>(
        conn: &mut SqliteConnection,
        actor: &Actor,
        kind: ChangeKind,
        item: &T,
    ) -> Result<AdminAuditLog> {
        let entry = change_entry(actor, kind, item);
        Self::record(conn, entry).await
    }
}

fn change_entry<T: Audited>(actor: &Actor, kind: ChangeKind, item: &T) -> NewAuditLogEntry {
    NewAuditLogEntry::new(
        actor.user_id,
        AdminActionType::SystemConfig,
        format!(
            "{} {}: {}",
            kind.as_str(),
            T::VERBOSE_NAME,
            item.display_name()
        ),
    )
    .with_resource(item.audit_id().to_string(), T::RESOURCE_TYPE)
    .with_ip(actor.ip_address.clone())
}
