//! Bulk activation and deactivation

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::{BulkRepository, DbPool, Scope, ScopedResource};
use crate::models::{AdminActionType, NewAuditLogEntry};
use crate::services::audit::{Actor, AuditService};
use crate::utils::validation::validate_positive_ids;
use crate::utils::AppResult;

pub const MAX_BULK_IDS: u64 = 1000;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkIdsRequest {
    #[validate(
        length(min = 1, max = 1000, message = "ids must contain between 1 and 1000 entries"),
        custom(function = "validate_positive_ids")
    )]
    pub ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkResult {
    pub message: String,
    pub requested: u64,
    pub updated: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Activate,
    Deactivate,
}

impl BulkAction {
    pub fn target_state(&self) -> bool {
        matches!(self, BulkAction::Activate)
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            BulkAction::Activate => "activated",
            BulkAction::Deactivate => "deactivated",
        }
    }
}

pub struct BulkService {
    pool: DbPool,
}

impl BulkService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Toggle `is_active` on the in-scope rows named by `ids` and record one
    /// ledger entry, atomically. Ids that are missing or out of scope are ignored.
    pub async fn apply(
        &self,
        actor: &Actor,
        resource: ScopedResource,
        scope: Scope,
        action: BulkAction,
        ids: &[i64],
    ) -> AppResult<BulkResult> {
        let unique: Vec<i64> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let requested = unique.len() as u64;

        let mut tx = self.pool.begin().await?;

        let updated = BulkRepository::new(&mut tx)
            .set_active(resource, scope, &unique, action.target_state())
            .await?;

        let entry = NewAuditLogEntry::new(
            actor.user_id,
            AdminActionType::UserManagement,
            ledger_description(action, resource, updated, requested),
        )
        .with_resource("", resource.table())
        .with_ip(actor.ip_address.clone());
        AuditService::record(&mut tx, entry).await?;

        tx.commit().await?;

        tracing::info!(
            admin_id = actor.user_id,
            resource = resource.table(),
            action = action.past_tense(),
            requested,
            updated,
            "Bulk update applied"
        );

        Ok(BulkResult {
            message: format!("Successfully {} {} items", action.past_tense(), updated),
            requested,
            updated,
        })
    }
}

fn ledger_description(
    action: BulkAction,
    resource: ScopedResource,
    updated: u64,
    requested: u64,
) -> String {
    format!(
        "Bulk {} {} {} ({} requested)",
        action.past_tense(),
        updated,
        resource.verbose_name_plural(),
        requested
    )
}
