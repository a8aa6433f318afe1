//! Admin account provisioning
//!
//! Every mutation runs in one transaction together with its ledger entry.

use crate::db::{
    DbPool, SchoolAdminChanges, SchoolAdminRepository, SchoolRepository, SystemAdminRepository,
    UserRepository,
};
use crate::models::{
    CreateSchoolAdminRequest, CreateSystemAdminRequest, SchoolAdmin, SchoolAdminPermissions,
    SystemAdmin, UpdateSchoolAdminRequest, UpdateSystemAdminRequest,
};
use crate::services::audit::{Actor, AuditService, ChangeKind};
use crate::utils::{AppError, AppResult};

pub struct AdminService {
    pool: DbPool,
}

impl AdminService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create_system_admin(
        &self,
        actor: &Actor,
        req: &CreateSystemAdminRequest,
    ) -> AppResult<SystemAdmin> {
        let mut tx = self.pool.begin().await?;

        ensure_user_exists(&mut tx, req.user).await?;
        let admin = SystemAdminRepository::new(&mut tx)
            .create(req.user, req.is_active.unwrap_or(true))
            .await?;
        AuditService::record_change(&mut tx, actor, ChangeKind::Created, &admin).await?;

        tx.commit().await?;

        tracing::info!(system_admin_id = admin.id, user_id = admin.user_id, "System admin created");
        Ok(admin)
    }

    pub async fn update_system_admin(
        &self,
        actor: &Actor,
        id: i64,
        req: &UpdateSystemAdminRequest,
    ) -> AppResult<SystemAdmin> {
        let mut tx = self.pool.begin().await?;

        let admin = SystemAdminRepository::new(&mut tx)
            .update(id, req.is_active)
            .await?
            .ok_or_else(|| AppError::not_found(format!("System admin {} not found", id)))?;
        AuditService::record_change(&mut tx, actor, ChangeKind::Updated, &admin).await?;

        tx.commit().await?;

        tracing::info!(system_admin_id = admin.id, "System admin updated");
        Ok(admin)
    }

    pub async fn delete_system_admin(&self, actor: &Actor, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let mut repo = SystemAdminRepository::new(&mut tx);
        let admin = repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("System admin {} not found", id)))?;
        repo.delete(id).await?;
        AuditService::record_change(&mut tx, actor, ChangeKind::Deleted, &admin).await?;

        tx.commit().await?;

        tracing::info!(system_admin_id = id, "System admin deleted");
        Ok(())
    }

    /// Provision a school admin; grants default to all recognized permissions
    pub async fn create_school_admin(
        &self,
        actor: &Actor,
        req: &CreateSchoolAdminRequest,
    ) -> AppResult<SchoolAdmin> {
        let permissions = req
            .permissions
            .clone()
            .map(SchoolAdminPermissions::from)
            .unwrap_or_else(SchoolAdminPermissions::provisioning_defaults);

        let mut tx = self.pool.begin().await?;

        ensure_user_exists(&mut tx, req.user).await?;
        ensure_school_exists(&mut tx, req.school).await?;
        let admin = SchoolAdminRepository::new(&mut tx)
            .create(req.user, req.school, &permissions, req.is_active.unwrap_or(true))
            .await?;
        AuditService::record_change(&mut tx, actor, ChangeKind::Created, &admin).await?;

        tx.commit().await?;

        tracing::info!(
            school_admin_id = admin.id,
            user_id = admin.user_id,
            school_id = admin.school_id,
            "School admin created"
        );
        Ok(admin)
    }

    pub async fn update_school_admin(
        &self,
        actor: &Actor,
        id: i64,
        req: &UpdateSchoolAdminRequest,
    ) -> AppResult<SchoolAdmin> {
        let mut tx = self.pool.begin().await?;

        if let Some(school_id) = req.school {
            ensure_school_exists(&mut tx, school_id).await?;
        }
        let changes = SchoolAdminChanges {
            school_id: req.school,
            permissions: req.permissions.clone().map(SchoolAdminPermissions::from),
            is_active: req.is_active,
        };
        let admin = SchoolAdminRepository::new(&mut tx)
            .update(id, &changes)
            .await?
            .ok_or_else(|| AppError::not_found(format!("School admin {} not found", id)))?;
        AuditService::record_change(&mut tx, actor, ChangeKind::Updated, &admin).await?;

        tx.commit().await?;

        tracing::info!(school_admin_id = admin.id, "School admin updated");
        Ok(admin)
    }

    pub async fn delete_school_admin(&self, actor: &Actor, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let mut repo = SchoolAdminRepository::new(&mut tx);
        let admin = repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("School admin {} not found", id)))?;
        repo.delete(id).await?;
        AuditService::record_change(&mut tx, actor, ChangeKind::Deleted, &admin).await?;

        tx.commit().await?;

        tracing::info!(school_admin_id = id, "School admin deleted");
        Ok(())
    }

    /// Bootstrap a system admin from the command line.
    ///
    /// The provisioned user is recorded as the actor since no admin exists yet.
    pub async fn provision_system_admin(&self, user_id: i64) -> AppResult<SystemAdmin> {
        let actor = Actor::new(user_id, None);
        let req = CreateSystemAdminRequest {
            user: user_id,
            is_active: Some(true),
        };
        self.create_system_admin(&actor, &req).await
    }
}

async fn ensure_user_exists(conn: &mut sqlx::SqliteConnection, user_id: i64) -> AppResult<()> {
    UserRepository::new(conn)
        .get_by_id(user_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::validation(format!("User {} does not exist", user_id)))
}

async fn ensure_school_exists(conn: &mut sqlx::SqliteConnection, school_id: i64) -> AppResult<()> {
    SchoolRepository::new(conn)
        .get_by_id(school_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::validation(format!("School {} does not exist", school_id)))
}
