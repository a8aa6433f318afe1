//! Database layer
//!
//! This module handles database operations for:
//! - System and school admin accounts
//! - The append-only admin audit ledger
//! - Scoped reads and bulk updates over the shared school/user tables
//!
//! Repositories borrow a `SqliteConnection`, so the same code runs on a pooled
//! connection or inside a transaction (`&mut *tx`).

pub mod admin_repository;
pub mod audit_repository;
pub mod bulk_repository;
pub mod school_repository;
pub mod scope;
pub mod user_repository;

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use crate::config::DatabaseConfig;

pub use admin_repository::{SchoolAdminChanges, SchoolAdminRepository, SystemAdminRepository};
pub use audit_repository::AuditRepository;
pub use bulk_repository::BulkRepository;
pub use school_repository::SchoolRepository;
pub use scope::{Scope, ScopeFilter, ScopePath, ScopedResource};
pub use user_repository::UserRepository;

/// Database connection pool type
pub type DbPool = Pool<Sqlite>;

/// Initialize the database connection pool and run migrations
pub async fn init_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let options = SqliteConnectOptions::from_str(&config.url)
        .with_context(|| format!("Invalid database URL: {}", config.url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(pool)
}

/// Check that the database answers a trivial query
pub async fn check_health(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .context("Database health check failed")?;
    Ok(())
}

/// Current time in the stored timestamp format.
///
/// Fixed microsecond precision keeps lexical order equal to time order.
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_db_timestamp(ts: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S") {
        return DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc);
    }
    Utc::now()
}
