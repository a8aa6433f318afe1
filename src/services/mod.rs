//! Business logic services

pub mod admin;
pub mod audit;
pub mod bulk;
pub mod dashboard;
pub mod permissions;

pub use admin::AdminService;
pub use audit::{Actor, AuditService, Audited, ChangeKind};
pub use bulk::{BulkAction, BulkIdsRequest, BulkResult, BulkService};
pub use dashboard::DashboardService;
pub use permissions::{AdminRoles, PermissionCheck, Policy};
