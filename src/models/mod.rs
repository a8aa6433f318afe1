//! Data models

mod admin;
mod audit;
mod dashboard;
mod school;

pub use admin::*;
pub use audit::*;
pub use dashboard::*;
pub use school::*;
