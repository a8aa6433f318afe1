//! School and user identity models
//!
//! These rows are owned by the platform's users module; the admin service
//! reads them for scoping and toggles `users.is_active` in bulk.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct School {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSchool {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

/// Platform role of a user identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Student,
    Teacher,
    Parent,
    Admin,
    SchoolAdmin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "STUDENT",
            UserRole::Teacher => "TEACHER",
            UserRole::Parent => "PARENT",
            UserRole::Admin => "ADMIN",
            UserRole::SchoolAdmin => "SCHOOL_ADMIN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STUDENT" => Ok(UserRole::Student),
            "TEACHER" => Ok(UserRole::Teacher),
            "PARENT" => Ok(UserRole::Parent),
            "ADMIN" => Ok(UserRole::Admin),
            "SCHOOL_ADMIN" => Ok(UserRole::SchoolAdmin),
            _ => Err(format!("Invalid user role: {}", s)),
        }
    }
}

/// User identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub school_id: i64,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub school_id: i64,
}

/// Row of the dashboard user management view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub is_active: bool,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.full_name(),
            email: user.email,
            role: user.role,
            is_active: user.is_active,
        }
    }
}
