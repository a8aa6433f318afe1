//! User identity repository (shared schema)

use anyhow::{Context, Result};
use sqlx::SqliteConnection;

use super::{now_timestamp, parse_db_timestamp, Scope, ScopeFilter, ScopedResource};
use crate::models::{NewUser, User, UserRole};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    user_id: String,
    first_name: String,
    last_name: String,
    role: String,
    school_id: i64,
    is_active: bool,
    date_joined: String,
}

const USER_COLUMNS: &str =
    "u.id, u.email, u.user_id, u.first_name, u.last_name, u.role, u.school_id, u.is_active, u.date_joined";

pub struct UserRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> UserRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_id(&mut self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await
            .context("Failed to get user")?;

        row.map(row_to_user).transpose()
    }

    pub async fn create(&mut self, user: &NewUser) -> Result<User> {
        let id = sqlx::query(
            r#"
            INSERT INTO users (email, user_id, first_name, last_name, role, school_id, is_active, date_joined)
            VALUES (?, ?, ?, ?, ?, ?, 1, ?)
            "#,
        )
        .bind(&user.email)
        .bind(&user.user_id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role.as_str())
        .bind(user.school_id)
        .bind(now_timestamp())
        .execute(&mut *self.conn)
        .await
        .context("Failed to create user")?
        .last_insert_rowid();

        self.get_by_id(id)
            .await?
            .context("Failed to retrieve created user")
    }

    /// Count users visible within `scope`
    pub async fn count(&mut self, scope: Scope) -> Result<i64> {
        let filter = ScopeFilter::new(ScopedResource::Users, scope, "u");
        let mut sql = String::from("SELECT COUNT(*) FROM users u WHERE 1 = 1");
        filter.push_and(&mut sql);

        let mut q = sqlx::query_scalar::<_, i64>(&sql);
        if let Some(school_id) = filter.school_id() {
            q = q.bind(school_id);
        }

        q.fetch_one(&mut *self.conn)
            .await
            .context("Failed to count users")
    }

    /// List users visible within `scope`, ordered by id
    pub async fn list(&mut self, scope: Scope, limit: u32) -> Result<Vec<User>> {
        let filter = ScopeFilter::new(ScopedResource::Users, scope, "u");
        let mut sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE 1 = 1");
        filter.push_and(&mut sql);
        sql.push_str(" ORDER BY u.id LIMIT ?");

        let mut q = sqlx::query_as::<_, UserRow>(&sql);
        if let Some(school_id) = filter.school_id() {
            q = q.bind(school_id);
        }
        let rows = q
            .bind(i64::from(limit))
            .fetch_all(&mut *self.conn)
            .await
            .context("Failed to list users")?;

        rows.into_iter().map(row_to_user).collect()
    }
}

fn row_to_user(row: UserRow) -> Result<User> {
    let role = row
        .role
        .parse::<UserRole>()
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("User {} has an unknown role", row.id))?;

    Ok(User {
        id: row.id,
        email: row.email,
        user_id: row.user_id,
        first_name: row.first_name,
        last_name: row.last_name,
        role,
        school_id: row.school_id,
        is_active: row.is_active,
        date_joined: parse_db_timestamp(&row.date_joined),
    })
}
