//! School repository (shared schema)

use anyhow::{Context, Result};
use sqlx::SqliteConnection;

use super::{now_timestamp, parse_db_timestamp};
use crate::models::{NewSchool, School};

#[derive(Debug, sqlx::FromRow)]
struct SchoolRow {
    id: i64,
    name: String,
    code: String,
    address: String,
    phone: String,
    email: String,
    created_at: String,
    updated_at: String,
}

pub struct SchoolRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> SchoolRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_id(&mut self, id: i64) -> Result<Option<School>> {
        let row = sqlx::query_as::<_, SchoolRow>(
            r#"
            SELECT id, name, code, address, phone, email, created_at, updated_at
            FROM schools
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await
        .context("Failed to get school")?;

        Ok(row.map(row_to_school))
    }

    pub async fn get_by_code(&mut self, code: &str) -> Result<Option<School>> {
        let row = sqlx::query_as::<_, SchoolRow>(
            r#"
            SELECT id, name, code, address, phone, email, created_at, updated_at
            FROM schools
            WHERE code = ?
            "#,
        )
        .bind(code)
        .fetch_optional(&mut *self.conn)
        .await
        .context("Failed to get school by code")?;

        Ok(row.map(row_to_school))
    }

    pub async fn create(&mut self, school: &NewSchool) -> Result<School> {
        let now = now_timestamp();

        let id = sqlx::query(
            r#"
            INSERT INTO schools (name, code, address, phone, email, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&school.name)
        .bind(&school.code)
        .bind(&school.address)
        .bind(&school.phone)
        .bind(&school.email)
        .bind(&now)
        .bind(&now)
        .execute(&mut *self.conn)
        .await
        .context("Failed to create school")?
        .last_insert_rowid();

        self.get_by_id(id)
            .await?
            .context("Failed to retrieve created school")
    }
}

fn row_to_school(row: SchoolRow) -> School {
    School {
        id: row.id,
        name: row.name,
        code: row.code,
        address: row.address,
        phone: row.phone,
        email: row.email,
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}
