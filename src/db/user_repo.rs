use chrono::{DateTime, Utc};
use sqlx::AnyPool;

use super::{parse_enum, parse_timestamp};
use crate::models::{Role, User};

pub struct UserRepository {
    pool: AnyPool,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    username: String,
    password_hash: String,
    full_name: String,
    email: String,
    department: String,
    title: String,
    role: String,
    created_at: String,
    deactivated_at: Option<String>,
}

impl TryFrom<UserRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            department: parse_enum(&row.department)?,
            role: parse_enum(&row.role)?,
            created_at: parse_timestamp(&row.created_at)?,
            deactivated_at: row
                .deactivated_at
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            full_name: row.full_name,
            email: row.email,
            title: row.title,
        })
    }
}

const COLUMNS: &str = "id, username, password_hash, full_name, email, department, title, role, created_at, deactivated_at";

impl UserRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// Inserts a user. A taken username surfaces as a unique-violation
    /// database error.
    pub async fn create(&self, user: &User) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, full_name, email, department, title, role, created_at, deactivated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(user.department.to_string())
        .bind(&user.title)
        .bind(user.role.to_string())
        .bind(user.created_at.to_rfc3339())
        .bind(user.deactivated_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    /// Exact, case-sensitive username lookup.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE username = $1", COLUMNS))
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool, sqlx::Error> {
        let row: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    /// Users that have not been deactivated, ordered by full name.
    pub async fn list_active(&self) -> Result<Vec<User>, sqlx::Error> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE deactivated_at IS NULL ORDER BY full_name",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    /// Every user, deactivated ones included.
    pub async fn list_all(&self) -> Result<Vec<User>, sqlx::Error> {
        let rows: Vec<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users ORDER BY full_name", COLUMNS))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    /// Writes back the editable profile fields and the role.
    pub async fn update(&self, user: &User) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET full_name = $1, email = $2, department = $3, title = $4, role = $5
            WHERE id = $6
            "#,
        )
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(user.department.to_string())
        .bind(&user.title)
        .bind(user.role.to_string())
        .bind(&user.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn update_role(&self, id: &str, role: Role) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
            .bind(role.to_string())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Soft-deletes a user. Returns `false` if no active user had that id.
    pub async fn deactivate(&self, id: &str, at: DateTime<Utc>) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET deactivated_at = $1 WHERE id = $2 AND deactivated_at IS NULL",
        )
        .bind(at.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
