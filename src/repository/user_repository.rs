use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::{
    auth::AuthService,
    domain::{CreateUserRequest, UpdateUserRequest, User, UserRole},
    error::{AppError, Result},
    repository::UserRepository,
};

// Database row struct that matches SQLite schema
#[derive(FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: Option<String>,
    first_name: String,
    last_name: String,
    role: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: UserRow) -> Result<User> {
        Ok(User {
            id: row.id,
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            role: parse_role(&row.role)?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

pub(crate) fn parse_role(s: &str) -> Result<UserRole> {
    match s {
        "Member" => Ok(UserRole::Member),
        "Staff" => Ok(UserRole::Staff),
        _ => Err(AppError::Database(format!("Invalid user role: {}", s))),
    }
}

pub(crate) fn role_to_str(role: UserRole) -> &'static str {
    match role {
        UserRole::Member => "Member",
        UserRole::Staff => "Staff",
    }
}

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, role, created_at, updated_at";

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, request: CreateUserRequest) -> Result<User> {
        let password_hash = AuthService::hash_password(&request.password).await?;
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            INSERT INTO users (
                username, email, first_name, last_name, password_hash,
                role, created_at, updated_at
            ) VALUES (?, ?, '', '', ?, ?, ?, ?)
            "#
        )
        .bind(&request.username)
        .bind(&request.email)
        .bind(&password_hash)
        .bind(role_to_str(request.role))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created user".to_string())
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS)
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            &format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS)
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn password_hash(&self, username: &str) -> Result<Option<String>> {
        let hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM users WHERE username = ?"
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(hash)
    }

    async fn update(&self, id: i64, update: UpdateUserRequest) -> Result<User> {
        let existing = self.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let email = match update.email {
            Some(email) => email,
            None => existing.email,
        };
        let role = update.role.unwrap_or(existing.role);
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            UPDATE users
            SET email = ?,
                first_name = COALESCE(?, first_name),
                last_name = COALESCE(?, last_name),
                role = ?,
                updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(&email)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(role_to_str(role))
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated user".to_string())
        })
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM resume_sections WHERE resume_id IN (SELECT id FROM resumes WHERE user_id = ?)"
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM resumes WHERE user_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM announcements WHERE author_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!("Deleted user {} and owned records", id);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [UserRole::Member, UserRole::Staff] {
            assert_eq!(parse_role(role_to_str(role)).unwrap(), role);
        }
        assert!(parse_role("Admin").is_err());
    }
}
