use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::{
    domain::{CreateResumeTemplateRequest, ResumeTemplate},
    error::{AppError, Result},
    repository::ResumeTemplateRepository,
};

#[derive(FromRow)]
struct ResumeTemplateRow {
    id: i64,
    name: String,
    preview_image: String,
    description: String,
    created_at: NaiveDateTime,
}

impl From<ResumeTemplateRow> for ResumeTemplate {
    fn from(row: ResumeTemplateRow) -> Self {
        ResumeTemplate {
            id: row.id,
            name: row.name,
            preview_image: row.preview_image,
            description: row.description,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        }
    }
}

pub struct SqliteResumeTemplateRepository {
    pool: SqlitePool,
}

impl SqliteResumeTemplateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeTemplateRepository for SqliteResumeTemplateRepository {
    async fn create(&self, template: CreateResumeTemplateRequest) -> Result<ResumeTemplate> {
        let result = sqlx::query(
            r#"
            INSERT INTO resume_templates (name, preview_image, description, created_at)
            VALUES (?, ?, ?, ?)
            "#
        )
        .bind(&template.name)
        .bind(&template.preview_image)
        .bind(&template.description)
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;

        self.find_by_id(result.last_insert_rowid()).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created template".to_string())
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ResumeTemplate>> {
        let row = sqlx::query_as::<_, ResumeTemplateRow>(
            "SELECT id, name, preview_image, description, created_at FROM resume_templates WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ResumeTemplate::from))
    }

    async fn list(&self, limit: Option<i64>) -> Result<Vec<ResumeTemplate>> {
        // LIMIT -1 means no limit in SQLite
        let rows = sqlx::query_as::<_, ResumeTemplateRow>(
            r#"
            SELECT id, name, preview_image, description, created_at
            FROM resume_templates
            ORDER BY id
            LIMIT ?
            "#
        )
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ResumeTemplate::from).collect())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let detached = sqlx::query("UPDATE resumes SET template_id = NULL WHERE template_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM resume_templates WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(
            "Deleted resume template {}; detached {} resumes",
            id,
            detached.rows_affected()
        );

        Ok(())
    }
}
