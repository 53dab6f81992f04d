use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::{
    domain::{CreateResumeRequest, NewSection, Resume, ResumeSection},
    error::{AppError, Result},
    repository::ResumeRepository,
};

#[derive(FromRow)]
struct ResumeRow {
    id: i64,
    user_id: i64,
    template_id: Option<i64>,
    title: String,
    photo: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct SectionRow {
    id: i64,
    resume_id: i64,
    title: String,
    content: String,
    sort_order: i64,
}

impl From<ResumeRow> for Resume {
    fn from(row: ResumeRow) -> Self {
        Resume {
            id: row.id,
            user_id: row.user_id,
            template_id: row.template_id,
            title: row.title,
            photo: row.photo,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        }
    }
}

impl From<SectionRow> for ResumeSection {
    fn from(row: SectionRow) -> Self {
        ResumeSection {
            id: row.id,
            resume_id: row.resume_id,
            title: row.title,
            content: row.content,
            order: row.sort_order,
        }
    }
}

pub struct SqliteResumeRepository {
    pool: SqlitePool,
}

impl SqliteResumeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeRepository for SqliteResumeRepository {
    async fn create_with_sections(
        &self,
        user_id: i64,
        resume: CreateResumeRequest,
        sections: &[NewSection],
    ) -> Result<Resume> {
        let now = Utc::now().naive_utc();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO resumes (user_id, template_id, title, photo, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(user_id)
        .bind(resume.template_id)
        .bind(&resume.title)
        .bind(&resume.photo)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let resume_id = result.last_insert_rowid();

        for section in sections {
            sqlx::query(
                "INSERT INTO resume_sections (resume_id, title, content, sort_order) VALUES (?, ?, ?, ?)"
            )
            .bind(resume_id)
            .bind(&section.title)
            .bind(&section.content)
            .bind(section.order)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(
            "Created resume {} for user {} with {} sections",
            resume_id,
            user_id,
            sections.len()
        );

        self.find_by_id(resume_id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created resume".to_string())
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Resume>> {
        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            SELECT id, user_id, template_id, title, photo, created_at, updated_at
            FROM resumes
            WHERE id = ?
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Resume::from))
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Resume>> {
        let rows = sqlx::query_as::<_, ResumeRow>(
            r#"
            SELECT id, user_id, template_id, title, photo, created_at, updated_at
            FROM resumes
            WHERE user_id = ?
            ORDER BY id
            "#
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Resume::from).collect())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let sections = sqlx::query("DELETE FROM resume_sections WHERE resume_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM resumes WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!("Deleted resume {} and {} sections", id, sections.rows_affected());

        Ok(())
    }

    async fn list_sections(&self, resume_id: i64) -> Result<Vec<ResumeSection>> {
        let rows = sqlx::query_as::<_, SectionRow>(
            r#"
            SELECT id, resume_id, title, content, sort_order
            FROM resume_sections
            WHERE resume_id = ?
            ORDER BY sort_order, id
            "#
        )
        .bind(resume_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ResumeSection::from).collect())
    }

    async fn find_section(&self, id: i64) -> Result<Option<ResumeSection>> {
        let row = sqlx::query_as::<_, SectionRow>(
            "SELECT id, resume_id, title, content, sort_order FROM resume_sections WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ResumeSection::from))
    }

    async fn add_section(&self, resume_id: i64, section: NewSection) -> Result<ResumeSection> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO resume_sections (resume_id, title, content, sort_order) VALUES (?, ?, ?, ?)"
        )
        .bind(resume_id)
        .bind(&section.title)
        .bind(&section.content)
        .bind(section.order)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE resumes SET updated_at = ? WHERE id = ?")
            .bind(Utc::now().naive_utc())
            .bind(resume_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(ResumeSection {
            id: result.last_insert_rowid(),
            resume_id,
            title: section.title,
            content: section.content,
            order: section.order,
        })
    }

    async fn update_section_contents(&self, resume_id: i64, contents: &[(i64, String)]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut changed = 0;

        for (section_id, content) in contents {
            let result = sqlx::query(
                "UPDATE resume_sections SET content = ? WHERE id = ? AND resume_id = ?"
            )
            .bind(content)
            .bind(section_id)
            .bind(resume_id)
            .execute(&mut *tx)
            .await?;

            changed += result.rows_affected();
        }

        sqlx::query("UPDATE resumes SET updated_at = ? WHERE id = ?")
            .bind(Utc::now().naive_utc())
            .bind(resume_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(changed)
    }

    async fn delete_section(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM resume_sections WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
