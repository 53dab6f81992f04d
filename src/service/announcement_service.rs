use std::sync::Arc;

use validator::Validate;

use crate::{
    domain::{Announcement, AnnouncementInput, User},
    error::{AppError, Result},
    repository::AnnouncementRepository,
    service::access::ensure_staff,
};

/// Number of announcements shown on the home page.
pub const HOME_PREVIEW_LIMIT: i64 = 5;

pub struct AnnouncementService {
    repo: Arc<dyn AnnouncementRepository>,
}

impl AnnouncementService {
    pub fn new(repo: Arc<dyn AnnouncementRepository>) -> Self {
        Self { repo }
    }

    /// All announcements, newest first.
    pub async fn list(&self) -> Result<Vec<Announcement>> {
        self.repo.list().await
    }

    pub async fn list_recent(&self) -> Result<Vec<Announcement>> {
        self.repo.list_recent(HOME_PREVIEW_LIMIT).await
    }

    /// Looks up an announcement for editing. Staff only.
    pub async fn get_for_edit(&self, user: &User, id: i64) -> Result<Announcement> {
        ensure_staff(user)?;
        self.find(id).await
    }

    pub async fn create(&self, user: &User, input: AnnouncementInput) -> Result<Announcement> {
        ensure_staff(user)?;
        let input = normalize(input);
        input.validate()?;

        let announcement = self.repo.create(user.id, input).await?;
        tracing::info!("User {} created announcement {}", user.id, announcement.id);
        Ok(announcement)
    }

    pub async fn update(&self, user: &User, id: i64, input: AnnouncementInput) -> Result<Announcement> {
        ensure_staff(user)?;
        let existing = self.find(id).await?;
        let input = normalize(input);
        input.validate()?;

        self.repo.update(existing.id, input).await
    }

    pub async fn delete(&self, user: &User, id: i64) -> Result<()> {
        ensure_staff(user)?;
        let existing = self.find(id).await?;

        self.repo.delete(existing.id).await?;
        tracing::info!("User {} deleted announcement {}", user.id, existing.id);
        Ok(())
    }

    async fn find(&self, id: i64) -> Result<Announcement> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))
    }
}

fn normalize(input: AnnouncementInput) -> AnnouncementInput {
    AnnouncementInput {
        title: input.title.trim().to_string(),
        content: input.content.trim_end().to_string(),
    }
}
