use std::sync::Arc;

use validator::Validate;

use crate::{
    domain::{CreateResumeTemplateRequest, ResumeTemplate, User},
    error::{AppError, Result},
    repository::ResumeTemplateRepository,
    service::access::ensure_staff,
};

/// Number of templates featured on the home page.
pub const HOME_TEMPLATE_LIMIT: i64 = 3;

pub struct ResumeTemplateService {
    repo: Arc<dyn ResumeTemplateRepository>,
}

impl ResumeTemplateService {
    pub fn new(repo: Arc<dyn ResumeTemplateRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<ResumeTemplate>> {
        self.repo.list(None).await
    }

    pub async fn featured(&self) -> Result<Vec<ResumeTemplate>> {
        self.repo.list(Some(HOME_TEMPLATE_LIMIT)).await
    }

    pub async fn get(&self, id: i64) -> Result<ResumeTemplate> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Template not found".to_string()))
    }

    pub async fn create(&self, user: &User, request: CreateResumeTemplateRequest) -> Result<ResumeTemplate> {
        ensure_staff(user)?;
        request.validate()?;

        let template = self.repo.create(request).await?;
        tracing::info!("User {} created resume template {}", user.id, template.id);
        Ok(template)
    }

    /// Deletes a template; résumés that used it keep existing without one.
    pub async fn delete(&self, user: &User, id: i64) -> Result<ResumeTemplate> {
        ensure_staff(user)?;
        let template = self.get(id).await?;

        self.repo.delete(template.id).await?;
        Ok(template)
    }
}
