use std::collections::HashMap;
use std::sync::Arc;

use validator::Validate;

use crate::{
    domain::*,
    error::{AppError, Result},
    export::{ExportDocument, ExportFormat, RenderedExport},
    repository::{ResumeRepository, ResumeTemplateRepository},
    service::access::authorize_resume,
};

pub struct ResumeService {
    resumes: Arc<dyn ResumeRepository>,
    templates: Arc<dyn ResumeTemplateRepository>,
}

impl ResumeService {
    pub fn new(
        resumes: Arc<dyn ResumeRepository>,
        templates: Arc<dyn ResumeTemplateRepository>,
    ) -> Self {
        Self { resumes, templates }
    }

    /// Resolves a résumé the user owns.
    pub async fn owned_resume(&self, user: &User, resume_id: i64) -> Result<Resume> {
        let resume = self.resumes.find_by_id(resume_id).await?;
        authorize_resume(user, resume)
    }

    /// Creates a résumé with the four default sections.
    pub async fn create_resume(&self, user: &User, request: CreateResumeRequest) -> Result<Resume> {
        let request = CreateResumeRequest {
            title: request.title.trim().to_string(),
            ..request
        };
        request.validate()?;

        if let Some(template_id) = request.template_id {
            if self.templates.find_by_id(template_id).await?.is_none() {
                return Err(AppError::Validation("Selected template does not exist".to_string()));
            }
        }

        let resume = self.resumes
            .create_with_sections(user.id, request, &NewSection::defaults())
            .await?;

        tracing::info!("User {} created resume {}", user.id, resume.id);
        Ok(resume)
    }

    pub async fn get_resume(&self, user: &User, resume_id: i64) -> Result<ResumeWithSections> {
        let resume = self.owned_resume(user, resume_id).await?;
        let mut sections = self.resumes.list_sections(resume.id).await?;
        sort_sections(&mut sections);

        Ok(ResumeWithSections { resume, sections })
    }

    pub async fn list_resumes(&self, user: &User) -> Result<Vec<Resume>> {
        self.resumes.list_by_user(user.id).await
    }

    /// Overwrites section contents from `contents`. Only ids of sections in
    /// this résumé are applied; anything else is ignored. Returns the number
    /// of sections updated.
    pub async fn save_sections(
        &self,
        user: &User,
        resume_id: i64,
        contents: &HashMap<i64, String>,
    ) -> Result<u64> {
        let resume = self.owned_resume(user, resume_id).await?;
        let sections = self.resumes.list_sections(resume.id).await?;

        let updates: Vec<(i64, String)> = sections
            .iter()
            .filter_map(|section| {
                contents
                    .get(&section.id)
                    .map(|content| (section.id, content.clone()))
            })
            .collect();

        let ignored = contents.len() - updates.len();
        if ignored > 0 {
            tracing::debug!(
                "Ignoring {} section ids that do not belong to resume {}",
                ignored,
                resume.id
            );
        }

        if updates.is_empty() {
            return Ok(0);
        }

        self.resumes.update_section_contents(resume.id, &updates).await
    }

    /// Appends a section after the current last one. Empty title or content is
    /// a no-op and returns `None`.
    pub async fn add_section(
        &self,
        user: &User,
        resume_id: i64,
        title: &str,
        content: &str,
    ) -> Result<Option<ResumeSection>> {
        let resume = self.owned_resume(user, resume_id).await?;

        let title = title.trim();
        if title.is_empty() || content.trim().is_empty() {
            return Ok(None);
        }
        if title.chars().count() > MAX_SECTION_TITLE_LEN {
            return Err(AppError::Validation(format!(
                "Section title must be at most {} characters",
                MAX_SECTION_TITLE_LEN
            )));
        }

        let existing = self.resumes.list_sections(resume.id).await?;
        let section = NewSection {
            title: title.to_string(),
            content: content.to_string(),
            order: next_section_order(&existing),
        };

        let created = self.resumes.add_section(resume.id, section).await?;
        Ok(Some(created))
    }

    /// Deletes a section of one of the user's résumés and returns the id of
    /// the résumé it belonged to.
    pub async fn delete_section(&self, user: &User, section_id: i64) -> Result<i64> {
        let section = self.resumes
            .find_section(section_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Section not found".to_string()))?;

        let resume = self.owned_resume(user, section.resume_id).await?;
        self.resumes.delete_section(section.id).await?;

        Ok(resume.id)
    }

    pub async fn delete_resume(&self, user: &User, resume_id: i64) -> Result<()> {
        let resume = self.owned_resume(user, resume_id).await?;
        self.resumes.delete(resume.id).await?;

        tracing::info!("User {} deleted resume {}", user.id, resume.id);
        Ok(())
    }

    /// Copies a résumé and all of its sections for the same owner.
    pub async fn clone_resume(&self, user: &User, resume_id: i64) -> Result<Resume> {
        let original = self.get_resume(user, resume_id).await?;

        let request = CreateResumeRequest {
            title: clone_title(&original.resume.title),
            template_id: original.resume.template_id,
            photo: original.resume.photo.clone(),
        };
        let sections: Vec<NewSection> = original.sections.iter().map(NewSection::from).collect();

        let cloned = self.resumes
            .create_with_sections(original.resume.user_id, request, &sections)
            .await?;

        tracing::info!(
            "User {} cloned resume {} into {}",
            user.id,
            original.resume.id,
            cloned.id
        );
        Ok(cloned)
    }

    /// Renders one of the user's résumés in the requested format.
    pub async fn export(
        &self,
        user: &User,
        resume_id: i64,
        format: ExportFormat,
    ) -> Result<RenderedExport> {
        let ResumeWithSections { resume, sections } = self.get_resume(user, resume_id).await?;
        let document = ExportDocument::from_resume(&resume, &sections);

        let bytes = format.render(&document)?;

        Ok(RenderedExport {
            filename: format!("{}.{}", resume.title, format.extension()),
            content_type: format.content_type(),
            bytes,
        })
    }
}
