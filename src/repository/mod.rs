use async_trait::async_trait;
use crate::domain::*;
use crate::error::Result;

pub mod user_repository;
pub mod resume_repository;
pub mod resume_template_repository;
pub mod announcement_repository;

pub use user_repository::SqliteUserRepository;
pub use resume_repository::SqliteResumeRepository;
pub use resume_template_repository::SqliteResumeTemplateRepository;
pub use announcement_repository::SqliteAnnouncementRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: CreateUserRequest) -> Result<User>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn password_hash(&self, username: &str) -> Result<Option<String>>;
    async fn update(&self, id: i64, update: UpdateUserRequest) -> Result<User>;
    /// Removes the user with their sessions, announcements, résumés and sections.
    async fn delete(&self, id: i64) -> Result<()>;
}

#[async_trait]
pub trait ResumeRepository: Send + Sync {
    /// Inserts the résumé and its initial sections in one transaction.
    async fn create_with_sections(
        &self,
        user_id: i64,
        resume: CreateResumeRequest,
        sections: &[NewSection],
    ) -> Result<Resume>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Resume>>;
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Resume>>;
    /// Deletes the résumé and all of its sections in one transaction.
    async fn delete(&self, id: i64) -> Result<()>;

    async fn list_sections(&self, resume_id: i64) -> Result<Vec<ResumeSection>>;
    async fn find_section(&self, id: i64) -> Result<Option<ResumeSection>>;
    async fn add_section(&self, resume_id: i64, section: NewSection) -> Result<ResumeSection>;
    /// Overwrites section contents; each pair is only applied if the section
    /// belongs to `resume_id`. Returns the number of rows changed.
    async fn update_section_contents(&self, resume_id: i64, contents: &[(i64, String)]) -> Result<u64>;
    async fn delete_section(&self, id: i64) -> Result<()>;
}

#[async_trait]
pub trait ResumeTemplateRepository: Send + Sync {
    async fn create(&self, template: CreateResumeTemplateRequest) -> Result<ResumeTemplate>;
    async fn find_by_id(&self, id: i64) -> Result<Option<ResumeTemplate>>;
    async fn list(&self, limit: Option<i64>) -> Result<Vec<ResumeTemplate>>;
    /// Deletes the template and clears it from every résumé that used it.
    async fn delete(&self, id: i64) -> Result<()>;
}

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    async fn create(&self, author_id: i64, input: AnnouncementInput) -> Result<Announcement>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Announcement>>;
    /// All announcements, newest first.
    async fn list(&self) -> Result<Vec<Announcement>>;
    async fn list_recent(&self, limit: i64) -> Result<Vec<Announcement>>;
    async fn update(&self, id: i64, input: AnnouncementInput) -> Result<Announcement>;
    async fn delete(&self, id: i64) -> Result<()>;
}
