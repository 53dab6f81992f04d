pub mod access;
pub mod account_service;
pub mod announcement_service;
pub mod resume_service;
pub mod template_service;

use std::sync::Arc;
use sqlx::SqlitePool;

use crate::auth::AuthService;
use crate::config::Settings;
use crate::repository::*;
use account_service::AccountService;
use announcement_service::AnnouncementService;
use resume_service::ResumeService;
use template_service::ResumeTemplateService;

pub struct ServiceContext {
    pub user_repo: Arc<dyn UserRepository>,
    pub resume_repo: Arc<dyn ResumeRepository>,
    pub template_repo: Arc<dyn ResumeTemplateRepository>,
    pub announcement_repo: Arc<dyn AnnouncementRepository>,
    pub auth_service: Arc<AuthService>,
    pub account_service: Arc<AccountService>,
    pub resume_service: Arc<ResumeService>,
    pub template_service: Arc<ResumeTemplateService>,
    pub announcement_service: Arc<AnnouncementService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(db_pool: SqlitePool, settings: &Settings) -> Self {
        let user_repo: Arc<dyn UserRepository> =
            Arc::new(SqliteUserRepository::new(db_pool.clone()));
        let resume_repo: Arc<dyn ResumeRepository> =
            Arc::new(SqliteResumeRepository::new(db_pool.clone()));
        let template_repo: Arc<dyn ResumeTemplateRepository> =
            Arc::new(SqliteResumeTemplateRepository::new(db_pool.clone()));
        let announcement_repo: Arc<dyn AnnouncementRepository> =
            Arc::new(SqliteAnnouncementRepository::new(db_pool.clone()));

        let auth_service = Arc::new(AuthService::new(
            db_pool.clone(),
            settings.auth.session_duration_hours,
            settings.auth.cookie_secure,
        ));

        let account_service = Arc::new(AccountService::new(user_repo.clone()));
        let resume_service = Arc::new(ResumeService::new(
            resume_repo.clone(),
            template_repo.clone(),
        ));
        let template_service = Arc::new(ResumeTemplateService::new(template_repo.clone()));
        let announcement_service = Arc::new(AnnouncementService::new(announcement_repo.clone()));

        Self {
            user_repo,
            resume_repo,
            template_repo,
            announcement_repo,
            auth_service,
            account_service,
            resume_service,
            template_service,
            announcement_service,
            db_pool,
        }
    }
}
