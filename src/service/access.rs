//! Authorization gate shared by the services.
//!
//! Existence is checked before ownership so a missing id is NotFound while
//! somebody else's id is Forbidden.

use crate::{
    domain::{Resume, User},
    error::{AppError, Result},
};

pub fn authorize_resume(user: &User, resume: Option<Resume>) -> Result<Resume> {
    let resume = resume.ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;

    if resume.user_id != user.id {
        tracing::warn!(
            "User {} attempted to access resume {} owned by {}",
            user.id,
            resume.id,
            resume.user_id
        );
        return Err(AppError::Forbidden);
    }

    Ok(resume)
}

pub fn ensure_staff(user: &User) -> Result<()> {
    if user.is_staff() {
        Ok(())
    } else {
        tracing::warn!("User {} attempted a staff-only action", user.id);
        Err(AppError::Forbidden)
    }
}
