use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A visual template a résumé can be associated with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeTemplate {
    pub id: i64,
    pub name: String,
    pub preview_image: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateResumeTemplateRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "A preview image is required"))]
    pub preview_image: String,
    pub description: String,
}
