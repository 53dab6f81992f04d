use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Sections every new résumé starts with, at orders 0..3.
pub const DEFAULT_SECTIONS: [(&str, &str); 4] = [
    ("Personal Information", "Enter your contact information"),
    ("Work Experience", "Describe your work experience"),
    ("Education", "Add your education details"),
    ("Skills", "List your skills"),
];

pub const CLONE_TITLE_PREFIX: &str = "Copy ";

pub const MAX_RESUME_TITLE_LEN: usize = 255;
pub const MAX_SECTION_TITLE_LEN: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resume {
    pub id: i64,
    pub user_id: i64,
    pub template_id: Option<i64>,
    pub title: String,
    pub photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResumeSection {
    pub id: i64,
    pub resume_id: i64,
    pub title: String,
    pub content: String,
    pub order: i64,
}

/// A résumé together with its sections sorted by `order`, then id.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeWithSections {
    pub resume: Resume,
    pub sections: Vec<ResumeSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateResumeRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,
    pub template_id: Option<i64>,
    pub photo: Option<String>,
}

/// Section data without identity, used for inserts and deep copies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewSection {
    pub title: String,
    pub content: String,
    pub order: i64,
}

impl NewSection {
    pub fn defaults() -> Vec<NewSection> {
        DEFAULT_SECTIONS
            .iter()
            .enumerate()
            .map(|(i, (title, content))| NewSection {
                title: title.to_string(),
                content: content.to_string(),
                order: i as i64,
            })
            .collect()
    }
}

impl From<&ResumeSection> for NewSection {
    fn from(section: &ResumeSection) -> Self {
        Self {
            title: section.title.clone(),
            content: section.content.clone(),
            order: section.order,
        }
    }
}

/// Order for a section appended after `existing`.
pub fn next_section_order(existing: &[ResumeSection]) -> i64 {
    existing
        .iter()
        .map(|s| s.order)
        .max()
        .map(|max| max + 1)
        .unwrap_or(0)
}

/// Sorts sections by `order`, falling back to id for ties.
pub fn sort_sections(sections: &mut [ResumeSection]) {
    sections.sort_by(|a, b| a.order.cmp(&b.order).then(a.id.cmp(&b.id)));
}

/// Title given to a copy of a résumé, kept within the column limit.
pub fn clone_title(original: &str) -> String {
    format!("{}{}", CLONE_TITLE_PREFIX, original)
        .chars()
        .take(MAX_RESUME_TITLE_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(id: i64, order: i64) -> ResumeSection {
        ResumeSection {
            id,
            resume_id: 1,
            title: format!("s{}", id),
            content: String::new(),
            order,
        }
    }

    #[test]
    fn test_defaults_are_ordered_from_zero() {
        let defaults = NewSection::defaults();
        assert_eq!(defaults.len(), 4);
        let orders: Vec<i64> = defaults.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
        assert_eq!(defaults[0].title, "Personal Information");
        assert_eq!(defaults[3].title, "Skills");
    }

    #[test]
    fn test_next_section_order() {
        assert_eq!(next_section_order(&[]), 0);
        let sections = vec![section(1, 0), section(2, 3), section(3, 1)];
        assert_eq!(next_section_order(&sections), 4);
        // gaps are allowed, only the max matters
        assert_eq!(next_section_order(&[section(1, 10)]), 11);
    }

    #[test]
    fn test_sort_sections_breaks_ties_by_id() {
        let mut sections = vec![section(5, 1), section(2, 1), section(9, 0)];
        sort_sections(&mut sections);
        let ids: Vec<i64> = sections.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![9, 2, 5]);
    }

    #[test]
    fn test_clone_title() {
        assert_eq!(clone_title("Backend CV"), "Copy Backend CV");
        let long = "x".repeat(MAX_RESUME_TITLE_LEN);
        assert_eq!(clone_title(&long).chars().count(), MAX_RESUME_TITLE_LEN);
    }
}
