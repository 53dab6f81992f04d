//! Résumé export adapters.
//!
//! Both adapters are pure: they take an [`ExportDocument`] assembled by the
//! caller (after the ownership check) and return the encoded bytes.

pub mod docx;
pub mod pdf;

use thiserror::Error;

use crate::domain::{Resume, ResumeSection};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("DOCX rendering failed: {0}")]
    Docx(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSection {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub title: String,
    pub sections: Vec<ExportSection>,
}

impl ExportDocument {
    /// `sections` must already be in display order.
    pub fn from_resume(resume: &Resume, sections: &[ResumeSection]) -> Self {
        Self {
            title: resume.title.clone(),
            sections: sections
                .iter()
                .map(|s| ExportSection {
                    title: s.title.clone(),
                    content: s.content.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Docx,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }

    pub fn render(&self, document: &ExportDocument) -> Result<Vec<u8>, RenderError> {
        match self {
            ExportFormat::Pdf => pdf::render(document, &pdf::PageTemplate::default()),
            ExportFormat::Docx => docx::render(document),
        }
    }
}

/// Encoded export ready to be sent as an attachment.
#[derive(Debug, Clone)]
pub struct RenderedExport {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl RenderedExport {
    /// `Content-Disposition` value for this file. Quotes and control characters
    /// are dropped from the quoted name; non-ASCII names also get an RFC 5987
    /// `filename*` parameter next to an ASCII fallback.
    pub fn content_disposition(&self) -> String {
        let quoted: String = self
            .filename
            .chars()
            .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
            .collect();

        if quoted.is_ascii() {
            return format!("attachment; filename=\"{}\"", quoted);
        }

        let fallback: String = quoted
            .chars()
            .map(|c| if c.is_ascii() { c } else { '_' })
            .collect();

        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            urlencoding::encode(&quoted)
        )
    }
}
