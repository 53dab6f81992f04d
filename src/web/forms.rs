use std::collections::{BTreeMap, HashMap};

use axum::extract::Multipart;
use validator::ValidationErrors;

use crate::error::{AppError, Result};
use crate::web::uploads::UploadedImage;

/// Field and form-wide error messages shown next to a re-rendered form.
#[derive(Debug, Clone, Default)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
    general: Vec<String>,
}

impl FormErrors {
    pub fn from_validation(errors: &ValidationErrors) -> Self {
        let mut form_errors = Self::default();
        for (field, errs) in errors.field_errors() {
            for err in errs {
                let message = match &err.message {
                    Some(message) => message.to_string(),
                    None => format!("Invalid value for {}", field),
                };
                form_errors.add(field.as_ref(), message);
            }
        }
        form_errors
    }

    /// Turns user-correctable service errors into form errors. Anything else
    /// is handed back so it can propagate as an error page.
    pub fn from_app_error(err: AppError) -> std::result::Result<Self, AppError> {
        match err {
            AppError::Validation(message)
            | AppError::Conflict(message)
            | AppError::BadRequest(message) => Ok(Self::general(message)),
            other => Err(other),
        }
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self {
            general: vec![message.into()],
            ..Self::default()
        }
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn merge(&mut self, other: FormErrors) {
        for (field, messages) in other.fields {
            self.fields.entry(field).or_default().extend(messages);
        }
        self.general.extend(other.general);
    }

    /// Attaches a user-correctable error to `field`; other errors are returned.
    pub fn add_app_error(&mut self, field: &str, err: AppError) -> std::result::Result<(), AppError> {
        match err {
            AppError::Validation(message) | AppError::BadRequest(message) => {
                self.add(field, message);
                Ok(())
            }
            other => Err(other),
        }
    }

    pub fn for_field(&self, field: &str) -> Vec<String> {
        self.fields.get(field).cloned().unwrap_or_default()
    }

    pub fn general_errors(&self) -> &[String] {
        &self.general
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.general.is_empty()
    }
}

/// A fully read multipart body: text fields plus any non-empty file parts.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedImage>,
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Malformed form data: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(filename) => {
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;
                    // Browsers send an empty part when no file was chosen
                    if !filename.is_empty() && !data.is_empty() {
                        form.files.insert(name, UploadedImage { filename, data: data.to_vec() });
                    }
                }
                None => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Failed to read field: {}", e)))?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedImage> {
        self.files.remove(name)
    }
}
