use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Allowed image extensions
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

pub const RESUME_PHOTOS_DIR: &str = "resume_photos";
pub const TEMPLATE_PREVIEWS_DIR: &str = "template_previews";

/// An image received in a multipart form, not yet written to disk.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: String,
    pub data: Vec<u8>,
}

fn image_extension(filename: &str) -> Result<String> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .ok_or_else(|| AppError::Validation("Invalid filename".to_string()))?;

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::Validation(format!(
            "Invalid file type. Allowed: {}",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }

    Ok(extension)
}

/// Checks an upload without touching the filesystem.
pub fn validate_image(image: &UploadedImage, max_bytes: usize) -> Result<()> {
    if image.data.is_empty() {
        return Err(AppError::Validation("The submitted file is empty".to_string()));
    }
    if image.data.len() > max_bytes {
        return Err(AppError::Validation(format!(
            "File too large (max {} MB)",
            max_bytes / (1024 * 1024)
        )));
    }
    image_extension(&image.filename)?;
    Ok(())
}

/// Saves an image under `media_root/subdir` with a fresh name.
/// Returns the path relative to the media root (e.g. "resume_photos/abc123.jpg").
pub async fn save_uploaded_image(
    media_root: &Path,
    subdir: &str,
    image: &UploadedImage,
    max_bytes: usize,
) -> Result<String> {
    validate_image(image, max_bytes)?;
    let extension = image_extension(&image.filename)?;

    let dir = media_root.join(subdir);
    fs::create_dir_all(&dir).await.map_err(|e| {
        AppError::Internal(format!("Failed to create upload directory: {}", e))
    })?;

    let new_filename = format!("{}.{}", Uuid::new_v4(), extension);
    let file_path = dir.join(&new_filename);

    let mut file = fs::File::create(&file_path).await.map_err(|e| {
        AppError::Internal(format!("Failed to create file: {}", e))
    })?;

    file.write_all(&image.data).await.map_err(|e| {
        AppError::Internal(format!("Failed to write file: {}", e))
    })?;

    Ok(format!("{}/{}", subdir, new_filename))
}

/// Deletes a stored upload by its media-relative path. Paths outside the
/// upload directories are left alone.
pub async fn delete_uploaded_file(media_root: &Path, relative: &str) -> Result<()> {
    let managed = [RESUME_PHOTOS_DIR, TEMPLATE_PREVIEWS_DIR]
        .iter()
        .any(|dir| relative.starts_with(&format!("{}/", dir)));
    if !managed || relative.contains("..") {
        return Ok(());
    }

    let path = media_root.join(relative);
    if fs::try_exists(&path).await.unwrap_or(false) {
        fs::remove_file(&path).await.map_err(|e| {
            AppError::Internal(format!("Failed to delete file: {}", e))
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str, len: usize) -> UploadedImage {
        UploadedImage { filename: name.to_string(), data: vec![1u8; len] }
    }

    #[test]
    fn test_validate_image() {
        assert!(validate_image(&image("me.JPG", 10), 100).is_ok());
        assert!(validate_image(&image("me.webp", 10), 100).is_ok());
        assert!(validate_image(&image("me.exe", 10), 100).is_err());
        assert!(validate_image(&image("noext", 10), 100).is_err());
        assert!(validate_image(&image("big.png", 101), 100).is_err());
        assert!(validate_image(&image("empty.png", 0), 100).is_err());
    }

    #[tokio::test]
    async fn test_save_and_delete() {
        let dir = tempfile::tempdir().unwrap();

        let relative = save_uploaded_image(dir.path(), RESUME_PHOTOS_DIR, &image("me.png", 4), 100)
            .await
            .unwrap();
        assert!(relative.starts_with("resume_photos/"));
        assert!(relative.ends_with(".png"));
        assert!(dir.path().join(&relative).exists());

        delete_uploaded_file(dir.path(), &relative).await.unwrap();
        assert!(!dir.path().join(&relative).exists());
    }

    #[tokio::test]
    async fn test_delete_ignores_unmanaged_paths() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("keep.txt");
        std::fs::write(&outside, b"x").unwrap();

        delete_uploaded_file(dir.path(), "keep.txt").await.unwrap();
        delete_uploaded_file(dir.path(), "resume_photos/../keep.txt").await.unwrap();
        assert!(outside.exists());
    }
}
