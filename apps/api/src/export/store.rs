//! Output store — where exported blog text and generated images land on disk.
//!
//! Both directories are append-only: every save creates a new file named
//! `<prefix>_<unix seconds>_<random suffix>.<ext>`, nothing is overwritten or
//! cleaned up.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone)]
pub struct OutputStore {
    text_dir: PathBuf,
    image_dir: PathBuf,
}

impl OutputStore {
    pub fn new(text_dir: impl Into<PathBuf>, image_dir: impl Into<PathBuf>) -> Self {
        Self {
            text_dir: text_dir.into(),
            image_dir: image_dir.into(),
        }
    }

    /// Writes `content` byte-for-byte to a fresh `.txt` file and returns its name.
    pub async fn save_text(&self, content: &str) -> Result<String> {
        let filename = unique_name("blog", "txt");
        let path = self.text_dir.join(&filename);
        tokio::fs::create_dir_all(&self.text_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.text_dir.display()))?;
        tokio::fs::write(&path, content.as_bytes())
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Saved blog text to {}", path.display());
        Ok(filename)
    }

    /// Reads a previously exported text file.
    pub async fn read_text(&self, filename: &str) -> Result<String, AppError> {
        let path = self.resolve_download(filename).await?;
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))
            .map_err(AppError::Internal)
    }

    /// Writes image bytes to a fresh `.png` file and returns its name.
    pub async fn save_image(&self, bytes: &[u8]) -> Result<String> {
        let filename = unique_name("image", "png");
        let path = self.image_dir.join(&filename);
        tokio::fs::create_dir_all(&self.image_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.image_dir.display()))?;
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Saved generated image to {}", path.display());
        Ok(filename)
    }

    pub async fn image_exists(&self, filename: &str) -> bool {
        is_safe_file_name(filename)
            && tokio::fs::metadata(self.image_dir.join(filename))
                .await
                .map(|m| m.is_file())
                .unwrap_or(false)
    }

    /// Maps an exported file name to its path, refusing anything that could
    /// escape the text directory.
    pub async fn resolve_download(&self, filename: &str) -> Result<PathBuf, AppError> {
        if !is_safe_file_name(filename) {
            return Err(AppError::Validation(format!("Invalid file name '{filename}'")));
        }
        let path = self.text_dir.join(filename);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => Err(AppError::NotFound(format!("File {filename} not found"))),
        }
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }
}

/// True for a plain file name: no directory components, no traversal, not hidden.
pub fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(&['/', '\\'][..])
        && !name.contains("..")
}

fn unique_name(prefix: &str, extension: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{prefix}_{}_{}.{extension}",
        chrono::Utc::now().timestamp(),
        &suffix[..8]
    )
}
