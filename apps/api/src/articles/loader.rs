use std::io::Cursor;
use std::path::Path;

use anyhow::Context;
use tracing::debug;

use crate::articles::docx::extract_text;
use crate::errors::AppError;
use crate::export::store::is_safe_file_name;

const ARTICLE_EXTENSION: &str = ".docx";

/// A source article: its file name and the extracted paragraph text.
#[derive(Debug, Clone)]
pub struct Article {
    pub name: String,
    pub text: String,
}

/// Lists the `.docx` files in `dir`, sorted by name.
pub async fn list_articles(dir: &Path) -> Result<Vec<String>, AppError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read articles directory {}", dir.display()))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .context("Failed to read articles directory entry")?
    {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        if is_file && is_article_name(&name) {
            names.push(name);
        }
    }

    names.sort();
    debug!("Found {} articles in {}", names.len(), dir.display());
    Ok(names)
}

/// Loads one article and extracts its text.
pub async fn read_article(dir: &Path, name: &str) -> Result<Article, AppError> {
    let path = article_path(dir, name).await?;
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| AppError::Load(format!("Article '{name}' could not be read: {e}")))?;
    let text = extract_text(Cursor::new(bytes))
        .map_err(|e| AppError::Load(format!("Article '{name}' could not be opened: {e}")))?;

    Ok(Article {
        name: name.to_string(),
        text,
    })
}

/// Confirms that `name` refers to an existing article without parsing it.
pub async fn ensure_article(dir: &Path, name: &str) -> Result<(), AppError> {
    article_path(dir, name).await.map(|_| ())
}

async fn article_path(dir: &Path, name: &str) -> Result<std::path::PathBuf, AppError> {
    if !is_safe_file_name(name) || !is_article_name(name) {
        return Err(AppError::Load(format!("'{name}' is not a valid article name")));
    }
    let path = dir.join(name);
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => Ok(path),
        _ => Err(AppError::Load(format!("Article '{name}' not found"))),
    }
}

fn is_article_name(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(ARTICLE_EXTENSION)
}
