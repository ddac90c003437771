use chrono::Local;
use serde::{Deserialize, Serialize};

/// The blog post the user is currently reviewing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentPost {
    /// Source article file name; absent when the post was reopened from an export.
    pub original: Option<String>,
    pub content: String,
    /// Generated image file name in the image directory.
    pub image: Option<String>,
    pub created: String,
    pub tone: Option<String>,
    /// Most recent text file written for this post.
    pub filename: Option<String>,
}

impl CurrentPost {
    pub fn generated(
        original: &str,
        content: String,
        image: Option<String>,
        tone: String,
        filename: String,
    ) -> Self {
        Self {
            original: Some(original.to_string()),
            content,
            image,
            created: Local::now().format("%Y-%m-%d %H:%M").to_string(),
            tone: Some(tone),
            filename: Some(filename),
        }
    }

    pub fn reopened(content: String, filename: &str) -> Self {
        Self {
            original: None,
            content,
            image: None,
            created: Local::now().format("%Y-%m-%d %H:%M").to_string(),
            tone: None,
            filename: Some(filename.to_string()),
        }
    }
}

/// One line of the review page's edit history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub role: String,
    pub content: String,
    /// True when `content` is a full version of the blog post.
    pub content_is_blog: bool,
    pub timestamp: String,
}

impl ChatEntry {
    pub fn blog(content: impl Into<String>) -> Self {
        Self::new("assistant", content, true)
    }

    pub fn user(message: impl Into<String>) -> Self {
        Self::new("user", message, false)
    }

    pub fn note(message: impl Into<String>) -> Self {
        Self::new("system", message, false)
    }

    fn new(role: &str, content: impl Into<String>, content_is_blog: bool) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
            content_is_blog,
            timestamp: Local::now().format("%H:%M:%S").to_string(),
        }
    }
}

/// The most recent full blog version in `history`, if any.
pub fn latest_blog_version(history: &[ChatEntry]) -> Option<&str> {
    history
        .iter()
        .rev()
        .find(|e| e.content_is_blog)
        .map(|e| e.content.as_str())
}
