//! Blog generation — turns an article plus the user's parameters into a blog
//! post and an accompanying image.
//!
//! Flow: rewrite prompt → chat completion → safe image prompt → image → save image.
//!
//! The text is required; the image is best-effort. Any failure in the image
//! path is logged and the post is returned without one.

use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::export::store::OutputStore;
use crate::generation::backend::GenerationBackend;
use crate::generation::prompts::{
    IMAGE_PROMPT_SOURCE_CHARS, IMAGE_PROMPT_SYSTEM, IMAGE_PROMPT_TEMPERATURE,
    REWRITE_SYSTEM_TEMPLATE, REWRITE_TEMPERATURE,
};
use crate::llm_client::prompts::{MARKDOWN_FORMAT_INSTRUCTION, NO_COMMENTARY_INSTRUCTION};
use crate::llm_client::ChatMessage;

/// Everything the rewrite needs. Lives for a single request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub tone: String,
    pub keywords: Vec<String>,
    pub firm: String,
    pub location: String,
    pub article_text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    /// Markdown blog text; never empty.
    pub content: String,
    /// Saved image file name, if the image step succeeded.
    pub image: Option<String>,
}

/// Splits the comma-separated keyword field, dropping blanks.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

/// Builds the rewrite conversation: rules in the system turn, article as the user turn.
pub fn rewrite_messages(request: &GenerationRequest) -> Vec<ChatMessage> {
    let system = REWRITE_SYSTEM_TEMPLATE
        .replace("{tone}", &request.tone)
        .replace("{keywords}", &request.keywords.join(", "))
        .replace("{firm}", &request.firm)
        .replace("{location}", &request.location)
        .replace("{format}", MARKDOWN_FORMAT_INSTRUCTION)
        .replace("{no_commentary}", NO_COMMENTARY_INSTRUCTION);

    vec![
        ChatMessage::system(system),
        ChatMessage::user(request.article_text.clone()),
    ]
}

/// Rewrites the article into a blog post.
pub async fn rewrite_article(
    backend: &dyn GenerationBackend,
    request: &GenerationRequest,
) -> Result<String, AppError> {
    let content = backend
        .complete(&rewrite_messages(request), REWRITE_TEMPERATURE)
        .await?;

    if content.trim().is_empty() {
        return Err(AppError::Generation("model returned an empty blog post".to_string()));
    }
    Ok(content)
}

/// Generates and saves an illustration for `content`. Returns the saved file
/// name, or `None` if any step failed.
pub async fn illustrate(
    backend: &dyn GenerationBackend,
    store: &OutputStore,
    content: &str,
) -> Option<String> {
    let source: String = content.chars().take(IMAGE_PROMPT_SOURCE_CHARS).collect();
    let messages = vec![
        ChatMessage::system(IMAGE_PROMPT_SYSTEM),
        ChatMessage::user(source),
    ];

    let prompt = match backend.complete(&messages, IMAGE_PROMPT_TEMPERATURE).await {
        Ok(prompt) => prompt,
        Err(e) => {
            warn!("Image prompt generation failed: {e}");
            return None;
        }
    };

    let bytes = match backend.generate_image(&prompt).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Image generation failed: {e}");
            return None;
        }
    };

    match store.save_image(&bytes).await {
        Ok(filename) => Some(filename),
        Err(e) => {
            warn!("Saving generated image failed: {e:?}");
            None
        }
    }
}

/// Runs the full pipeline: rewrite, then illustrate.
pub async fn generate_post(
    backend: &dyn GenerationBackend,
    store: &OutputStore,
    request: &GenerationRequest,
) -> Result<GenerationResult, AppError> {
    info!(
        "Generating blog post: tone={}, keywords={}",
        request.tone,
        request.keywords.len()
    );
    let content = rewrite_article(backend, request).await?;
    let image = illustrate(backend, store, &content).await;
    info!(
        "Blog post generated ({} chars, image: {})",
        content.len(),
        image.as_deref().unwrap_or("none")
    );

    Ok(GenerationResult { content, image })
}
