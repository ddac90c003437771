//! Conversational editing with memory.
//!
//! The conversation starts with the editor system prompt. Each edit appends the
//! post as it currently reads (so manual edits are visible to the model), the
//! user's request, and finally the model's revised post.

use crate::errors::AppError;
use crate::generation::backend::GenerationBackend;
use crate::generation::prompts::{EDITOR_SYSTEM, EDIT_TEMPERATURE};
use crate::llm_client::ChatMessage;

pub fn start_conversation() -> Vec<ChatMessage> {
    vec![ChatMessage::system(EDITOR_SYSTEM)]
}

/// Applies `request` to `current` and returns the revised post.
///
/// `conversation` is only extended when the call succeeds.
pub async fn edit(
    backend: &dyn GenerationBackend,
    conversation: &mut Vec<ChatMessage>,
    request: &str,
    current: Option<&str>,
) -> Result<String, AppError> {
    if request.trim().is_empty() {
        return Err(AppError::Validation("edit request cannot be empty".to_string()));
    }

    let mut turns = if conversation.is_empty() {
        start_conversation()
    } else {
        conversation.clone()
    };
    if let Some(current) = current {
        turns.push(ChatMessage::assistant(current));
    }
    turns.push(ChatMessage::user(request));

    let revised = backend.complete(&turns, EDIT_TEMPERATURE).await?;
    if revised.trim().is_empty() {
        return Err(AppError::Generation("model returned an empty edit".to_string()));
    }

    turns.push(ChatMessage::assistant(revised.clone()));
    *conversation = turns;
    Ok(revised)
}
