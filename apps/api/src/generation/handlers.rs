//! Axum route handlers for generation and the tone catalog.

use axum::{extract::State, response::Redirect, Extension, Form, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::articles::loader::read_article;
use crate::auth::middleware::AuthSession;
use crate::errors::AppError;
use crate::generation::editor::start_conversation;
use crate::generation::generator::{generate_post, parse_keywords, GenerationRequest};
use crate::generation::tone::resolve_tone;
use crate::models::post::{ChatEntry, CurrentPost};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateForm {
    pub article: String,
    pub tone: String,
    #[serde(default)]
    pub custom_tone: Option<String>,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub firm: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Deserialize)]
pub struct AddToneForm {
    #[serde(default)]
    pub tone_name: String,
    #[serde(default)]
    pub tone_description: String,
}

#[derive(Debug, Serialize)]
pub struct AddToneResponse {
    pub success: bool,
}

/// POST /generate
///
/// Loads the article, generates the post and image, saves a draft text file,
/// and makes the result the session's current post.
pub async fn handle_generate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Form(form): Form<GenerateForm>,
) -> Result<Redirect, AppError> {
    let tone = resolve_tone(&form.tone, form.custom_tone.as_deref());
    if tone.is_empty() {
        return Err(AppError::Validation("tone cannot be empty".to_string()));
    }

    let article = read_article(&state.config.articles_dir, &form.article).await?;

    let request = GenerationRequest {
        tone: tone.clone(),
        keywords: parse_keywords(&form.keywords),
        firm: form.firm.trim().to_string(),
        location: form.location.trim().to_string(),
        article_text: article.text,
    };
    let result = generate_post(state.backend.as_ref(), &state.store, &request).await?;
    let filename = state.store.save_text(&result.content).await?;
    info!("Draft for '{}' saved as {filename}", article.name);

    let post = CurrentPost::generated(&article.name, result.content, result.image, tone, filename);
    let stored = state
        .sessions
        .modify(&auth.id, move |session| {
            session.chat_history = vec![ChatEntry::blog(post.content.clone())];
            session.conversation = start_conversation();
            session.post = Some(post);
        })
        .await;
    if stored.is_none() {
        warn!("Session ended while generating '{}'", article.name);
        return Ok(Redirect::to("/login"));
    }

    Ok(Redirect::to("/review"))
}

/// POST /tones
pub async fn handle_add_tone(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Form(form): Form<AddToneForm>,
) -> Json<AddToneResponse> {
    let success = state
        .tones
        .add_custom(&auth.session.username, &form.tone_name, &form.tone_description)
        .await;
    Json(AddToneResponse { success })
}
