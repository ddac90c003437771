use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::middleware::AuthSession;
use crate::errors::AppError;
use crate::generation::editor::{edit, start_conversation};
use crate::models::post::{latest_blog_version, ChatEntry, CurrentPost};
use crate::render::markdown_to_html;
use crate::state::AppState;

/// Public URL prefix of the generated image directory.
pub const IMAGE_URL_PREFIX: &str = "/static/generated";

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    pub filename: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub edit_message: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SaveForm {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub post: CurrentPost,
    pub html: String,
    pub image_url: Option<String>,
    pub chat_history: Vec<ChatEntry>,
}

pub fn image_url(image: Option<&str>) -> Option<String> {
    image.map(|name| format!("{IMAGE_URL_PREFIX}/{name}"))
}

/// GET /review[?filename=]
///
/// With no current post, `filename` reopens a previously exported text file.
pub async fn handle_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Query(query): Query<ReviewQuery>,
) -> Result<Response, AppError> {
    let mut session = auth.session;

    if session.post.is_none() {
        let Some(filename) = query.filename else {
            return Ok(Redirect::to("/dashboard").into_response());
        };
        let content = match state.store.read_text(&filename).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Could not reopen {filename}: {e}");
                return Ok(Redirect::to("/dashboard").into_response());
            }
        };
        let reopened = state
            .sessions
            .modify(&auth.id, |current| {
                if current.post.is_none() {
                    current.chat_history = vec![ChatEntry::blog(content.clone())];
                    current.conversation = start_conversation();
                    current.post = Some(CurrentPost::reopened(content, &filename));
                }
                current.clone()
            })
            .await;
        let Some(reopened) = reopened else {
            return Ok(Redirect::to("/login").into_response());
        };
        session = reopened;
        info!("Reopened {filename} for review");
    }

    let Some(post) = session.post else {
        return Ok(Redirect::to("/dashboard").into_response());
    };

    Ok(Json(ReviewResponse {
        html: markdown_to_html(&post.content),
        image_url: image_url(post.image.as_deref()),
        chat_history: session.chat_history,
        post,
    })
    .into_response())
}

/// POST /review
///
/// `edit_message` asks the model for a revision; `content` replaces the text
/// with a manual edit.
pub async fn handle_review_update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Form(form): Form<ReviewForm>,
) -> Result<Redirect, AppError> {
    let session = auth.session;
    let Some(post) = session.post else {
        return Ok(Redirect::to("/dashboard"));
    };

    let (entries, content, new_turns) = if let Some(message) = form.edit_message {
        let current = latest_blog_version(&session.chat_history)
            .unwrap_or(post.content.as_str())
            .to_string();
        let mut conversation = session.conversation;
        let before = conversation.len();
        let revised = edit(
            state.backend.as_ref(),
            &mut conversation,
            &message,
            Some(&current),
        )
        .await?;

        let entries = vec![ChatEntry::user(message), ChatEntry::blog(revised.clone())];
        (entries, revised, conversation.split_off(before))
    } else if let Some(content) = form.content {
        (vec![ChatEntry::blog(content.clone())], content, Vec::new())
    } else {
        return Ok(Redirect::to("/review"));
    };

    let applied = state
        .sessions
        .modify(&auth.id, move |current| {
            let Some(post) = current.post.as_mut() else {
                return false;
            };
            post.content = content;
            current.chat_history.extend(entries);
            current.conversation.extend(new_turns);
            true
        })
        .await;

    Ok(match applied {
        Some(true) => Redirect::to("/review"),
        Some(false) => Redirect::to("/dashboard"),
        None => Redirect::to("/login"),
    })
}

/// POST /save
pub async fn handle_save_changes(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Form(form): Form<SaveForm>,
) -> Redirect {
    let saved = state
        .sessions
        .modify(&auth.id, move |session| {
            let Some(post) = session.post.as_mut() else {
                return false;
            };
            post.content = form.content;
            session
                .chat_history
                .push(ChatEntry::note("User saved manual changes"));
            true
        })
        .await;

    match saved {
        Some(true) => Redirect::to("/finalize"),
        Some(false) => Redirect::to("/dashboard"),
        None => Redirect::to("/login"),
    }
}
