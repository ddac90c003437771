use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    Extension, Json,
};
use serde::Serialize;
use tracing::info;

use crate::auth::middleware::AuthSession;
use crate::errors::AppError;
use crate::models::post::CurrentPost;
use crate::render::markdown_to_html;
use crate::review::handlers::image_url;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FinalizeResponse {
    pub post: CurrentPost,
    pub html: String,
    pub filename: String,
    pub download_url: String,
    pub image_url: Option<String>,
}

/// GET /finalize
///
/// Writes the current text to a new file and reports where to download it.
/// The image URL is only offered if the image is still on disk.
pub async fn handle_finalize(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> Result<Response, AppError> {
    let Some(post) = auth.session.post else {
        return Ok(Redirect::to("/dashboard").into_response());
    };

    let filename = state.store.save_text(&post.content).await?;
    let recorded = state
        .sessions
        .modify(&auth.id, |session| {
            if let Some(current) = session.post.as_mut() {
                current.filename = Some(filename.clone());
            }
        })
        .await;
    if recorded.is_none() {
        return Ok(Redirect::to("/login").into_response());
    }

    let image_on_disk = match post.image.as_deref() {
        Some(image) => state.store.image_exists(image).await,
        None => false,
    };
    let response = FinalizeResponse {
        html: markdown_to_html(&post.content),
        download_url: format!("/download/{filename}"),
        image_url: image_url(post.image.as_deref().filter(|_| image_on_disk)),
        post: CurrentPost {
            filename: Some(filename.clone()),
            ..post
        },
        filename,
    };

    Ok(Json(response).into_response())
}

/// GET /download/:filename
pub async fn handle_download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let path = state.store.resolve_download(&filename).await?;
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to read {}: {e}", path.display())))?;
    info!("Serving download {filename}");

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
