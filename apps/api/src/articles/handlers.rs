use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;

use crate::articles::loader::{ensure_article, list_articles};
use crate::auth::middleware::AuthSession;
use crate::errors::AppError;
use crate::generation::tone::ToneOption;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub username: String,
    pub articles: Vec<String>,
    pub tones: Vec<ToneOption>,
}

#[derive(Debug, Serialize)]
pub struct SelectArticleResponse {
    pub article_name: String,
    pub tones: Vec<ToneOption>,
    pub firm: String,
    pub location: String,
}

/// GET /dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> Result<Json<DashboardResponse>, AppError> {
    let articles = list_articles(&state.config.articles_dir).await?;
    let tones = state.tones.options_for(&auth.session.username).await;

    Ok(Json(DashboardResponse {
        username: auth.session.username,
        articles,
        tones,
    }))
}

/// GET /articles/:name
///
/// Parameters for the generation form, pre-filled with the configured defaults.
pub async fn handle_select_article(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(name): Path<String>,
) -> Result<Json<SelectArticleResponse>, AppError> {
    ensure_article(&state.config.articles_dir, &name).await?;
    let tones = state.tones.options_for(&auth.session.username).await;

    Ok(Json(SelectArticleResponse {
        article_name: name,
        tones,
        firm: state.config.default_firm.clone(),
        location: state.config.default_location.clone(),
    }))
}
