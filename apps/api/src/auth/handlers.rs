use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::session::{clear_session_cookie, session_cookie, session_id};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginStatus {
    pub authenticated: bool,
}

/// GET /
pub async fn handle_home(State(state): State<AppState>, headers: HeaderMap) -> Redirect {
    if is_authenticated(&state, &headers).await {
        Redirect::to("/dashboard")
    } else {
        Redirect::to("/login")
    }
}

/// GET /login
pub async fn handle_login_page(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<LoginStatus> {
    Json(LoginStatus {
        authenticated: is_authenticated(&state, &headers).await,
    })
}

/// POST /login
///
/// Success replaces any session the browser already had with a fresh one.
pub async fn handle_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if !state.credentials.verify(&form.username, &form.password) {
        warn!("Failed login attempt for '{}'", form.username);
        return Err(AppError::Auth);
    }

    if let Some(previous) = session_id(&headers) {
        state.sessions.destroy(&previous).await;
    }
    let id = state.sessions.create(&form.username).await;
    info!("User '{}' logged in", form.username);

    Ok((
        [(header::SET_COOKIE, session_cookie(&id))],
        Redirect::to("/dashboard"),
    )
        .into_response())
}

/// GET /logout
pub async fn handle_logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = session_id(&headers) {
        state.sessions.destroy(&id).await;
    }
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to("/login"),
    )
        .into_response()
}

async fn is_authenticated(state: &AppState, headers: &HeaderMap) -> bool {
    match session_id(headers) {
        Some(id) => state
            .sessions
            .get(&id)
            .await
            .map(|s| s.authenticated)
            .unwrap_or(false),
        None => false,
    }
}
