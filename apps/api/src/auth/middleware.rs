use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::auth::session::{session_id, Session};
use crate::state::AppState;

/// The authenticated session, inserted into request extensions by `require_auth`.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub session: Session,
}

/// Lets the request through only with a live authenticated session;
/// everything else is sent to the login page.
pub async fn require_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let Some(id) = session_id(request.headers()) else {
        debug!("No session cookie on {}, redirecting to login", request.uri().path());
        return Redirect::to("/login").into_response();
    };

    match state.sessions.get(&id).await {
        Some(session) if session.authenticated => {
            request.extensions_mut().insert(AuthSession { id, session });
            next.run(request).await
        }
        _ => {
            debug!("Unknown or expired session on {}", request.uri().path());
            Redirect::to("/login").into_response()
        }
    }
}
