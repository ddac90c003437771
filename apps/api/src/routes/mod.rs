pub mod health;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::articles::handlers as articles;
use crate::auth::handlers as auth;
use crate::auth::middleware::require_auth;
use crate::export::handlers as export;
use crate::generation::handlers as generation;
use crate::review::handlers as review;
use crate::review::handlers::IMAGE_URL_PREFIX;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let image_dir = state.store.image_dir().to_path_buf();

    // Everything after login. Unauthenticated requests are redirected to /login.
    let protected = Router::new()
        .route("/dashboard", get(articles::handle_dashboard))
        .route("/articles/:name", get(articles::handle_select_article))
        .route("/tones", post(generation::handle_add_tone))
        .route("/generate", post(generation::handle_generate))
        .route(
            "/review",
            get(review::handle_review).post(review::handle_review_update),
        )
        .route("/save", post(review::handle_save_changes))
        .route("/finalize", get(export::handle_finalize))
        .route("/download/:filename", get(export::handle_download))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/", get(auth::handle_home))
        .route(
            "/login",
            get(auth::handle_login_page).post(auth::handle_login),
        )
        .route("/logout", get(auth::handle_logout))
        .route("/health", get(health::health_handler))
        .merge(protected)
        .nest_service(IMAGE_URL_PREFIX, ServeDir::new(image_dir))
        .with_state(state)
}
