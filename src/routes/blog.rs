use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Blog routes. Reads are public; create/update/delete require a bearer token,
/// and mutation is owner-only (checked in the handlers).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/blog/",
            get(handlers::list_blogs).post(handlers::create_blog),
        )
        .route(
            "/blog/{blog_id}",
            get(handlers::get_blog)
                .put(handlers::update_blog)
                .delete(handlers::delete_blog),
        )
}
