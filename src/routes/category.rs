use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Category routes: shared-tag lookups plus the per-blog attach/detach
/// endpoints. Attach and detach are blog-owner only.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/category/", get(handlers::list_categories))
        .route("/category/{category_id}", get(handlers::get_category))
        .route("/category/name/{name}", get(handlers::get_category_by_name))
        .route(
            "/blog/{blog_id}/category/",
            get(handlers::list_blog_categories),
        )
        // No trailing slash on the attach path, kept for wire compatibility.
        .route("/blog/{blog_id}/category", post(handlers::attach_category))
        .route(
            "/blog/{blog_id}/category/{category_id}",
            delete(handlers::detach_category),
        )
}
