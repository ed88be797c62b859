use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Comment routes, both the global namespace and the per-blog one. Mutation is
/// author-only; any authenticated user may post under an existing blog.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/comment/", get(handlers::list_comments))
        .route(
            "/comment/{comment_id}",
            get(handlers::get_comment)
                .put(handlers::update_comment)
                .delete(handlers::delete_comment),
        )
        .route(
            "/blog/{blog_id}/comment/",
            get(handlers::list_blog_comments).post(handlers::create_comment),
        )
}
