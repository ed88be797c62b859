use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// User routes: registration, lookups, the current-account view, and the
/// token-issuance endpoint.
pub fn routes() -> Router<AppState> {
    Router::new()
        // POST /user/ creates an account; GET /user/ lists users with blog summaries.
        .route(
            "/user/",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/user/{username}", get(handlers::get_user_by_username))
        // Separate namespace for the by-id lookup, kept for wire compatibility.
        .route("/userId/{user_id}", get(handlers::get_user_by_id))
        // Bearer-token required; resolves the token to a user profile.
        .route("/my-account/", get(handlers::get_my_account))
        // Credential exchange: {username, password} -> bearer token.
        .route("/token", post(handlers::login))
}
