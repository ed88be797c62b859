use axum::{Json, Router, extract::FromRef, http::HeaderName, routing::get};
use serde_json::json;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;

// --- Public Re-exports ---

// Makes core state types easily accessible to the entry point and the tests.
pub use config::AppConfig;
pub use error::ApiError;
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Aggregates the OpenAPI documentation for every annotated handler and schema.
/// The resulting JSON is served at `/api-docs/openapi.json`, with the Swagger UI
/// at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::create_user, handlers::list_users, handlers::get_user_by_username,
        handlers::get_user_by_id, handlers::get_my_account, handlers::login,
        handlers::create_blog, handlers::list_blogs, handlers::get_blog,
        handlers::update_blog, handlers::delete_blog,
        handlers::list_comments, handlers::get_comment, handlers::update_comment,
        handlers::delete_comment, handlers::list_blog_comments, handlers::create_comment,
        handlers::list_categories, handlers::get_category, handlers::get_category_by_name,
        handlers::list_blog_categories, handlers::attach_category, handlers::detach_category,
    ),
    components(
        schemas(
            models::Blog, models::BlogSummary, models::BlogResponse, models::BlogPayload,
            models::Comment, models::CommentSummary, models::CommentPayload,
            models::Category, models::CategoryPayload, models::BlogCategory,
            models::CreateUserRequest, models::UserResponse,
            models::LoginRequest, models::TokenResponse,
        )
    ),
    tags(
        (name = "blog-api", description = "Blogging platform CRUD API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe container holding the shared services: the
/// repository (persistence access) and the immutable configuration. Cloned per
/// request; both members are cheap handles.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub config: AppConfig,
}

// FromRef impls let extractors (notably AuthUser) pull individual components
// out of the shared state.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the application's entire routing structure, applies the
/// observability layers, and registers the shared state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route(
            "/",
            get(|| async { Json(json!({ "message": "Please see `/swagger-ui` for usage." })) }),
        )
        // Liveness probe for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        .merge(routes::user::routes())
        .merge(routes::blog::routes())
        .merge(routes::comment::routes())
        .merge(routes::category::routes())
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                // Generate a unique id for every incoming request...
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // ...wrap the request lifecycle in a span carrying it...
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // ...and echo it back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// Customizes span creation for `TraceLayer`: every log line for a single
/// request is correlated by the `x-request-id` header.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
