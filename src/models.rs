use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// --- Database rows ---

/// User
///
/// Canonical identity record from the `users` table. The password hash never
/// leaves the process; API responses use [`UserResponse`] instead.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub hashed_password: String,
    pub joined_at: DateTime<Utc>,
}

/// Blog
///
/// A blog post row. `owner_id` references the authoring user; only that user
/// may mutate or delete the row (enforced in the handlers).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Blog {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub content: String,
    pub owner_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment
///
/// A comment row. `user_id` is the author; `blog_id` the parent blog. Only the
/// author may mutate or delete it, the blog owner gets no special rights.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Comment {
    pub id: i32,
    pub content: String,
    pub blog_id: i32,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category
///
/// A shared, owner-less tag. Referenced by many blogs through `blog_categories`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

/// BlogCategory
///
/// Association row keyed by the (blog, category) composite; it has no identity
/// of its own.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct BlogCategory {
    pub blog_id: i32,
    pub category_id: i32,
}

// --- Request payloads ---

/// Input payload for registration (POST /user/).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
}

/// Input payload for the login endpoint (POST /token).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Payload for creating a blog and for the full-field overwrite on update.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct BlogPayload {
    pub title: String,
    pub description: String,
    pub content: String,
}

/// Payload for creating or overwriting a comment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CommentPayload {
    pub content: String,
}

/// Payload naming a category to attach to a blog. The category is created
/// implicitly when the name is unknown.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CategoryPayload {
    pub name: String,
}

// --- Query parameters ---

/// Offset/limit paging accepted by every list endpoint.
#[derive(Debug, Clone, Copy, Deserialize, utoipa::IntoParams)]
pub struct Pagination {
    /// Number of rows to skip. Defaults to 0.
    pub skip: Option<i64>,
    /// Maximum number of rows to return. Defaults to 100, capped server-side.
    pub limit: Option<i64>,
}

/// Server-side cap on caller-supplied limits.
pub const MAX_PAGE_LIMIT: i64 = 100;

impl Pagination {
    /// Resolves the raw query parameters into a safe (skip, limit) pair.
    pub fn resolve(self) -> (i64, i64) {
        let skip = self.skip.unwrap_or(0).max(0);
        let limit = self.limit.unwrap_or(MAX_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
        (skip, limit)
    }
}

// --- Response projections ---

/// Token pair returned by POST /token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Trimmed blog projection used in list views and embedded in user responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct BlogSummary {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub updated_at: DateTime<Utc>,
}

impl From<Blog> for BlogSummary {
    fn from(blog: Blog) -> Self {
        Self {
            id: blog.id,
            title: blog.title,
            description: blog.description,
            updated_at: blog.updated_at,
        }
    }
}

/// Trimmed comment projection embedded in the full blog view.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CommentSummary {
    pub id: i32,
    pub user_id: i32,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

impl From<Comment> for CommentSummary {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            user_id: comment.user_id,
            content: comment.content,
            updated_at: comment.updated_at,
        }
    }
}

/// Full blog projection (GET /blog/{id}): all fields plus comment summaries.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct BlogResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub content: String,
    pub owner_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub comments: Vec<CommentSummary>,
}

impl BlogResponse {
    pub fn new(blog: Blog, comments: Vec<Comment>) -> Self {
        Self {
            id: blog.id,
            title: blog.title,
            description: blog.description,
            content: blog.content,
            owner_id: blog.owner_id,
            created_at: blog.created_at,
            updated_at: blog.updated_at,
            comments: comments.into_iter().map(CommentSummary::from).collect(),
        }
    }
}

/// Public user projection: identity plus owned blog summaries. The password
/// hash is structurally absent.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub joined_at: DateTime<Utc>,
    pub blogs: Vec<BlogSummary>,
}

impl UserResponse {
    pub fn new(user: User, blogs: Vec<Blog>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            joined_at: user.joined_at,
            blogs: blogs.into_iter().map(BlogSummary::from).collect(),
        }
    }
}
