use crate::models::{Blog, BlogPayload, Category, Comment, CommentPayload, User};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

/// Repository
///
/// Abstract contract for all persistence operations. Handlers interact with the
/// data layer through this trait only, which keeps the Postgres implementation
/// swappable for an in-memory one in tests.
///
/// Every operation takes primitive identifiers/payloads and returns the matching
/// row(s), or `None`/empty when absent. Reads are side-effect-free; each write
/// commits as a single atomic statement and returns the post-commit row. No
/// method here validates ownership — authorization is entirely the calling
/// handler's responsibility.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, sqlx::Error>;
    async fn get_user(&self, id: i32) -> Result<Option<User>, sqlx::Error>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error>;
    async fn list_users(&self, skip: i64, limit: i64) -> Result<Vec<User>, sqlx::Error>;

    // --- Blogs ---
    async fn create_blog(&self, owner_id: i32, payload: &BlogPayload) -> Result<Blog, sqlx::Error>;
    async fn get_blog(&self, id: i32) -> Result<Option<Blog>, sqlx::Error>;
    async fn list_blogs(&self, skip: i64, limit: i64) -> Result<Vec<Blog>, sqlx::Error>;
    async fn list_blogs_by_owner(&self, owner_id: i32) -> Result<Vec<Blog>, sqlx::Error>;
    /// Full-field overwrite of title/description/content; refreshes `updated_at`.
    async fn update_blog(&self, id: i32, payload: &BlogPayload)
    -> Result<Option<Blog>, sqlx::Error>;
    /// Hard delete. Dependent comments and category links go with the row
    /// (schema-level cascade). Returns the deleted row.
    async fn delete_blog(&self, id: i32) -> Result<Option<Blog>, sqlx::Error>;

    // --- Comments ---
    async fn create_comment(
        &self,
        blog_id: i32,
        user_id: i32,
        payload: &CommentPayload,
    ) -> Result<Comment, sqlx::Error>;
    async fn get_comment(&self, id: i32) -> Result<Option<Comment>, sqlx::Error>;
    async fn list_comments(&self, skip: i64, limit: i64) -> Result<Vec<Comment>, sqlx::Error>;
    async fn list_comments_by_blog(&self, blog_id: i32) -> Result<Vec<Comment>, sqlx::Error>;
    async fn update_comment(
        &self,
        id: i32,
        payload: &CommentPayload,
    ) -> Result<Option<Comment>, sqlx::Error>;
    async fn delete_comment(&self, id: i32) -> Result<Option<Comment>, sqlx::Error>;

    // --- Categories ---
    async fn list_categories(&self, skip: i64, limit: i64) -> Result<Vec<Category>, sqlx::Error>;
    async fn get_category(&self, id: i32) -> Result<Option<Category>, sqlx::Error>;
    async fn get_category_by_name(&self, name: &str) -> Result<Option<Category>, sqlx::Error>;
    /// Create-if-absent as a single atomic upsert. Always returns the row for
    /// `name`, whether it existed before the call or not.
    async fn upsert_category(&self, name: &str) -> Result<Category, sqlx::Error>;
    /// Inserts the (blog, category) association. Returns false when the link
    /// already exists (composite-key conflict), true when a row was inserted.
    async fn link_category(&self, blog_id: i32, category_id: i32) -> Result<bool, sqlx::Error>;
    /// Removes the association. Returns false when no link existed.
    async fn unlink_category(&self, blog_id: i32, category_id: i32) -> Result<bool, sqlx::Error>;
    async fn list_categories_by_blog(&self, blog_id: i32) -> Result<Vec<Category>, sqlx::Error>;
}

/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The production implementation of [`Repository`], backed by a shared `PgPool`.
/// Each call checks a connection out of the pool for its duration and releases
/// it on every exit path, including errors.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const BLOG_COLUMNS: &str = "id, title, description, content, owner_id, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, content, blog_id, user_id, created_at, updated_at";

#[async_trait]
impl Repository for PostgresRepository {
    // --- Users ---

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, hashed_password, joined_at) \
             VALUES ($1, $2, NOW()) \
             RETURNING id, username, hashed_password, joined_at",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_user(&self, id: i32) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, hashed_password, joined_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, hashed_password, joined_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_users(&self, skip: i64, limit: i64) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, hashed_password, joined_at FROM users \
             ORDER BY id OFFSET $1 LIMIT $2",
        )
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    // --- Blogs ---

    /// Inserts a new blog. Both timestamps come from the same statement clock,
    /// so `created_at == updated_at` on the returned row.
    async fn create_blog(&self, owner_id: i32, payload: &BlogPayload) -> Result<Blog, sqlx::Error> {
        sqlx::query_as::<_, Blog>(&format!(
            "INSERT INTO blogs (title, description, content, owner_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, NOW(), NOW()) \
             RETURNING {BLOG_COLUMNS}",
        ))
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(&payload.content)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_blog(&self, id: i32) -> Result<Option<Blog>, sqlx::Error> {
        sqlx::query_as::<_, Blog>(&format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_blogs(&self, skip: i64, limit: i64) -> Result<Vec<Blog>, sqlx::Error> {
        sqlx::query_as::<_, Blog>(&format!(
            "SELECT {BLOG_COLUMNS} FROM blogs ORDER BY id OFFSET $1 LIMIT $2",
        ))
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_blogs_by_owner(&self, owner_id: i32) -> Result<Vec<Blog>, sqlx::Error> {
        sqlx::query_as::<_, Blog>(&format!(
            "SELECT {BLOG_COLUMNS} FROM blogs WHERE owner_id = $1 ORDER BY id",
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_blog(
        &self,
        id: i32,
        payload: &BlogPayload,
    ) -> Result<Option<Blog>, sqlx::Error> {
        sqlx::query_as::<_, Blog>(&format!(
            "UPDATE blogs SET title = $2, description = $3, content = $4, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {BLOG_COLUMNS}",
        ))
        .bind(id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(&payload.content)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_blog(&self, id: i32) -> Result<Option<Blog>, sqlx::Error> {
        sqlx::query_as::<_, Blog>(&format!(
            "DELETE FROM blogs WHERE id = $1 RETURNING {BLOG_COLUMNS}",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    // --- Comments ---

    async fn create_comment(
        &self,
        blog_id: i32,
        user_id: i32,
        payload: &CommentPayload,
    ) -> Result<Comment, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            "INSERT INTO comments (content, blog_id, user_id, created_at, updated_at) \
             VALUES ($1, $2, $3, NOW(), NOW()) \
             RETURNING {COMMENT_COLUMNS}",
        ))
        .bind(&payload.content)
        .bind(blog_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_comment(&self, id: i32) -> Result<Option<Comment>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_comments(&self, skip: i64, limit: i64) -> Result<Vec<Comment>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments ORDER BY id OFFSET $1 LIMIT $2",
        ))
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_comments_by_blog(&self, blog_id: i32) -> Result<Vec<Comment>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE blog_id = $1 ORDER BY id",
        ))
        .bind(blog_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_comment(
        &self,
        id: i32,
        payload: &CommentPayload,
    ) -> Result<Option<Comment>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            "UPDATE comments SET content = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COMMENT_COLUMNS}",
        ))
        .bind(id)
        .bind(&payload.content)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_comment(&self, id: i32) -> Result<Option<Comment>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            "DELETE FROM comments WHERE id = $1 RETURNING {COMMENT_COLUMNS}",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    // --- Categories ---

    async fn list_categories(&self, skip: i64, limit: i64) -> Result<Vec<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name FROM categories ORDER BY id OFFSET $1 LIMIT $2",
        )
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_category(&self, id: i32) -> Result<Option<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_category_by_name(&self, name: &str) -> Result<Option<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
    }

    /// The no-op DO UPDATE makes RETURNING yield the row on conflict too, so a
    /// concurrent attach of the same new name cannot race the existence check.
    async fn upsert_category(&self, name: &str) -> Result<Category, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) \
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
             RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
    }

    /// A duplicate link does not error; it simply affects zero rows.
    async fn link_category(&self, blog_id: i32, category_id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO blog_categories (blog_id, category_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(blog_id)
        .bind(category_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn unlink_category(&self, blog_id: i32, category_id: i32) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM blog_categories WHERE blog_id = $1 AND category_id = $2")
                .bind(blog_id)
                .bind(category_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_categories_by_blog(&self, blog_id: i32) -> Result<Vec<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            "SELECT c.id, c.name FROM categories c \
             JOIN blog_categories bc ON c.id = bc.category_id \
             WHERE bc.blog_id = $1 \
             ORDER BY c.id",
        )
        .bind(blog_id)
        .fetch_all(&self.pool)
        .await
    }
}
