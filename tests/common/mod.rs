#![allow(dead_code)]

use async_trait::async_trait;
use blog_api::{
    AppState, AppConfig,
    models::{Blog, BlogPayload, Category, Comment, CommentPayload, User},
    repository::{Repository, RepositoryState},
};
use chrono::Utc;
use std::sync::{Arc, Mutex};

// --- In-memory repository ---

// Handlers depend on the Repository trait only, so the tests drive them with an
// in-memory implementation instead of Postgres. Unlike a canned mock this one
// actually stores rows, which lets lifecycle tests (create, read back, conflict
// on second insert) exercise the real handler logic.
#[derive(Default)]
struct Store {
    users: Vec<User>,
    blogs: Vec<Blog>,
    comments: Vec<Comment>,
    categories: Vec<Category>,
    links: Vec<(i32, i32)>,
    next_user_id: i32,
    next_blog_id: i32,
    next_comment_id: i32,
    next_category_id: i32,
}

pub struct MemoryRepository {
    store: Mutex<Store>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(Store::default()),
        }
    }
}

fn page<T: Clone>(rows: &[T], skip: i64, limit: i64) -> Vec<T> {
    rows.iter()
        .skip(skip as usize)
        .take(limit as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, sqlx::Error> {
        let mut store = self.store.lock().unwrap();
        store.next_user_id += 1;
        let user = User {
            id: store.next_user_id,
            username: username.to_string(),
            hashed_password: password_hash.to_string(),
            joined_at: Utc::now(),
        };
        store.users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: i32) -> Result<Option<User>, sqlx::Error> {
        let store = self.store.lock().unwrap();
        Ok(store.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        let store = self.store.lock().unwrap();
        Ok(store.users.iter().find(|u| u.username == username).cloned())
    }

    async fn list_users(&self, skip: i64, limit: i64) -> Result<Vec<User>, sqlx::Error> {
        let store = self.store.lock().unwrap();
        Ok(page(&store.users, skip, limit))
    }

    async fn create_blog(&self, owner_id: i32, payload: &BlogPayload) -> Result<Blog, sqlx::Error> {
        let mut store = self.store.lock().unwrap();
        store.next_blog_id += 1;
        // Single clock read, as in the SQL INSERT: created_at == updated_at.
        let now = Utc::now();
        let blog = Blog {
            id: store.next_blog_id,
            title: payload.title.clone(),
            description: payload.description.clone(),
            content: payload.content.clone(),
            owner_id,
            created_at: now,
            updated_at: now,
        };
        store.blogs.push(blog.clone());
        Ok(blog)
    }

    async fn get_blog(&self, id: i32) -> Result<Option<Blog>, sqlx::Error> {
        let store = self.store.lock().unwrap();
        Ok(store.blogs.iter().find(|b| b.id == id).cloned())
    }

    async fn list_blogs(&self, skip: i64, limit: i64) -> Result<Vec<Blog>, sqlx::Error> {
        let store = self.store.lock().unwrap();
        Ok(page(&store.blogs, skip, limit))
    }

    async fn list_blogs_by_owner(&self, owner_id: i32) -> Result<Vec<Blog>, sqlx::Error> {
        let store = self.store.lock().unwrap();
        Ok(store
            .blogs
            .iter()
            .filter(|b| b.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update_blog(
        &self,
        id: i32,
        payload: &BlogPayload,
    ) -> Result<Option<Blog>, sqlx::Error> {
        let mut store = self.store.lock().unwrap();
        let Some(blog) = store.blogs.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        blog.title = payload.title.clone();
        blog.description = payload.description.clone();
        blog.content = payload.content.clone();
        blog.updated_at = Utc::now();
        Ok(Some(blog.clone()))
    }

    async fn delete_blog(&self, id: i32) -> Result<Option<Blog>, sqlx::Error> {
        let mut store = self.store.lock().unwrap();
        let Some(pos) = store.blogs.iter().position(|b| b.id == id) else {
            return Ok(None);
        };
        let blog = store.blogs.remove(pos);
        // Mirror the schema-level cascade.
        store.comments.retain(|c| c.blog_id != id);
        store.links.retain(|(blog_id, _)| *blog_id != id);
        Ok(Some(blog))
    }

    async fn create_comment(
        &self,
        blog_id: i32,
        user_id: i32,
        payload: &CommentPayload,
    ) -> Result<Comment, sqlx::Error> {
        let mut store = self.store.lock().unwrap();
        store.next_comment_id += 1;
        let now = Utc::now();
        let comment = Comment {
            id: store.next_comment_id,
            content: payload.content.clone(),
            blog_id,
            user_id,
            created_at: now,
            updated_at: now,
        };
        store.comments.push(comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, id: i32) -> Result<Option<Comment>, sqlx::Error> {
        let store = self.store.lock().unwrap();
        Ok(store.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_comments(&self, skip: i64, limit: i64) -> Result<Vec<Comment>, sqlx::Error> {
        let store = self.store.lock().unwrap();
        Ok(page(&store.comments, skip, limit))
    }

    async fn list_comments_by_blog(&self, blog_id: i32) -> Result<Vec<Comment>, sqlx::Error> {
        let store = self.store.lock().unwrap();
        Ok(store
            .comments
            .iter()
            .filter(|c| c.blog_id == blog_id)
            .cloned()
            .collect())
    }

    async fn update_comment(
        &self,
        id: i32,
        payload: &CommentPayload,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let mut store = self.store.lock().unwrap();
        let Some(comment) = store.comments.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        comment.content = payload.content.clone();
        comment.updated_at = Utc::now();
        Ok(Some(comment.clone()))
    }

    async fn delete_comment(&self, id: i32) -> Result<Option<Comment>, sqlx::Error> {
        let mut store = self.store.lock().unwrap();
        let Some(pos) = store.comments.iter().position(|c| c.id == id) else {
            return Ok(None);
        };
        Ok(Some(store.comments.remove(pos)))
    }

    async fn list_categories(&self, skip: i64, limit: i64) -> Result<Vec<Category>, sqlx::Error> {
        let store = self.store.lock().unwrap();
        Ok(page(&store.categories, skip, limit))
    }

    async fn get_category(&self, id: i32) -> Result<Option<Category>, sqlx::Error> {
        let store = self.store.lock().unwrap();
        Ok(store.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn get_category_by_name(&self, name: &str) -> Result<Option<Category>, sqlx::Error> {
        let store = self.store.lock().unwrap();
        Ok(store.categories.iter().find(|c| c.name == name).cloned())
    }

    async fn upsert_category(&self, name: &str) -> Result<Category, sqlx::Error> {
        let mut store = self.store.lock().unwrap();
        if let Some(existing) = store.categories.iter().find(|c| c.name == name) {
            return Ok(existing.clone());
        }
        store.next_category_id += 1;
        let category = Category {
            id: store.next_category_id,
            name: name.to_string(),
        };
        store.categories.push(category.clone());
        Ok(category)
    }

    async fn link_category(&self, blog_id: i32, category_id: i32) -> Result<bool, sqlx::Error> {
        let mut store = self.store.lock().unwrap();
        if store.links.contains(&(blog_id, category_id)) {
            return Ok(false);
        }
        store.links.push((blog_id, category_id));
        Ok(true)
    }

    async fn unlink_category(&self, blog_id: i32, category_id: i32) -> Result<bool, sqlx::Error> {
        let mut store = self.store.lock().unwrap();
        let before = store.links.len();
        store.links.retain(|link| *link != (blog_id, category_id));
        Ok(store.links.len() < before)
    }

    async fn list_categories_by_blog(&self, blog_id: i32) -> Result<Vec<Category>, sqlx::Error> {
        let store = self.store.lock().unwrap();
        let ids: Vec<i32> = store
            .links
            .iter()
            .filter(|(b, _)| *b == blog_id)
            .map(|(_, c)| *c)
            .collect();
        Ok(store
            .categories
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }
}

// --- Test utilities ---

/// An AppState backed by the in-memory repository and the default test config
/// (Env::Local, so the `x-user-id` header bypass is active).
pub fn test_state() -> AppState {
    AppState {
        repo: Arc::new(MemoryRepository::new()) as RepositoryState,
        config: AppConfig::default(),
    }
}

/// Boots the full router on an ephemeral port and returns its base URL.
pub async fn spawn_app() -> (String, AppState) {
    let state = test_state();
    let router = blog_api::create_router(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let address = format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port());

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (address, state)
}
