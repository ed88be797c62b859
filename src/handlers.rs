use crate::{
    AppState, auth,
    auth::AuthUser,
    error::ApiError,
    models::{
        Blog, BlogCategory, BlogPayload, BlogResponse, BlogSummary, Category, CategoryPayload,
        Comment, CommentPayload, CreateUserRequest, LoginRequest, Pagination, TokenResponse,
        UserResponse,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
};

// --- User handlers ---

/// create_user
///
/// [Public Route] Registers a new user. The username must be free (checked
/// before insert, backed by the unique constraint), the password is hashed
/// before storage and never returned, and `joined_at` is set to creation time.
#[utoipa::path(
    post,
    path = "/user/",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "Created", body = UserResponse),
        (status = 400, description = "Username already registered")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if state
        .repo
        .get_user_by_username(&payload.username)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("Username already registered"));
    }
    let hash = auth::hash_password(&payload.password)?;
    let user = state.repo.create_user(&payload.username, &hash).await?;
    Ok(Json(UserResponse::new(user, Vec::new())))
}

/// list_users
///
/// [Public Route] Lists users with their blog summaries, paged by skip/limit.
#[utoipa::path(
    get,
    path = "/user/",
    params(Pagination),
    responses((status = 200, description = "Users", body = [UserResponse]))
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let (skip, limit) = page.resolve();
    let users = state.repo.list_users(skip, limit).await?;

    let mut responses = Vec::with_capacity(users.len());
    for user in users {
        let blogs = state.repo.list_blogs_by_owner(user.id).await?;
        responses.push(UserResponse::new(user, blogs));
    }
    Ok(Json(responses))
}

/// get_user_by_username
///
/// [Public Route] Looks a user up by their unique username.
#[utoipa::path(
    get,
    path = "/user/{username}",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "Found", body = UserResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .repo
        .get_user_by_username(&username)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;
    let blogs = state.repo.list_blogs_by_owner(user.id).await?;
    Ok(Json(UserResponse::new(user, blogs)))
}

/// get_user_by_id
///
/// [Public Route] Looks a user up by numeric id.
#[utoipa::path(
    get,
    path = "/userId/{user_id}",
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Found", body = UserResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_user_by_id(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .repo
        .get_user(user_id)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;
    let blogs = state.repo.list_blogs_by_owner(user.id).await?;
    Ok(Json(UserResponse::new(user, blogs)))
}

/// get_my_account
///
/// [Authenticated Route] Returns the profile of the identity resolved from the
/// bearer token.
#[utoipa::path(
    get,
    path = "/my-account/",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthenticated")
    )
)]
pub async fn get_my_account(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .repo
        .get_user(auth_user.id)
        .await?
        .ok_or(ApiError::Unauthenticated)?;
    let blogs = state.repo.list_blogs_by_owner(user.id).await?;
    Ok(Json(UserResponse::new(user, blogs)))
}

/// login
///
/// [Public Route] Exchanges username/password credentials for a bearer token.
/// Unknown usernames and wrong passwords are indistinguishable to the caller.
#[utoipa::path(
    post,
    path = "/token",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Bad credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state
        .repo
        .get_user_by_username(&payload.username)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    if !auth::verify_password(&payload.password, &user.hashed_password) {
        return Err(ApiError::Unauthenticated);
    }

    let token = auth::issue_token(user.id, &state.config)?;
    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
    }))
}

// --- Blog handlers ---

/// create_blog
///
/// [Authenticated Route] Creates a blog owned by the resolved identity. Both
/// timestamps are set to the current time by the insert.
#[utoipa::path(
    post,
    path = "/blog/",
    request_body = BlogPayload,
    responses((status = 200, description = "Created", body = BlogResponse))
)]
pub async fn create_blog(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<BlogPayload>,
) -> Result<Json<BlogResponse>, ApiError> {
    let blog = state.repo.create_blog(auth_user.id, &payload).await?;
    tracing::debug!(owner_id = auth_user.id, blog_id = blog.id, "blog created");
    Ok(Json(BlogResponse::new(blog, Vec::new())))
}

/// list_blogs
///
/// [Public Route] Lists blogs in the trimmed summary projection.
#[utoipa::path(
    get,
    path = "/blog/",
    params(Pagination),
    responses((status = 200, description = "Blogs", body = [BlogSummary]))
)]
pub async fn list_blogs(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<BlogSummary>>, ApiError> {
    let (skip, limit) = page.resolve();
    let blogs = state.repo.list_blogs(skip, limit).await?;
    Ok(Json(blogs.into_iter().map(BlogSummary::from).collect()))
}

/// get_blog
///
/// [Public Route] Full projection of a single blog, comments included.
#[utoipa::path(
    get,
    path = "/blog/{blog_id}",
    params(("blog_id" = i32, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Found", body = BlogResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_blog(
    State(state): State<AppState>,
    Path(blog_id): Path<i32>,
) -> Result<Json<BlogResponse>, ApiError> {
    let blog = state
        .repo
        .get_blog(blog_id)
        .await?
        .ok_or(ApiError::NotFound("Blog not found"))?;
    let comments = state.repo.list_comments_by_blog(blog.id).await?;
    Ok(Json(BlogResponse::new(blog, comments)))
}

/// update_blog
///
/// [Authenticated Route] Owner-only full-field overwrite. Existence is checked
/// first (404), then ownership (405), then the write refreshes `updated_at`.
#[utoipa::path(
    put,
    path = "/blog/{blog_id}",
    params(("blog_id" = i32, Path, description = "Blog ID")),
    request_body = BlogPayload,
    responses(
        (status = 200, description = "Updated", body = BlogResponse),
        (status = 404, description = "Not Found"),
        (status = 405, description = "Not the owner")
    )
)]
pub async fn update_blog(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(blog_id): Path<i32>,
    Json(payload): Json<BlogPayload>,
) -> Result<Json<BlogResponse>, ApiError> {
    let blog = state
        .repo
        .get_blog(blog_id)
        .await?
        .ok_or(ApiError::NotFound("Blog not found"))?;
    if blog.owner_id != auth_user.id {
        return Err(ApiError::NotAllowed(
            "Not allowed! you are not the owner of this blog",
        ));
    }

    let updated = state
        .repo
        .update_blog(blog_id, &payload)
        .await?
        .ok_or(ApiError::NotFound("Blog not found"))?;
    let comments = state.repo.list_comments_by_blog(updated.id).await?;
    Ok(Json(BlogResponse::new(updated, comments)))
}

/// delete_blog
///
/// [Authenticated Route] Owner-only hard delete; dependent comments and
/// category links are removed by the schema-level cascade. Returns the
/// deleted row.
#[utoipa::path(
    delete,
    path = "/blog/{blog_id}",
    params(("blog_id" = i32, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Deleted", body = Blog),
        (status = 404, description = "Not Found"),
        (status = 405, description = "Not the owner")
    )
)]
pub async fn delete_blog(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(blog_id): Path<i32>,
) -> Result<Json<Blog>, ApiError> {
    let blog = state
        .repo
        .get_blog(blog_id)
        .await?
        .ok_or(ApiError::NotFound("Blog not found"))?;
    if blog.owner_id != auth_user.id {
        return Err(ApiError::NotAllowed(
            "Not allowed! you are not the owner of this blog",
        ));
    }

    let deleted = state
        .repo
        .delete_blog(blog_id)
        .await?
        .ok_or(ApiError::NotFound("Blog not found"))?;
    tracing::debug!(blog_id, "blog deleted");
    Ok(Json(deleted))
}

// --- Comment handlers ---

/// list_comments
///
/// [Public Route] Global comment listing, paged by skip/limit.
#[utoipa::path(
    get,
    path = "/comment/",
    params(Pagination),
    responses((status = 200, description = "Comments", body = [Comment]))
)]
pub async fn list_comments(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let (skip, limit) = page.resolve();
    Ok(Json(state.repo.list_comments(skip, limit).await?))
}

/// get_comment
#[utoipa::path(
    get,
    path = "/comment/{comment_id}",
    params(("comment_id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Found", body = Comment),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<i32>,
) -> Result<Json<Comment>, ApiError> {
    let comment = state
        .repo
        .get_comment(comment_id)
        .await?
        .ok_or(ApiError::NotFound("Comment not found"))?;
    Ok(Json(comment))
}

/// update_comment
///
/// [Authenticated Route] Author-only content overwrite; refreshes `updated_at`.
/// The blog owner gets no special rights over other people's comments.
#[utoipa::path(
    put,
    path = "/comment/{comment_id}",
    params(("comment_id" = i32, Path, description = "Comment ID")),
    request_body = CommentPayload,
    responses(
        (status = 200, description = "Updated", body = Comment),
        (status = 404, description = "Not Found"),
        (status = 405, description = "Not the author")
    )
)]
pub async fn update_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<i32>,
    Json(payload): Json<CommentPayload>,
) -> Result<Json<Comment>, ApiError> {
    let comment = state
        .repo
        .get_comment(comment_id)
        .await?
        .ok_or(ApiError::NotFound("Comment not found"))?;
    if comment.user_id != auth_user.id {
        return Err(ApiError::NotAllowed(
            "Not allowed! you are not the owner of this comment",
        ));
    }

    let updated = state
        .repo
        .update_comment(comment_id, &payload)
        .await?
        .ok_or(ApiError::NotFound("Comment not found"))?;
    Ok(Json(updated))
}

/// delete_comment
///
/// [Authenticated Route] Author-only hard delete. Returns the deleted row.
#[utoipa::path(
    delete,
    path = "/comment/{comment_id}",
    params(("comment_id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Deleted", body = Comment),
        (status = 404, description = "Not Found"),
        (status = 405, description = "Not the author")
    )
)]
pub async fn delete_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<i32>,
) -> Result<Json<Comment>, ApiError> {
    let comment = state
        .repo
        .get_comment(comment_id)
        .await?
        .ok_or(ApiError::NotFound("Comment not found"))?;
    if comment.user_id != auth_user.id {
        return Err(ApiError::NotAllowed(
            "Not allowed! you are not the owner of this comment",
        ));
    }

    let deleted = state
        .repo
        .delete_comment(comment_id)
        .await?
        .ok_or(ApiError::NotFound("Comment not found"))?;
    Ok(Json(deleted))
}

/// list_blog_comments
///
/// [Public Route] All comments under one blog.
#[utoipa::path(
    get,
    path = "/blog/{blog_id}/comment/",
    params(("blog_id" = i32, Path, description = "Blog ID")),
    responses((status = 200, description = "Comments", body = [Comment]))
)]
pub async fn list_blog_comments(
    State(state): State<AppState>,
    Path(blog_id): Path<i32>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    Ok(Json(state.repo.list_comments_by_blog(blog_id).await?))
}

/// create_comment
///
/// [Authenticated Route] Posts a comment under an existing blog. Any
/// authenticated identity may comment, not just the blog owner.
#[utoipa::path(
    post,
    path = "/blog/{blog_id}/comment/",
    params(("blog_id" = i32, Path, description = "Blog ID")),
    request_body = CommentPayload,
    responses(
        (status = 200, description = "Created", body = Comment),
        (status = 404, description = "Blog not found")
    )
)]
pub async fn create_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(blog_id): Path<i32>,
    Json(payload): Json<CommentPayload>,
) -> Result<Json<Comment>, ApiError> {
    state
        .repo
        .get_blog(blog_id)
        .await?
        .ok_or(ApiError::NotFound("Blog not found"))?;

    let comment = state
        .repo
        .create_comment(blog_id, auth_user.id, &payload)
        .await?;
    Ok(Json(comment))
}

// --- Category handlers ---

/// list_categories
#[utoipa::path(
    get,
    path = "/category/",
    params(Pagination),
    responses((status = 200, description = "Categories", body = [Category]))
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let (skip, limit) = page.resolve();
    Ok(Json(state.repo.list_categories(skip, limit).await?))
}

/// get_category
#[utoipa::path(
    get,
    path = "/category/{category_id}",
    params(("category_id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Found", body = Category),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(category_id): Path<i32>,
) -> Result<Json<Category>, ApiError> {
    let category = state
        .repo
        .get_category(category_id)
        .await?
        .ok_or(ApiError::NotFound("Category not found"))?;
    Ok(Json(category))
}

/// get_category_by_name
#[utoipa::path(
    get,
    path = "/category/name/{name}",
    params(("name" = String, Path, description = "Category name")),
    responses(
        (status = 200, description = "Found", body = Category),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_category_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Category>, ApiError> {
    let category = state
        .repo
        .get_category_by_name(&name)
        .await?
        .ok_or(ApiError::NotFound("Category not found"))?;
    Ok(Json(category))
}

/// list_blog_categories
///
/// [Public Route] Categories attached to one blog.
#[utoipa::path(
    get,
    path = "/blog/{blog_id}/category/",
    params(("blog_id" = i32, Path, description = "Blog ID")),
    responses((status = 200, description = "Categories", body = [Category]))
)]
pub async fn list_blog_categories(
    State(state): State<AppState>,
    Path(blog_id): Path<i32>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.repo.list_categories_by_blog(blog_id).await?))
}

/// attach_category
///
/// [Authenticated Route] Tags a blog with a category by name; blog-owner only.
/// An unknown name creates the category implicitly via an atomic upsert, so a
/// concurrent attach of the same new name cannot create duplicates. Linking is
/// idempotent at the storage layer; a pre-existing link is reported as 405 to
/// match the upstream contract.
#[utoipa::path(
    post,
    path = "/blog/{blog_id}/category",
    params(("blog_id" = i32, Path, description = "Blog ID")),
    request_body = CategoryPayload,
    responses(
        (status = 200, description = "Linked", body = BlogCategory),
        (status = 404, description = "Blog not found"),
        (status = 405, description = "Not the owner, or already linked")
    )
)]
pub async fn attach_category(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(blog_id): Path<i32>,
    Json(payload): Json<CategoryPayload>,
) -> Result<Json<BlogCategory>, ApiError> {
    let blog = state
        .repo
        .get_blog(blog_id)
        .await?
        .ok_or(ApiError::NotFound("Blog not found"))?;
    if blog.owner_id != auth_user.id {
        return Err(ApiError::NotAllowed(
            "Not allowed! you are not the owner of this blog",
        ));
    }

    let category = state.repo.upsert_category(&payload.name).await?;
    if !state.repo.link_category(blog_id, category.id).await? {
        return Err(ApiError::NotAllowed(
            "This category already defined for this blog",
        ));
    }

    Ok(Json(BlogCategory {
        blog_id,
        category_id: category.id,
    }))
}

/// detach_category
///
/// [Authenticated Route] Removes a category link from a blog; blog-owner only.
/// A missing link is a conflict, reported as 405 like the duplicate case.
#[utoipa::path(
    delete,
    path = "/blog/{blog_id}/category/{category_id}",
    params(
        ("blog_id" = i32, Path, description = "Blog ID"),
        ("category_id" = i32, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Unlinked", body = BlogCategory),
        (status = 404, description = "Blog not found"),
        (status = 405, description = "Not the owner, or link missing")
    )
)]
pub async fn detach_category(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((blog_id, category_id)): Path<(i32, i32)>,
) -> Result<Json<BlogCategory>, ApiError> {
    let blog = state
        .repo
        .get_blog(blog_id)
        .await?
        .ok_or(ApiError::NotFound("Blog not found"))?;
    if blog.owner_id != auth_user.id {
        return Err(ApiError::NotAllowed(
            "Not allowed! you are not the owner of this blog",
        ));
    }

    if !state.repo.unlink_category(blog_id, category_id).await? {
        return Err(ApiError::NotAllowed(
            "This category not found for this blog",
        ));
    }

    Ok(Json(BlogCategory {
        blog_id,
        category_id,
    }))
}
