//! Post handlers for the Web API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::blog::{BlogService, GroupRepository, Post};
use crate::db::{DbPool, UserRepository};
use crate::web::dto::{
    ApiResponse, AuthorInfo, CreatePostRequest, GroupInfo, PaginatedResponse, PaginationQuery,
    PostResponse, UpdatePostRequest,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::{AuthUser, OptionalAuthUser};

/// Build a post response with embedded author and group info.
///
/// `requester` is the authenticated user, if any; it drives the `can_edit`
/// flag so clients know whether to offer the edit affordance.
async fn post_response(pool: &DbPool, post: Post, requester: Option<i64>) -> PostResponse {
    let author = UserRepository::new(pool)
        .get_by_id(post.author_id)
        .await
        .ok()
        .flatten()
        .map(|u| AuthorInfo {
            id: u.id,
            username: u.username,
            nickname: u.nickname,
        })
        .unwrap_or_else(|| AuthorInfo {
            id: post.author_id,
            username: "unknown".to_string(),
            nickname: "Unknown".to_string(),
        });

    let group = match post.group_id {
        Some(group_id) => GroupRepository::new(pool)
            .get_by_id(group_id)
            .await
            .ok()
            .flatten()
            .map(|g| GroupInfo {
                id: g.id,
                title: g.title,
                slug: g.slug,
            }),
        None => None,
    };

    let can_edit = requester.map(|id| post.can_edit(id)).unwrap_or(false);

    PostResponse {
        id: post.id,
        text: post.text,
        author,
        group,
        can_edit,
        created_at: post.created_at,
    }
}

/// Build post responses for a whole page.
async fn post_responses(
    pool: &DbPool,
    posts: Vec<Post>,
    requester: Option<i64>,
) -> Vec<PostResponse> {
    let mut responses = Vec::with_capacity(posts.len());
    for post in posts {
        responses.push(post_response(pool, post, requester).await);
    }
    responses
}

/// GET /api/posts - List all posts, newest first.
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(auth): OptionalAuthUser,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<PostResponse>>, ApiError> {
    let service = BlogService::new(&state.db, &state.listing);
    let page = service.list_all(pagination.page()).await?;

    let requester = auth.map(|c| c.sub);
    let data = post_responses(state.db.pool(), page.items, requester).await;
    Ok(Json(PaginatedResponse::new(
        data,
        page.page,
        page.page_size,
        page.total as u64,
    )))
}

/// GET /api/groups/:slug/posts - List posts in a group.
pub async fn list_group_posts(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(auth): OptionalAuthUser,
    Path(slug): Path<String>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<PostResponse>>, ApiError> {
    let service = BlogService::new(&state.db, &state.listing);
    let (_group, page) = service.list_by_group(&slug, pagination.page()).await?;

    let requester = auth.map(|c| c.sub);
    let data = post_responses(state.db.pool(), page.items, requester).await;
    Ok(Json(PaginatedResponse::new(
        data,
        page.page,
        page.page_size,
        page.total as u64,
    )))
}

/// GET /api/users/:username/posts - List posts by an author.
pub async fn list_author_posts(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(auth): OptionalAuthUser,
    Path(username): Path<String>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<PostResponse>>, ApiError> {
    let service = BlogService::new(&state.db, &state.listing);
    let (_author, page) = service.list_by_author(&username, pagination.page()).await?;

    let requester = auth.map(|c| c.sub);
    let data = post_responses(state.db.pool(), page.items, requester).await;
    Ok(Json(PaginatedResponse::new(
        data,
        page.page,
        page.page_size,
        page.total as u64,
    )))
}

/// GET /api/posts/:id - Get a single post.
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(auth): OptionalAuthUser,
    Path(post_id): Path<i64>,
) -> Result<Json<ApiResponse<PostResponse>>, ApiError> {
    let service = BlogService::new(&state.db, &state.listing);
    let post = service.get_post(post_id).await?;

    let requester = auth.map(|c| c.sub);
    let response = post_response(state.db.pool(), post, requester).await;
    Ok(Json(ApiResponse::new(response)))
}

/// POST /api/posts - Create a new post.
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Json(req): Json<CreatePostRequest>,
) -> Result<Json<ApiResponse<PostResponse>>, ApiError> {
    req.validate().map_err(ApiError::from_validation_errors)?;

    let service = BlogService::new(&state.db, &state.listing);
    let post = service
        .create_post(claims.sub, &req.text, req.group_id)
        .await?;

    tracing::info!(post_id = post.id, author = %claims.username, "Post created");

    let response = post_response(state.db.pool(), post, Some(claims.sub)).await;
    Ok(Json(ApiResponse::new(response)))
}

/// PUT /api/posts/:id - Edit an existing post.
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(post_id): Path<i64>,
    Json(req): Json<UpdatePostRequest>,
) -> Result<Json<ApiResponse<PostResponse>>, ApiError> {
    req.validate().map_err(ApiError::from_validation_errors)?;

    let service = BlogService::new(&state.db, &state.listing);
    let post = service
        .edit_post(post_id, Some(claims.sub), &req.text, req.group_id)
        .await?;

    tracing::info!(post_id = post.id, author = %claims.username, "Post updated");

    let response = post_response(state.db.pool(), post, Some(claims.sub)).await;
    Ok(Json(ApiResponse::new(response)))
}
