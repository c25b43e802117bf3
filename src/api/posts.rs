// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::{Auth, OptionalAuth},
    error::AppError,
    models::{
        AccountId, CreatePostRequest, ListPostsQuery, NewPost, Post, PostChanges, PostId,
        UpdatePostRequest,
    },
    policy,
    state::AppState,
};

/// List the newest published posts.
#[utoipa::path(
    get,
    path = "/v1/posts",
    params(ListPostsQuery),
    tag = "Posts",
    responses((status = 200, body = [Post]))
)]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<Vec<Post>>, AppError> {
    Ok(Json(state.store.list_published(query.limit)?))
}

/// Create a post owned by the caller. New posts are unpublished.
#[utoipa::path(
    post,
    path = "/v1/posts",
    tag = "Posts",
    security(("bearer_auth" = [])),
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = Post),
        (status = 400, description = "Blank title or body"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_post(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    policy::validate_new_post(&request.title, &request.body)?;

    let post_id = state.store.create_post(NewPost {
        title: request.title,
        body: request.body,
        owner_id: user.account_id,
    })?;
    tracing::info!(post_id = %post_id, account_id = %user.account_id, "post created");

    let post = state.store.find_post(post_id)?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// Fetch one post.
///
/// Unpublished posts are only visible to their owner; everyone else gets
/// the same 404 as for a post that does not exist.
#[utoipa::path(
    get,
    path = "/v1/posts/{id}",
    params(("id" = u64, Path, description = "Post identifier")),
    tag = "Posts",
    security((), ("bearer_auth" = [])),
    responses(
        (status = 200, body = Post),
        (status = 404, description = "Post not found")
    )
)]
pub async fn get_post(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Path(post_id): Path<PostId>,
) -> Result<Json<Post>, AppError> {
    let post = state.store.find_post(post_id)?;
    let post = policy::authorize_read(post, user.map(|u| u.account_id))?;
    Ok(Json(post))
}

/// Partially update a post. Only the owner may do this.
#[utoipa::path(
    patch,
    path = "/v1/posts/{id}",
    params(("id" = u64, Path, description = "Post identifier")),
    tag = "Posts",
    security(("bearer_auth" = [])),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated post", body = Post),
        (status = 400, description = "Invalid field or unpublish attempt"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller does not own the post"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn update_post(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(post_id): Path<PostId>,
    Json(request): Json<UpdatePostRequest>,
) -> Result<Json<Post>, AppError> {
    let post = state.store.find_post(post_id)?;
    policy::authorize_mutation(&post, user.account_id)?;

    let mut changes = PostChanges::from(request);
    policy::validate_post_update(&post, &changes)?;

    // Only publishing is ever written; an explicit `false` on a draft is a no-op
    if changes.published == Some(false) {
        changes.published = None;
    }

    if changes.is_empty() {
        return Ok(Json(post));
    }

    let publishing = !post.published && changes.published == Some(true);
    state.store.update_post(post_id, changes)?;
    if publishing {
        tracing::info!(post_id = %post_id, "post published");
    }

    Ok(Json(state.store.find_post(post_id)?))
}

/// Delete a post. Only the owner may do this.
#[utoipa::path(
    delete,
    path = "/v1/posts/{id}",
    params(("id" = u64, Path, description = "Post identifier")),
    tag = "Posts",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller does not own the post"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn delete_post(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(post_id): Path<PostId>,
) -> Result<StatusCode, AppError> {
    let post = state.store.find_post(post_id)?;
    policy::authorize_mutation(&post, user.account_id)?;

    state.store.delete_post(post_id)?;
    tracing::info!(post_id = %post_id, account_id = %user.account_id, "post deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// List an account's posts. The owner also sees their unpublished posts.
#[utoipa::path(
    get,
    path = "/v1/accounts/{id}/posts",
    params(("id" = u64, Path, description = "Account identifier")),
    tag = "Posts",
    security((), ("bearer_auth" = [])),
    responses(
        (status = 200, body = [Post]),
        (status = 404, description = "Account not found")
    )
)]
pub async fn list_account_posts(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
) -> Result<Json<Vec<Post>>, AppError> {
    state.store.find_account(account_id)?;

    let is_owner = user.is_some_and(|u| u.account_id == account_id);
    Ok(Json(state.store.list_by_owner(account_id, is_owner)?))
}
