use super::{created, ok, page, Data, JsonResult, Page};
use crate::auth::AuthUser;
use crate::error::{codes, ApiError, ApiResult};
use crate::extract::{JsonBody, MaybeUser};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use folio_core::content::{PostPageMeta, PostQuery};
use folio_core::validation::BlogPostInput;
use folio_core::{BlogPost, BlogPostListItem};
use tracing::error;

pub async fn list(
    State(state): State<AppState>,
    user: MaybeUser,
    Query(query): Query<PostQuery>,
) -> ApiResult<Json<Page<Vec<BlogPostListItem>, PostPageMeta>>> {
    if query.status()?.requires_auth() && !user.is_authenticated() {
        return Err(ApiError::unauthorized("Not authenticated"));
    }
    let result = state.content.blog.list(&query).await?;
    Ok(page(result.data, result.meta))
}

pub async fn get(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<String>,
) -> JsonResult<BlogPost> {
    let post = state.content.blog.get(&id).await?;
    if !post.status.is_published() && !user.is_authenticated() {
        return Err(ApiError::unauthorized("Not authenticated"));
    }
    Ok(ok(post))
}

pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    JsonBody(input): JsonBody<BlogPostInput>,
) -> ApiResult<(StatusCode, Json<Data<BlogPost>>)> {
    Ok(created(state.content.blog.create(input).await?))
}

pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<BlogPostInput>,
) -> JsonResult<BlogPost> {
    Ok(ok(state.content.blog.update(&id, input).await?))
}

/// Removes the post's uploaded images, then the post.
pub async fn delete(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let post = state.content.blog.get(&id).await?;
    state
        .media
        .delete_folder(&format!("blog/{}/", post.id))
        .await
        .map_err(|e| {
            error!("Failed to delete images for post {}: {}", post.id, e);
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                codes::UPLOAD_ERROR,
                "Failed to delete post images",
            )
        })?;
    state.content.blog.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
