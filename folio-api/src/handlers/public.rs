//! Read model for the public site. Only published, visible content.

use super::{ok, JsonResult};
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use folio_core::content::{AboutPage, BlogIndex, HomePage, PostDetail, ProjectDetail, PublicProject};
use serde::Deserialize;

pub async fn home(State(state): State<AppState>) -> JsonResult<HomePage> {
    Ok(ok(state.content.public.home().await?))
}

pub async fn projects(State(state): State<AppState>) -> JsonResult<Vec<PublicProject>> {
    Ok(ok(state.content.public.projects().await?))
}

pub async fn project(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> JsonResult<ProjectDetail> {
    state
        .content
        .public
        .project(&slug)
        .await?
        .map(ok)
        .ok_or_else(|| ApiError::not_found("Project not found"))
}

#[derive(Debug, Default, Deserialize)]
pub struct BlogQuery {
    pub tag: Option<String>,
}

pub async fn blog(
    State(state): State<AppState>,
    Query(query): Query<BlogQuery>,
) -> JsonResult<BlogIndex> {
    let tag = query.tag.as_deref().filter(|t| !t.is_empty());
    Ok(ok(state.content.public.blog(tag).await?))
}

pub async fn post(State(state): State<AppState>, Path(slug): Path<String>) -> JsonResult<PostDetail> {
    state
        .content
        .public
        .post(&slug)
        .await?
        .map(ok)
        .ok_or_else(|| ApiError::not_found("Post not found"))
}

pub async fn about(State(state): State<AppState>) -> JsonResult<AboutPage> {
    Ok(ok(state.content.public.about().await?))
}
