use super::{created, ok, page, JsonResult, Page, Reordered};
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::{JsonBody, MaybeUser};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use folio_core::content::{ProjectPageMeta, ProjectQuery};
use folio_core::validation::{ProjectInput, ReorderInput};
use folio_core::Project;

pub async fn list(
    State(state): State<AppState>,
    user: MaybeUser,
    Query(query): Query<ProjectQuery>,
) -> ApiResult<Json<Page<Vec<Project>, ProjectPageMeta>>> {
    if query.status()?.requires_auth() && !user.is_authenticated() {
        return Err(ApiError::unauthorized("Not authenticated"));
    }
    let result = state.content.projects.list(&query).await?;
    Ok(page(result.data, result.meta))
}

pub async fn get(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<String>,
) -> JsonResult<Project> {
    let project = state.content.projects.get(&id).await?;
    if !project.status.is_published() && !user.is_authenticated() {
        return Err(ApiError::unauthorized("Not authenticated"));
    }
    Ok(ok(project))
}

pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    JsonBody(input): JsonBody<ProjectInput>,
) -> ApiResult<(StatusCode, Json<super::Data<Project>>)> {
    let project = state.content.projects.create(input).await?;
    Ok(created(project))
}

pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<ProjectInput>,
) -> JsonResult<Project> {
    Ok(ok(state.content.projects.update(&id, input).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.content.projects.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reorder(
    State(state): State<AppState>,
    _user: AuthUser,
    JsonBody(input): JsonBody<ReorderInput>,
) -> JsonResult<Reordered> {
    let count = state.content.projects.reorder(&input).await?;
    Ok(ok(Reordered {
        success: true,
        count,
    }))
}
