use super::{ok, page, JsonResult, Page};
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::extract::JsonBody;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use folio_core::content::{MessagePageMeta, MessageQuery};
use folio_core::validation::{MessageBulkUpdateInput, MessageUpdateInput};
use folio_core::ContactMessage;
use serde::Serialize;

pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<MessageQuery>,
) -> ApiResult<Json<Page<Vec<ContactMessage>, MessagePageMeta>>> {
    let result = state.content.messages.list(&query).await?;
    Ok(page(result.data, result.meta))
}

/// Opening a message marks it read.
pub async fn get(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> JsonResult<ContactMessage> {
    Ok(ok(state.content.messages.open(&id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<MessageUpdateInput>,
) -> JsonResult<ContactMessage> {
    Ok(ok(state.content.messages.update(&id, input).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.content.messages.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct BulkResult {
    pub count: usize,
}

pub async fn bulk_update(
    State(state): State<AppState>,
    _user: AuthUser,
    JsonBody(input): JsonBody<MessageBulkUpdateInput>,
) -> JsonResult<BulkResult> {
    let count = state.content.messages.bulk_update(input).await?;
    Ok(ok(BulkResult { count }))
}
