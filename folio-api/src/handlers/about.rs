//! Skills, experience, education and certifications share one set of
//! handlers, instantiated per collection in the router.

use super::{created, ok, page, Data, JsonResult, Page, Reordered, Total};
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::{JsonBody, MaybeUser};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use folio_core::content::{Collection, Content, Listed, SkillGroups, Visibility};
use folio_core::validation::{
    CertificationInput, EducationInput, EntityInput, ExperienceInput, ReorderInput, SkillInput,
};
use folio_core::Skill;
use serde::{Deserialize, Serialize};

/// Picks the collection an input type belongs to.
pub trait CollectionRoute: EntityInput + 'static {
    fn collection(content: &Content) -> &Collection<Self>;
}

impl CollectionRoute for SkillInput {
    fn collection(content: &Content) -> &Collection<Self> {
        &content.skills
    }
}

impl CollectionRoute for ExperienceInput {
    fn collection(content: &Content) -> &Collection<Self> {
        &content.experience
    }
}

impl CollectionRoute for EducationInput {
    fn collection(content: &Content) -> &Collection<Self> {
        &content.education
    }
}

impl CollectionRoute for CertificationInput {
    fn collection(content: &Content) -> &Collection<Self> {
        &content.certifications
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub visible: Option<String>,
    pub grouped: Option<String>,
}

impl ListQuery {
    fn visibility(&self, user: &MaybeUser) -> ApiResult<Visibility> {
        let visibility = Visibility::parse(self.visible.as_deref());
        if visibility.requires_auth() && !user.is_authenticated() {
            return Err(ApiError::unauthorized("Not authenticated"));
        }
        Ok(visibility)
    }
}

pub async fn list<I>(
    State(state): State<AppState>,
    user: MaybeUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Page<Vec<I::Entity>, Total>>>
where
    I: CollectionRoute,
    I::Entity: Listed,
{
    let visibility = query.visibility(&user)?;
    let items = I::collection(&state.content).list(visibility).await?;
    let total = items.len();
    Ok(page(items, Total { total }))
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SkillList {
    Flat(Vec<Skill>),
    Grouped(SkillGroups),
}

/// Like [`list`], plus `grouped=true` keyed by category.
pub async fn list_skills(
    State(state): State<AppState>,
    user: MaybeUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Page<SkillList, Total>>> {
    let visibility = query.visibility(&user)?;
    let skills = state.content.skills.list(visibility).await?;
    let total = skills.len();
    let data = if query.grouped.as_deref() == Some("true") {
        SkillList::Grouped(SkillGroups::from_skills(skills))
    } else {
        SkillList::Flat(skills)
    };
    Ok(page(data, Total { total }))
}

pub async fn get<I>(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<String>,
) -> JsonResult<I::Entity>
where
    I: CollectionRoute,
    I::Entity: Listed,
{
    let item = I::collection(&state.content).get(&id).await?;
    if !item.visible() && !user.is_authenticated() {
        return Err(ApiError::unauthorized("Not authenticated"));
    }
    Ok(ok(item))
}

pub async fn create<I>(
    State(state): State<AppState>,
    _user: AuthUser,
    JsonBody(input): JsonBody<I>,
) -> ApiResult<(StatusCode, Json<Data<I::Entity>>)>
where
    I: CollectionRoute,
    I::Entity: Listed,
{
    Ok(created(I::collection(&state.content).create(input).await?))
}

pub async fn update<I>(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<I>,
) -> JsonResult<I::Entity>
where
    I: CollectionRoute,
    I::Entity: Listed,
{
    Ok(ok(I::collection(&state.content).update(&id, input).await?))
}

pub async fn delete<I>(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode>
where
    I: CollectionRoute,
    I::Entity: Listed,
{
    I::collection(&state.content).delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reorder<I>(
    State(state): State<AppState>,
    _user: AuthUser,
    JsonBody(input): JsonBody<ReorderInput>,
) -> JsonResult<Reordered>
where
    I: CollectionRoute,
    I::Entity: Listed,
{
    let count = I::collection(&state.content).reorder(&input).await?;
    Ok(ok(Reordered {
        success: true,
        count,
    }))
}
