use super::{ok, JsonResult};
use crate::auth::AuthUser;
use crate::extract::JsonBody;
use crate::state::AppState;
use axum::extract::State;
use folio_core::validation::{HeroInput, SiteSettingsInput};
use folio_core::{Hero, SiteSettings};

pub async fn get_hero(State(state): State<AppState>) -> JsonResult<Hero> {
    Ok(ok(state.content.site.hero().await?))
}

pub async fn put_hero(
    State(state): State<AppState>,
    _user: AuthUser,
    JsonBody(input): JsonBody<HeroInput>,
) -> JsonResult<Hero> {
    Ok(ok(state.content.site.put_hero(input).await?))
}

pub async fn get_settings(State(state): State<AppState>) -> JsonResult<SiteSettings> {
    Ok(ok(state.content.site.settings().await?))
}

pub async fn put_settings(
    State(state): State<AppState>,
    _user: AuthUser,
    JsonBody(input): JsonBody<SiteSettingsInput>,
) -> JsonResult<SiteSettings> {
    Ok(ok(state.content.site.put_settings(input).await?))
}
