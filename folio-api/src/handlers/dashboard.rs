use super::{ok, JsonResult};
use crate::auth::AuthUser;
use crate::state::AppState;
use axum::extract::State;
use folio_core::content::DashboardSummary;

pub async fn summary(State(state): State<AppState>, _user: AuthUser) -> JsonResult<DashboardSummary> {
    Ok(ok(state.content.dashboard.summary().await?))
}
