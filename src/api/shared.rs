use axum::extract::State;
use axum::Json;

use super::{ApiResult, AppState};
use crate::crm::shared;
use crate::crm::types::{NewSharedInvite, SharedInvite};

pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewSharedInvite>,
) -> ApiResult<SharedInvite> {
    let now = state.now();
    let invite = state
        .with_db(move |conn| shared::create_invite(conn, &new, now))
        .await?;
    Ok(Json(invite))
}

pub async fn list(State(state): State<AppState>) -> ApiResult<serde_json::Value> {
    let invites = state.with_db(|conn| shared::list_invites(conn)).await?;
    Ok(Json(serde_json::json!({ "invites": invites })))
}
