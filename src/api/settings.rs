use axum::extract::State;
use axum::Json;

use super::{ApiResult, AppState};
use crate::crm::settings;
use crate::crm::types::{Settings, SettingsUpdate};

pub async fn get_one(State(state): State<AppState>) -> ApiResult<Settings> {
    let current = state.with_db(|conn| settings::get_settings(conn)).await?;
    Ok(Json(current))
}

pub async fn update(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> ApiResult<Settings> {
    let updated = state
        .with_db(move |conn| settings::update_settings(conn, &update))
        .await?;
    Ok(Json(updated))
}
