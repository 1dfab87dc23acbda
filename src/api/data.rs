use axum::extract::State;
use axum::Json;

use super::{ApiResult, AppState};
use crate::crm::data::{self, Export, SeedOutcome};

pub async fn export(State(state): State<AppState>) -> ApiResult<Export> {
    let now = state.now();
    let export = state.with_db(move |conn| data::export_all(conn, now)).await?;
    Ok(Json(export))
}

pub async fn delete_all(State(state): State<AppState>) -> ApiResult<serde_json::Value> {
    let deleted = state.with_db(|conn| data::delete_all(conn)).await?;
    Ok(Json(serde_json::json!({
        "message": "All data deleted",
        "deleted": deleted,
    })))
}

pub async fn seed(State(state): State<AppState>) -> ApiResult<SeedOutcome> {
    let now = state.now();
    let outcome = state.with_db(move |conn| data::seed(conn, now)).await?;
    Ok(Json(outcome))
}
