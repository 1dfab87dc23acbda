use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use super::{ApiError, ApiResult, AppState};
use crate::crm::goals;
use crate::crm::types::{Goal, GoalStatus, NewGoal};

fn parse_status(raw: &str) -> Result<GoalStatus, ApiError> {
    raw.parse::<GoalStatus>().map_err(ApiError::BadRequest)
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// A status, or `all`. Defaults to `active`.
    pub status: Option<String>,
}

pub async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult<Vec<Goal>> {
    let status = match query.status.as_deref() {
        None => Some(GoalStatus::Active),
        Some("all") => None,
        Some(raw) => Some(parse_status(raw)?),
    };
    let rows = state
        .with_db(move |conn| goals::list_goals(conn, status))
        .await?;
    Ok(Json(rows))
}

pub async fn create(State(state): State<AppState>, Json(new): Json<NewGoal>) -> ApiResult<Goal> {
    let now = state.now();
    let goal = state
        .with_db(move |conn| goals::create_goal(conn, &new, now))
        .await?;
    Ok(Json(goal))
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuery {
    pub progress: Option<f64>,
    pub status: Option<String>,
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<UpdateQuery>,
) -> ApiResult<Goal> {
    let status = query.status.as_deref().map(parse_status).transpose()?;
    let progress = query.progress;
    let goal = state
        .with_db(move |conn| goals::update_goal(conn, &id, progress, status))
        .await?;
    Ok(Json(goal))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<serde_json::Value> {
    state.with_db(move |conn| goals::delete_goal(conn, &id)).await?;
    Ok(Json(serde_json::json!({ "message": "Goal deleted" })))
}
