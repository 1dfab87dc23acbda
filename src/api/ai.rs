use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use super::{ApiError, ApiResult, AppState};
use crate::crm::{contacts, interactions};
use crate::integrations::llm::{self, CalendarSuggestions, CallPrep, ConversationPrompts, RelationshipInsights};

pub async fn call_prep(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<CallPrep> {
    let now = state.now();
    let (contact, recent) = state
        .with_db(move |conn| {
            let contact = contacts::get_contact(conn, &id, now)?;
            let recent = interactions::list_for_contact(conn, &id, 5)?;
            Ok((contact, recent))
        })
        .await?;

    let prep = llm::call_prep(state.llm.as_ref(), &contact.name, &recent).await?;
    Ok(Json(prep))
}

pub async fn insights(State(state): State<AppState>) -> ApiResult<RelationshipInsights> {
    let now = state.now();
    let active = state
        .with_db(move |conn| contacts::list_active(conn, now))
        .await?;
    let insights = llm::insights(state.llm.as_ref(), &active).await?;
    Ok(Json(insights))
}

#[derive(Debug, Deserialize)]
pub struct PromptQuery {
    #[serde(default = "default_mode")]
    pub mode: String,
}

fn default_mode() -> String {
    "deep".into()
}

pub async fn prompts(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PromptQuery>,
) -> ApiResult<ConversationPrompts> {
    let mode = query.mode.trim().to_string();
    if mode.is_empty() || mode.len() > 40 {
        return Err(ApiError::BadRequest("mode must be a short word such as 'deep' or 'light'".into()));
    }

    let now = state.now();
    let (contact, recent) = state
        .with_db(move |conn| {
            let contact = contacts::get_contact(conn, &id, now)?;
            let recent = interactions::list_for_contact(conn, &id, 3)?;
            Ok((contact, recent))
        })
        .await?;

    let prompts = llm::conversation_prompts(state.llm.as_ref(), &contact, &recent, &mode).await?;
    Ok(Json(prompts))
}

pub async fn suggest_times(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<CalendarSuggestions> {
    let now = state.now();
    let (contact, recent) = state
        .with_db(move |conn| {
            let contact = contacts::get_contact(conn, &id, now)?;
            let recent = interactions::list_for_contact(conn, &id, 10)?;
            Ok((contact, recent))
        })
        .await?;

    let suggestions = llm::suggest_times(state.llm.as_ref(), &contact, &recent).await?;
    Ok(Json(suggestions))
}
