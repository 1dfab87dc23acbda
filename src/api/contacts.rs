use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use super::{ApiResult, AppState};
use crate::crm::types::{Contact, ContactUpdate, NewContact};
use crate::crm::{contacts, premium};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub archived: bool,
    pub tag: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Contact>> {
    let now = state.now();
    let contacts = state
        .with_db(move |conn| {
            let tag = query.tag.as_deref().filter(|t| !t.is_empty());
            contacts::list_contacts(conn, query.archived, tag, now)
        })
        .await?;
    Ok(Json(contacts))
}

pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewContact>,
) -> ApiResult<Contact> {
    let now = state.now();
    let contact = state
        .with_db(move |conn| {
            premium::ensure_contact_capacity(conn, now)?;
            contacts::create_contact(conn, &new, now)
        })
        .await?;
    Ok(Json(contact))
}

pub async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Contact> {
    let now = state.now();
    let contact = state
        .with_db(move |conn| contacts::get_contact(conn, &id, now))
        .await?;
    Ok(Json(contact))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ContactUpdate>,
) -> ApiResult<Contact> {
    let now = state.now();
    let contact = state
        .with_db(move |conn| contacts::update_contact(conn, &id, &update, now))
        .await?;
    Ok(Json(contact))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<serde_json::Value> {
    state
        .with_db(move |conn| contacts::delete_contact(conn, &id))
        .await?;
    Ok(Json(serde_json::json!({ "message": "Contact deleted" })))
}
