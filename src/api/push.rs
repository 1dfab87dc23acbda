use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::{ApiResult, AppState};
use crate::crm::{contacts, push_tokens, settings};
use crate::health::reminders;
use crate::integrations::push::reminder_messages;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub token: String,
    pub device_id: Option<String>,
    pub platform: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<serde_json::Value> {
    let now = state.now();
    let token = state
        .with_db(move |conn| {
            push_tokens::register(
                conn,
                &req.token,
                req.device_id.as_deref(),
                req.platform.as_deref(),
                now,
            )
        })
        .await?;
    Ok(Json(serde_json::json!({ "registered": true, "token": token.token })))
}

/// Push the current reminders to every registered device.
pub async fn send_reminders(State(state): State<AppState>) -> ApiResult<serde_json::Value> {
    let now = state.now();
    let (tokens, batch) = state
        .with_db(move |conn| {
            let tokens = push_tokens::list(conn)?;
            let active = contacts::list_active(conn, now)?;
            let prefs = settings::get_settings(conn)?;
            Ok((tokens, reminders::select(&active, &prefs, now)))
        })
        .await?;

    if tokens.is_empty() {
        return Ok(Json(serde_json::json!({
            "sent": 0,
            "message": "No registered devices",
        })));
    }
    if batch.reminders.is_empty() {
        return Ok(Json(serde_json::json!({
            "sent": 0,
            "message": "All connections are healthy",
        })));
    }

    let per_device = state.config.push.reminders_per_device.max(1);
    let contacts_notified = batch.reminders.len().min(per_device);
    let messages = reminder_messages(&tokens, &batch.reminders, per_device);
    let receipt = state.push.send(messages).await?;

    if !receipt.unregistered.is_empty() {
        let stale = receipt.unregistered.clone();
        state
            .with_db(move |conn| push_tokens::remove(conn, &stale))
            .await?;
    }

    Ok(Json(serde_json::json!({
        "sent": receipt.accepted,
        "failed": receipt.rejected,
        "contacts_notified": contacts_notified,
        "devices": tokens.len(),
    })))
}
