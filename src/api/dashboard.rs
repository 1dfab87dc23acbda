//! Read-only aggregate views: dashboard, pending reminders, widget.

use axum::extract::State;
use axum::Json;

use super::{ApiResult, AppState};
use crate::crm::{contacts, interactions, settings};
use crate::health::dashboard::{self, DashboardSummary, WidgetData};
use crate::health::reminders::{self, ReminderBatch};

pub async fn summary(State(state): State<AppState>) -> ApiResult<DashboardSummary> {
    let now = state.now();
    let summary = state
        .with_db(move |conn| {
            let active = contacts::list_active(conn, now)?;
            dashboard::summarize(&active, now, |since| interactions::count_since(conn, since))
        })
        .await?;
    tracing::debug!(
        total = summary.total_contacts,
        overall = summary.overall_score,
        "dashboard built"
    );
    Ok(Json(summary))
}

pub async fn pending_reminders(State(state): State<AppState>) -> ApiResult<ReminderBatch> {
    let now = state.now();
    let batch = state
        .with_db(move |conn| {
            let active = contacts::list_active(conn, now)?;
            let prefs = settings::get_settings(conn)?;
            Ok(reminders::select(&active, &prefs, now))
        })
        .await?;
    Ok(Json(batch))
}

pub async fn widget(State(state): State<AppState>) -> ApiResult<WidgetData> {
    let now = state.now();
    let data = state
        .with_db(move |conn| {
            let active = contacts::list_active(conn, now)?;
            Ok(dashboard::widget(&active, now))
        })
        .await?;
    Ok(Json(data))
}
