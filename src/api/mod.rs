//! JSON HTTP API under `/api`.
//!
//! Handlers capture `now` once from the injected [`Clock`], run storage work
//! on the blocking pool against the shared connection, and call integrations
//! from async context.

pub mod ai;
pub mod contacts;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod goals;
pub mod interactions;
pub mod payments;
pub mod push;
pub mod settings;
pub mod shared;

use std::sync::{Arc, Mutex};

use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::config::TouchConfig;
use crate::crm;
use crate::health::{Clock, SystemClock};
use crate::integrations::llm::{LanguageModel, OpenAiChat};
use crate::integrations::payment::{PaymentGateway, Razorpay};
use crate::integrations::push::{ExpoPush, PushRelay};
use crate::integrations::speech::{SpeechToText, WhisperClient};
pub use error::ApiError;

pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// Everything a handler needs. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: Arc<TouchConfig>,
    pub clock: Arc<dyn Clock>,
    pub llm: Arc<dyn LanguageModel>,
    pub speech: Arc<dyn SpeechToText>,
    pub payments: Arc<dyn PaymentGateway>,
    pub push: Arc<dyn PushRelay>,
}

impl AppState {
    /// State wired to the real clock and the configured HTTP integrations.
    pub fn from_config(conn: Connection, config: TouchConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            clock: Arc::new(SystemClock),
            llm: Arc::new(OpenAiChat::new(&config.llm)),
            speech: Arc::new(WhisperClient::new(&config.speech, config.speech_api_key())),
            payments: Arc::new(Razorpay::new(&config.payment)),
            push: Arc::new(ExpoPush::new(&config.push)),
            config: Arc::new(config),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Run storage work on the blocking pool with the connection locked.
    pub async fn with_db<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> crm::Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let mut conn = db
                .lock()
                .map_err(|e| ApiError::Internal(format!("db lock poisoned: {e}")))?;
            f(&mut conn).map_err(ApiError::from)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("db task failed: {e}")))?
    }
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "message": "Touch API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// All routes, under `/api`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api", get(root))
        .route("/api/", get(root))
        .route("/api/contacts", get(contacts::list).post(contacts::create))
        .route(
            "/api/contacts/{id}",
            get(contacts::get_one)
                .put(contacts::update)
                .delete(contacts::delete),
        )
        .route("/api/interactions", post(interactions::create))
        .route("/api/interactions/{contact_id}", get(interactions::list))
        .route("/api/voice/transcribe", post(interactions::transcribe))
        .route("/api/ai/call-prep/{id}", get(ai::call_prep))
        .route("/api/ai/insights", get(ai::insights))
        .route("/api/ai/prompts/{id}", get(ai::prompts))
        .route("/api/calendar/suggest-times/{id}", get(ai::suggest_times))
        .route("/api/dashboard", get(dashboard::summary))
        .route("/api/notifications/pending", get(dashboard::pending_reminders))
        .route("/api/widget/data", get(dashboard::widget))
        .route("/api/goals", get(goals::list).post(goals::create))
        .route("/api/goals/{id}", put(goals::update).delete(goals::delete))
        .route("/api/settings", get(settings::get_one).put(settings::update))
        .route("/api/premium/status", get(payments::premium_status))
        .route("/api/premium/upgrade", put(payments::upgrade))
        .route("/api/payment/create-order", post(payments::create_order))
        .route("/api/payment/verify", post(payments::verify))
        .route("/api/payment/subscription", get(payments::subscription))
        .route("/api/payment/cancel", post(payments::cancel))
        .route("/api/push/register", post(push::register))
        .route("/api/push/send-reminders", post(push::send_reminders))
        .route("/api/shared/invite", post(shared::create))
        .route("/api/shared/invites", get(shared::list))
        .route("/api/data/export", get(data::export))
        .route("/api/data/delete-all", delete(data::delete_all))
        .route("/api/seed", post(data::seed))
        .with_state(state)
}
