#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;
use touchbase::api::AppState;
use touchbase::config::TouchConfig;
use touchbase::crm::types::{Contact, NewContact, NewInteraction};
use touchbase::crm::{self, contacts, interactions};
use touchbase::db;
use touchbase::health::FixedClock;
use touchbase::integrations::llm::LanguageModel;
use touchbase::integrations::payment::Razorpay;
use touchbase::integrations::push::{PushMessage, PushReceipt, PushRelay};
use touchbase::integrations::speech::SpeechToText;
use touchbase::integrations::IntegrationError;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    db::open_memory_database().unwrap()
}

/// The instant every test treats as "now".
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-15T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Create a contact with the given cadence. Created 60 days before `now`.
pub fn add_contact(conn: &Connection, name: &str, frequency_days: i64, now: DateTime<Utc>) -> Contact {
    let new = NewContact {
        frequency_days,
        ..NewContact::named(name)
    };
    contacts::create_contact(conn, &new, now - Duration::days(60)).unwrap()
}

/// Log a plain note against `contact_id` at `at`.
pub fn log_touch(conn: &mut Connection, contact_id: &str, at: DateTime<Utc>) {
    let new = NewInteraction {
        contact_id: contact_id.to_string(),
        interaction_type: "call".into(),
        notes: None,
        voice_transcript: None,
        duration_minutes: None,
    };
    interactions::create_interaction(conn, &new, None, at).unwrap();
}

/// An in-memory contact record for pure scoring tests.
pub fn contact(name: &str, last_contact_at: Option<DateTime<Utc>>, frequency_days: i64) -> Contact {
    Contact {
        id: format!("id-{name}"),
        name: name.to_string(),
        phone: None,
        email: None,
        relationship_tag: "Friend".into(),
        frequency_days,
        is_pinned: false,
        is_archived: false,
        avatar_color: "#457B9D".into(),
        notes: None,
        last_contact_at: last_contact_at.map(crm::format_timestamp),
        interaction_count: 0,
        connection_health: 0.0,
        created_at: "2026-01-01T00:00:00.000000Z".into(),
        updated_at: "2026-01-01T00:00:00.000000Z".into(),
    }
}

/// Language model that answers every prompt with the same text, or fails.
pub struct CannedLlm {
    pub reply: Result<String, String>,
}

impl CannedLlm {
    pub fn replying(reply: &str) -> Self {
        Self { reply: Ok(reply.to_string()) }
    }

    pub fn failing(reason: &str) -> Self {
        Self { reply: Err(reason.to_string()) }
    }
}

#[async_trait]
impl LanguageModel for CannedLlm {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, IntegrationError> {
        self.reply
            .clone()
            .map_err(|reason| IntegrationError::unavailable("llm", reason))
    }
}

pub struct CannedSpeech(pub String);

#[async_trait]
impl SpeechToText for CannedSpeech {
    async fn transcribe(&self, _audio: Vec<u8>, _filename: &str) -> Result<String, IntegrationError> {
        Ok(self.0.clone())
    }
}

/// Push relay that accepts everything and records what it was asked to send.
#[derive(Default)]
pub struct RecordingPush {
    pub sent: Mutex<Vec<PushMessage>>,
    pub unregistered: Vec<String>,
}

#[async_trait]
impl PushRelay for RecordingPush {
    async fn send(&self, messages: Vec<PushMessage>) -> Result<PushReceipt, IntegrationError> {
        let rejected = messages
            .iter()
            .filter(|m| self.unregistered.contains(&m.to))
            .count();
        let receipt = PushReceipt {
            accepted: messages.len() - rejected,
            rejected,
            unregistered: self.unregistered.clone(),
        };
        self.sent.lock().unwrap().extend(messages);
        Ok(receipt)
    }
}

/// App state over `conn` with a frozen clock, a canned LLM, and payments in
/// test mode.
pub fn test_state(conn: Connection, llm: CannedLlm) -> AppState {
    test_state_with_push(conn, llm, Arc::new(RecordingPush::default()))
}

pub fn test_state_with_push(conn: Connection, llm: CannedLlm, push: Arc<RecordingPush>) -> AppState {
    let config = TouchConfig::default();
    AppState {
        db: Arc::new(Mutex::new(conn)),
        clock: Arc::new(FixedClock(fixed_now())),
        llm: Arc::new(llm),
        speech: Arc::new(CannedSpeech("Called mom about the trip".into())),
        payments: Arc::new(Razorpay::new(&config.payment)),
        push,
        config: Arc::new(config),
    }
}
