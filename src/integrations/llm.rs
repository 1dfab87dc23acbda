//! Language-model features: interaction digests, call prep, relationship
//! insights, conversation prompts, and calendar time suggestions.
//!
//! [`LanguageModel`] is a single "system + user message in, text out" call.
//! The feature functions build the prompts and parse the JSON replies into
//! typed results.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{http_client, parse_json_reply, IntegrationError};
use crate::config::LlmConfig;
use crate::crm::types::{Contact, Interaction, InteractionDigest};

const SERVICE: &str = "language model";

/// Texts this short are not worth summarizing.
pub const MIN_SUMMARY_CHARS: usize = 10;

#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, IntegrationError>;
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiChat {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiChat {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            client: http_client(config.timeout_secs),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[async_trait]
impl LanguageModel for OpenAiChat {
    async fn complete(&self, system: &str, user: &str) -> Result<String, IntegrationError> {
        if self.api_key.is_empty() {
            return Err(IntegrationError::NotConfigured { service: SERVICE });
        }

        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.7,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| IntegrationError::unavailable(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(%status, "chat completion failed");
            return Err(IntegrationError::unavailable(
                SERVICE,
                format!("HTTP {status}: {}", truncate(&detail, 300)),
            ));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| IntegrationError::unusable(SERVICE, e))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| IntegrationError::unusable(SERVICE, "empty completion"))
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

const SUMMARY_SYSTEM: &str = "You are an empathetic assistant for a personal relationship tracker. \
Analyze the interaction notes and return a JSON object with:
- \"summary\": a brief 1-2 sentence summary
- \"key_highlights\": array of 2-3 key points discussed
- \"action_items\": array of follow-up actions
- \"emotional_cues\": array of emotional tones detected
- \"promises\": array of promises or commitments mentioned
- \"important_dates\": array of dates or events mentioned
Return ONLY valid JSON.";

/// Whether `text` is long enough to be summarized.
pub fn worth_summarizing(text: &str) -> bool {
    text.trim().chars().count() > MIN_SUMMARY_CHARS
}

/// Structured digest of one interaction's notes or transcript.
pub async fn summarize_interaction(
    llm: &dyn LanguageModel,
    text: &str,
) -> Result<InteractionDigest, IntegrationError> {
    let reply = llm
        .complete(SUMMARY_SYSTEM, &format!("Analyze this interaction: {text}"))
        .await?;
    let digest: InteractionDigest = parse_json_reply(SERVICE, &reply)?;
    if digest.summary.trim().is_empty() {
        return Err(IntegrationError::unusable(SERVICE, "digest without a summary"));
    }
    Ok(digest)
}

/// Brief for an upcoming call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallPrep {
    pub contact_name: String,
    pub recap: String,
    pub follow_ups: Vec<String>,
    pub important_dates: Vec<String>,
    pub conversation_starters: Vec<String>,
    pub emotional_note: String,
}

impl CallPrep {
    /// Brief for someone with no logged history; no model call needed.
    pub fn first_contact(contact_name: &str) -> Self {
        Self {
            contact_name: contact_name.to_string(),
            recap: "No previous interactions recorded yet.".into(),
            follow_ups: vec!["Get to know them better".into(), "Ask about their day".into()],
            important_dates: Vec::new(),
            conversation_starters: vec!["How have you been?".into(), "What's new with you?".into()],
            emotional_note: "This is a fresh connection. Be warm and open!".into(),
        }
    }
}

const CALL_PREP_SYSTEM: &str = "You are a warm, empathetic assistant for a personal relationship tracker. \
Generate a call preparation brief as a JSON object with:
- \"recap\": brief recap of the last conversation (1-2 sentences)
- \"follow_ups\": array of 2-3 follow-up topics
- \"important_dates\": array of upcoming dates or events
- \"conversation_starters\": array of 2-3 warm conversation starters
- \"emotional_note\": a brief note about the emotional context
Return ONLY valid JSON.";

/// Call brief from the most recent interactions (newest first, at most 5 used).
pub async fn call_prep(
    llm: &dyn LanguageModel,
    contact_name: &str,
    recent: &[Interaction],
) -> Result<CallPrep, IntegrationError> {
    if recent.is_empty() {
        return Ok(CallPrep::first_contact(contact_name));
    }

    let history = recent
        .iter()
        .take(5)
        .map(|i| {
            format!(
                "[{}] {} {}",
                i.created_at,
                i.notes.as_deref().unwrap_or(""),
                i.ai_summary.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let reply = llm
        .complete(
            CALL_PREP_SYSTEM,
            &format!("Prepare a call brief for {contact_name}. Recent interactions:\n{history}"),
        )
        .await?;
    let mut prep: CallPrep = parse_json_reply(SERVICE, &reply)?;
    prep.contact_name = contact_name.to_string();
    Ok(prep)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftAlert {
    pub contact_name: String,
    pub message: String,
}

/// Portfolio-level reading of all relationships.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipInsights {
    pub overall_insight: String,
    pub drift_alerts: Vec<DriftAlert>,
    pub category_balance: HashMap<String, serde_json::Value>,
    pub suggestions: Vec<String>,
    pub encouragement: String,
}

impl RelationshipInsights {
    pub fn no_contacts() -> Self {
        Self {
            overall_insight: "Add some contacts to start tracking your relationships!".into(),
            suggestions: vec!["Add your first contact to get started".into()],
            encouragement: "Every journey begins with a single step!".into(),
            ..Default::default()
        }
    }
}

const INSIGHTS_SYSTEM: &str = "You are a warm, empathetic assistant for a personal relationship tracker. \
Analyze the relationship data and return a JSON object with:
- \"overall_insight\": a warm, encouraging 2-sentence overview
- \"drift_alerts\": array of objects with \"contact_name\" and \"message\" for contacts showing drift
- \"category_balance\": object describing balance across relationship categories
- \"suggestions\": array of 3 actionable, gentle suggestions
- \"encouragement\": a warm, non-judgmental encouragement message
Return ONLY valid JSON.";

/// Insights over up to 20 contacts whose health is already computed.
pub async fn insights(
    llm: &dyn LanguageModel,
    contacts: &[Contact],
) -> Result<RelationshipInsights, IntegrationError> {
    if contacts.is_empty() {
        return Ok(RelationshipInsights::no_contacts());
    }

    let listing = contacts
        .iter()
        .take(20)
        .map(|c| {
            format!(
                "- {} ({}): last contact {}, every {} days, health {}%",
                c.name,
                c.relationship_tag,
                c.last_contact_at.as_deref().unwrap_or("never"),
                c.frequency_days,
                c.connection_health
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let reply = llm
        .complete(INSIGHTS_SYSTEM, &format!("Analyze these relationships:\n{listing}"))
        .await?;
    parse_json_reply(SERVICE, &reply)
}

/// Conversation openers for reaching out to one contact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationPrompts {
    pub prompts: Vec<String>,
    pub mode: String,
}

pub async fn conversation_prompts(
    llm: &dyn LanguageModel,
    contact: &Contact,
    recent: &[Interaction],
    mode: &str,
) -> Result<ConversationPrompts, IntegrationError> {
    let context = if recent.is_empty() {
        "No previous interactions".to_string()
    } else {
        recent
            .iter()
            .take(3)
            .filter_map(|i| i.notes.as_deref().or(i.ai_summary.as_deref()))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let system = format!(
        "Generate {mode} conversation prompts for reaching out to {} ({}). \
         Return a JSON array of 5 strings, each a warm conversation prompt. \
         Return ONLY a JSON array.",
        contact.name, contact.relationship_tag
    );
    let reply = llm
        .complete(&system, &format!("Recent context: {context}"))
        .await?;
    let prompts: Vec<String> = parse_json_reply(SERVICE, &reply)?;
    if prompts.is_empty() {
        return Err(IntegrationError::unusable(SERVICE, "no prompts returned"));
    }
    Ok(ConversationPrompts {
        prompts,
        mode: mode.to_string(),
    })
}

/// Length of a catch-up when the model does not propose one, in minutes.
pub const DEFAULT_CATCH_UP_MINUTES: u32 = 15;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSuggestion {
    pub day: String,
    pub time: String,
    pub reason: String,
}

/// Good moments to schedule the next catch-up with one contact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSuggestions {
    pub contact_name: String,
    pub suggested_times: Vec<TimeSuggestion>,
    /// Minutes.
    pub best_duration: u32,
    pub availability_tip: String,
}

const SUGGEST_TIMES_SYSTEM: &str = "You are a warm, empathetic assistant for a personal relationship tracker. \
Suggest when to schedule the next catch-up and return a JSON object with:
- \"suggested_times\": array of 2-3 objects with \"day\" (weekday name), \"time\" (e.g. \"7:00 PM\") and \"reason\"
- \"best_duration\": suggested length of the catch-up in whole minutes
- \"availability_tip\": one short tip about when they are likely to be free
Return ONLY valid JSON.";

/// Times to reach out, informed by when past interactions happened.
pub async fn suggest_times(
    llm: &dyn LanguageModel,
    contact: &Contact,
    recent: &[Interaction],
) -> Result<CalendarSuggestions, IntegrationError> {
    let history = if recent.is_empty() {
        "No previous interactions".to_string()
    } else {
        recent
            .iter()
            .take(10)
            .map(|i| format!("- {} at {}", i.interaction_type, i.created_at))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let reply = llm
        .complete(
            SUGGEST_TIMES_SYSTEM,
            &format!(
                "Suggest catch-up times for {} ({}), who should be contacted every {} days. \
                 Past interactions:\n{history}",
                contact.name, contact.relationship_tag, contact.frequency_days
            ),
        )
        .await?;
    let mut suggestions: CalendarSuggestions = parse_json_reply(SERVICE, &reply)?;
    suggestions
        .suggested_times
        .retain(|slot| !slot.day.trim().is_empty() && !slot.time.trim().is_empty());
    if suggestions.suggested_times.is_empty() {
        return Err(IntegrationError::unusable(SERVICE, "no suggested times returned"));
    }
    if suggestions.best_duration == 0 {
        suggestions.best_duration = DEFAULT_CATCH_UP_MINUTES;
    }
    suggestions.contact_name = contact.name.clone();
    Ok(suggestions)
}
