//! Expo push notifications.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{http_client, IntegrationError};
use crate::config::PushConfig;
use crate::crm::types::PushToken;
use crate::health::reminders::Reminder;

const SERVICE: &str = "push relay";
const ANDROID_CHANNEL: &str = "touch-reminders";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    pub to: String,
    pub title: String,
    pub body: String,
    pub data: serde_json::Value,
    pub sound: Option<String>,
    pub channel_id: Option<String>,
}

/// Aggregate outcome of one send.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PushReceipt {
    pub accepted: usize,
    pub rejected: usize,
    /// Tokens the relay reported as no longer registered.
    pub unregistered: Vec<String>,
}

#[async_trait]
pub trait PushRelay: Send + Sync {
    async fn send(&self, messages: Vec<PushMessage>) -> Result<PushReceipt, IntegrationError>;
}

pub struct ExpoPush {
    client: reqwest::Client,
    endpoint: String,
    max_batch: usize,
}

impl ExpoPush {
    pub fn new(config: &PushConfig) -> Self {
        Self {
            client: http_client(30),
            endpoint: config.endpoint.clone(),
            max_batch: config.max_batch.max(1),
        }
    }
}

#[derive(Deserialize)]
struct ExpoResponse {
    #[serde(default)]
    data: Vec<ExpoTicket>,
}

#[derive(Deserialize)]
struct ExpoTicket {
    status: String,
    #[serde(default)]
    details: Option<ExpoTicketDetails>,
}

#[derive(Deserialize)]
struct ExpoTicketDetails {
    error: Option<String>,
}

#[async_trait]
impl PushRelay for ExpoPush {
    async fn send(&self, messages: Vec<PushMessage>) -> Result<PushReceipt, IntegrationError> {
        let mut receipt = PushReceipt::default();

        for batch in messages.chunks(self.max_batch) {
            let response = self
                .client
                .post(&self.endpoint)
                .header(reqwest::header::ACCEPT, "application/json")
                .json(batch)
                .send()
                .await
                .map_err(|e| IntegrationError::unavailable(SERVICE, e))?;

            let status = response.status();
            if !status.is_success() {
                tracing::error!(%status, batch = batch.len(), "push batch rejected");
                return Err(IntegrationError::unavailable(SERVICE, format!("HTTP {status}")));
            }

            let parsed: ExpoResponse = response
                .json()
                .await
                .map_err(|e| IntegrationError::unusable(SERVICE, e))?;

            // Tickets come back in message order.
            for (message, ticket) in batch.iter().zip(parsed.data.iter()) {
                if ticket.status == "ok" {
                    receipt.accepted += 1;
                    continue;
                }
                receipt.rejected += 1;
                let unregistered = ticket
                    .details
                    .as_ref()
                    .and_then(|d| d.error.as_deref())
                    == Some("DeviceNotRegistered");
                if unregistered {
                    receipt.unregistered.push(message.to.clone());
                }
            }
        }

        tracing::info!(
            accepted = receipt.accepted,
            rejected = receipt.rejected,
            "push notifications sent"
        );
        Ok(receipt)
    }
}

/// One notification per (device, reminder), at most `per_device` reminders
/// per device, most urgent first.
pub fn reminder_messages(
    tokens: &[PushToken],
    reminders: &[Reminder],
    per_device: usize,
) -> Vec<PushMessage> {
    tokens
        .iter()
        .flat_map(|token| {
            reminders.iter().take(per_device).map(move |r| PushMessage {
                to: token.token.clone(),
                title: format!("Touch: {}", r.contact_name),
                body: r.message.clone(),
                data: serde_json::json!({
                    "contactId": r.contact_id,
                    "type": "reminder",
                    "priority": r.priority,
                }),
                sound: Some("default".into()),
                channel_id: Some(ANDROID_CHANNEL.into()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::reminders::Priority;

    fn token(t: &str) -> PushToken {
        PushToken {
            token: t.into(),
            device_id: None,
            platform: Some("ios".into()),
            registered_at: "2026-03-15T12:00:00.000000Z".into(),
        }
    }

    fn reminder(id: &str, health: f64) -> Reminder {
        let priority = Priority::for_health(health);
        Reminder {
            id: format!("reminder-{id}"),
            contact_id: id.into(),
            contact_name: format!("Name {id}"),
            relationship_tag: "Friend".into(),
            avatar_color: "#457B9D".into(),
            message: priority.message(&format!("Name {id}")),
            health,
            days_overdue: 0,
            priority,
            status: "pending".into(),
        }
    }

    #[test]
    fn messages_fan_out_per_device_with_cap() {
        let tokens = vec![token("A"), token("B")];
        let reminders = vec![reminder("c1", 5.0), reminder("c2", 10.0), reminder("c3", 30.0)];
        let messages = reminder_messages(&tokens, &reminders, 2);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].to, "A");
        assert_eq!(messages[0].title, "Touch: Name c1");
        assert_eq!(messages[0].data["contactId"], "c1");
        assert_eq!(messages[0].data["priority"], "warm");
        assert_eq!(messages[3].to, "B");
        assert_eq!(messages[3].data["contactId"], "c2");
    }

    #[test]
    fn no_tokens_no_messages() {
        assert!(reminder_messages(&[], &[reminder("c1", 5.0)], 3).is_empty());
    }

    #[test]
    fn message_serializes_in_expo_shape() {
        let msg = &reminder_messages(&[token("T")], &[reminder("c1", 5.0)], 1)[0];
        let json = serde_json::to_value(msg).unwrap();
        assert_eq!(json["channelId"], "touch-reminders");
        assert_eq!(json["to"], "T");
    }
}
