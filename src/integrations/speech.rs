//! Speech-to-text via a Whisper-compatible `/audio/transcriptions` endpoint.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use super::{http_client, IntegrationError};
use crate::config::SpeechConfig;

const SERVICE: &str = "speech-to-text";

#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe one uploaded recording.
    async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<String, IntegrationError>;
}

pub struct WhisperClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    language: String,
}

impl WhisperClient {
    pub fn new(config: &SpeechConfig, api_key: &str) -> Self {
        Self {
            client: http_client(120),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            language: config.language.clone(),
        }
    }
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Filename to send upstream; providers infer the audio format from its extension.
pub fn upload_name(original: Option<&str>) -> String {
    match original.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) if name.contains('.') => name.to_string(),
        Some(name) => format!("{name}.wav"),
        None => "recording.wav".into(),
    }
}

#[async_trait]
impl SpeechToText for WhisperClient {
    async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<String, IntegrationError> {
        if self.api_key.is_empty() {
            return Err(IntegrationError::NotConfigured { service: SERVICE });
        }

        let size = audio.len();
        let form = Form::new()
            .part("file", Part::bytes(audio).file_name(filename.to_string()))
            .text("model", self.model.clone())
            .text("response_format", "json")
            .text("language", self.language.clone());

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| IntegrationError::unavailable(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(%status, bytes = size, "transcription failed");
            return Err(IntegrationError::unavailable(SERVICE, format!("HTTP {status}")));
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| IntegrationError::unusable(SERVICE, e))?;

        tracing::info!(bytes = size, chars = parsed.text.len(), "audio transcribed");
        Ok(parsed.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_name_keeps_or_adds_extension() {
        assert_eq!(upload_name(Some("memo.m4a")), "memo.m4a");
        assert_eq!(upload_name(Some("memo")), "memo.wav");
        assert_eq!(upload_name(Some("  ")), "recording.wav");
        assert_eq!(upload_name(None), "recording.wav");
    }

    #[tokio::test]
    async fn missing_key_is_not_configured() {
        let client = WhisperClient::new(&SpeechConfig::default(), "");
        let err = client.transcribe(vec![0u8; 16], "a.wav").await.unwrap_err();
        assert!(matches!(err, IntegrationError::NotConfigured { .. }));
    }
}
