use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Razorpay key id shipped in the default config. Orders created with it never
/// leave the process.
pub const PLACEHOLDER_KEY_ID: &str = "rzp_test_PLACEHOLDER";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TouchConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub llm: LlmConfig,
    pub speech: SpeechConfig,
    pub payment: PaymentConfig,
    pub push: PushConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// Allowed CORS origins. `["*"]` allows any origin.
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API (`/chat/completions` is appended).
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SpeechConfig {
    /// Base URL of a Whisper-compatible API (`/audio/transcriptions` is appended).
    pub base_url: String,
    /// Falls back to `llm.api_key` when empty.
    pub api_key: String,
    pub model: String,
    pub language: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PaymentConfig {
    pub key_id: String,
    pub key_secret: String,
    pub api_base: String,
    pub currency: String,
    pub subscription_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PushConfig {
    pub endpoint: String,
    /// Maximum messages per request to the push relay.
    pub max_batch: usize,
    /// How many of the most urgent reminders are pushed per device.
    pub reminders_per_device: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8001,
            log_level: "info".into(),
            cors_origins: vec!["*".into()],
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_touchbase_dir()
            .join("touchbase.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            api_key: String::new(),
            model: "gpt-4o-mini".into(),
            timeout_secs: 30,
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            api_key: String::new(),
            model: "whisper-1".into(),
            language: "en".into(),
        }
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            key_id: PLACEHOLDER_KEY_ID.into(),
            key_secret: String::new(),
            api_base: "https://api.razorpay.com/v1".into(),
            currency: "INR".into(),
            subscription_days: 30,
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://exp.host/--/api/v2/push/send".into(),
            max_batch: 100,
            reminders_per_device: 3,
        }
    }
}

impl PaymentConfig {
    /// Test mode: no real key configured, orders and verifications are simulated.
    pub fn test_mode(&self) -> bool {
        self.key_id == PLACEHOLDER_KEY_ID || self.key_secret.is_empty()
    }
}

/// Returns `~/.touchbase/`
pub fn default_touchbase_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".touchbase")
}

/// Returns the default config file path: `~/.touchbase/config.toml`
pub fn default_config_path() -> PathBuf {
    default_touchbase_dir().join("config.toml")
}

impl TouchConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            TouchConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `TOUCHBASE_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("TOUCHBASE_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("TOUCHBASE_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("TOUCHBASE_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("TOUCHBASE_PORT") {
            match val.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %val, "ignoring invalid TOUCHBASE_PORT"),
            }
        }
        if let Ok(val) = std::env::var("TOUCHBASE_LLM_KEY") {
            self.llm.api_key = val;
        }
        if let Ok(val) = std::env::var("TOUCHBASE_RAZORPAY_KEY_ID") {
            self.payment.key_id = val;
        }
        if let Ok(val) = std::env::var("TOUCHBASE_RAZORPAY_KEY_SECRET") {
            self.payment.key_secret = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    /// Key used for speech-to-text, falling back to the LLM key.
    pub fn speech_api_key(&self) -> &str {
        if self.speech.api_key.is_empty() {
            &self.llm.api_key
        } else {
            &self.speech.api_key
        }
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = TouchConfig::default();
        assert_eq!(config.server.port, 8001);
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.server.cors_origins, vec!["*".to_string()]);
        assert!(config.storage.db_path.ends_with("touchbase.db"));
        assert_eq!(config.payment.currency, "INR");
        assert!(config.payment.test_mode());
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
log_level = "debug"
port = 9000

[storage]
db_path = "/tmp/test.db"

[llm]
model = "gpt-4.1"
"#;
        let config: TouchConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.storage.db_path, "/tmp/test.db");
        assert_eq!(config.llm.model, "gpt-4.1");
        // defaults still apply for unset fields
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.llm.timeout_secs, 30);
        assert_eq!(config.push.max_batch, 100);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = TouchConfig::default();
        std::env::set_var("TOUCHBASE_DB", "/tmp/override.db");
        std::env::set_var("TOUCHBASE_LOG_LEVEL", "trace");
        std::env::set_var("TOUCHBASE_PORT", "not-a-port");

        config.apply_env_overrides();

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.server.log_level, "trace");
        assert_eq!(config.server.port, 8001);

        // Clean up
        std::env::remove_var("TOUCHBASE_DB");
        std::env::remove_var("TOUCHBASE_LOG_LEVEL");
        std::env::remove_var("TOUCHBASE_PORT");
    }

    #[test]
    fn speech_key_falls_back_to_llm_key() {
        let mut config = TouchConfig::default();
        config.llm.api_key = "llm-key".into();
        assert_eq!(config.speech_api_key(), "llm-key");
        config.speech.api_key = "stt-key".into();
        assert_eq!(config.speech_api_key(), "stt-key");
    }

    #[test]
    fn real_payment_keys_leave_test_mode() {
        let mut config = PaymentConfig::default();
        config.key_id = "rzp_live_abc".into();
        config.key_secret = "secret".into();
        assert!(!config.test_mode());
    }
}
