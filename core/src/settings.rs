//! Scoring settings: API credential and model name.
//!
//! Kept in the same key-value store as the records, under their own keys. An
//! environment variable can supply the credential without persisting it.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::advisory::GeminiScorer;
use crate::config::AdvisoryConfig;
use crate::notice::Notice;
use crate::storage::KeyValueStore;
use crate::storage::StorageError;

pub const API_KEY_KEY: &str = "geminiApiKey";
pub const MODEL_KEY: &str = "geminiModel";

/// Overrides the stored credential when set and non-empty.
pub const API_KEY_ENV: &str = "ENGINE_ROOM_GEMINI_API_KEY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringCredentials {
    pub api_key: String,
    pub model: String,
}

pub struct Settings {
    kv: Arc<dyn KeyValueStore>,
    default_model: String,
}

impl Settings {
    pub fn new(kv: Arc<dyn KeyValueStore>, default_model: impl Into<String>) -> Self {
        Self {
            kv,
            default_model: default_model.into(),
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.kv.get(key) {
            Ok(value) => value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!("failed to read setting {key}: {e}");
                None
            }
        }
    }

    pub fn stored_api_key(&self) -> Option<String> {
        self.read(API_KEY_KEY)
    }

    /// Stored model, else the configured default.
    pub fn model(&self) -> String {
        self.read(MODEL_KEY)
            .unwrap_or_else(|| self.default_model.clone())
    }

    /// Credentials from storage only.
    pub fn credentials(&self) -> Option<ScoringCredentials> {
        self.stored_api_key().map(|api_key| ScoringCredentials {
            api_key,
            model: self.model(),
        })
    }

    /// Credentials with the environment override applied.
    pub fn resolve_credentials(&self) -> Option<ScoringCredentials> {
        let from_env = std::env::var(API_KEY_ENV)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        match from_env {
            Some(api_key) => Some(ScoringCredentials {
                api_key,
                model: self.model(),
            }),
            None => self.credentials(),
        }
    }

    /// Persist a credential and model. An empty key clears both.
    pub fn save(&self, api_key: &str, model: Option<&str>) -> Result<Notice, StorageError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return self.clear();
        }
        let model = model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(self.default_model.as_str());
        self.kv.set(API_KEY_KEY, api_key)?;
        self.kv.set(MODEL_KEY, model)?;
        tracing::info!("scoring settings saved (model {model})");
        Ok(Notice::success(format!("Settings Saved. Model: {model}")))
    }

    /// Remove the credential and model; scoring reverts to simulation.
    pub fn clear(&self) -> Result<Notice, StorageError> {
        self.kv.remove(API_KEY_KEY)?;
        self.kv.remove(MODEL_KEY)?;
        tracing::info!("scoring settings cleared");
        Ok(Notice::info("API Key removed. Reverting to Simulation Mode."))
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }
}

/// Check a credential (not necessarily saved) with a one-word request.
pub async fn test_connection(
    config: &AdvisoryConfig,
    api_key: &str,
    model: Option<&str>,
    cancel: &CancellationToken,
) -> Notice {
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Notice::error("Please enter an API Key first.");
    }
    let model = model
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(config.default_model.as_str());
    let credentials = ScoringCredentials {
        api_key: api_key.to_string(),
        model: model.to_string(),
    };
    let scorer = match GeminiScorer::new(config, credentials) {
        Ok(scorer) => scorer,
        Err(e) => return Notice::error(format!("Connection Failed: {e}")),
    };
    let result = tokio::select! {
        _ = cancel.cancelled() => return Notice::info("Connection test cancelled"),
        result = scorer.ping() => result,
    };
    match result {
        Ok(()) => Notice::success("Connection Successful"),
        Err(e) => {
            tracing::warn!("connection test failed: {e}");
            Notice::error(format!("Connection Failed: {e}"))
        }
    }
}
