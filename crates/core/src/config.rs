//! Engine configuration.
//!
//! Everything can be loaded from a JSON file; missing keys keep their
//! defaults. Command-line flags are applied on top by the CLI.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::reflow::ReflowPolicy;

/// How paragraphs are fed to the translator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationOptions {
    /// Paragraphs translated at the same time. 1 means strictly sequential.
    pub concurrency: usize,
    /// Pause between two batches, in milliseconds. Not applied after the last batch.
    pub inter_batch_delay_ms: u64,
    /// Capacity of the progress channel created by the CLI.
    pub progress_capacity: usize,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            inter_batch_delay_ms: 1200,
            progress_capacity: 32,
        }
    }
}

impl TranslationOptions {
    /// Batch size, never zero.
    pub fn batch_size(&self) -> usize {
        self.concurrency.max(1)
    }

    pub fn inter_batch_delay(&self) -> Duration {
        Duration::from_millis(self.inter_batch_delay_ms)
    }

    /// Options without any pause, for tests and local providers.
    pub fn immediate(concurrency: usize) -> Self {
        Self {
            concurrency,
            inter_batch_delay_ms: 0,
            ..Self::default()
        }
    }
}

/// A forced translation for one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryItem {
    pub term: String,
    pub translation: String,
}

/// Connection settings for an OpenAI-compatible chat completion service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL up to and including the API version, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    pub model: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    /// Language name put into the prompt, e.g. "Simplified Chinese".
    pub target_language: String,
    pub glossary: Vec<GlossaryItem>,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Attempts for retryable failures.
    pub max_retries: u32,
    /// First backoff delay in milliseconds; doubled on every attempt.
    pub retry_base_delay_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: String::new(),
            target_language: "English".to_string(),
            glossary: Vec::new(),
            temperature: 0.1,
            timeout_secs: 120,
            max_retries: 7,
            retry_base_delay_ms: 2000,
        }
    }
}

/// Complete configuration of a translation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub translation: TranslationOptions,
    pub reflow: ReflowPolicy,
    pub provider: ProviderConfig,
}

impl EngineConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sequential_with_delay() {
        let options = TranslationOptions::default();
        assert_eq!(options.concurrency, 1);
        assert_eq!(options.inter_batch_delay(), Duration::from_millis(1200));
    }

    #[test]
    fn test_zero_concurrency_still_makes_progress() {
        let options = TranslationOptions::immediate(0);
        assert_eq!(options.batch_size(), 1);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(
            r#"{
                "translation": { "concurrency": 4 },
                "provider": {
                    "model": "llama3",
                    "glossary": [{ "term": "Deck", "translation": "演示文稿" }]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.translation.concurrency, 4);
        assert_eq!(config.translation.inter_batch_delay_ms, 1200);
        assert_eq!(config.provider.model, "llama3");
        assert_eq!(config.provider.max_retries, 7);
        assert_eq!(config.provider.temperature, 0.1);
        assert_eq!(config.provider.glossary.len(), 1);
        assert_eq!(config.reflow, ReflowPolicy::default());
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = EngineConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
