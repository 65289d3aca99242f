//! Translator configuration.
//! Everything the backend and the batch translator need is passed in
//! explicitly through [`TranslatorConfig`]; nothing is read from globals.

use crate::error::TranslateError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default number of blocks translated per backend request.
pub const DEFAULT_BATCH_SIZE: usize = 200;

/// Environment variable holding the backend API key.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Retry behaviour for failed backend calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay after the first failure; doubles after each further failure.
    pub initial_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 1000,
        }
    }
}

impl RetryPolicy {
    /// Backoff to wait after the failed attempt numbered `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.initial_backoff_ms.saturating_mul(factor))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    #[serde(skip_serializing)]
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub system_prompt: String,
    pub request_timeout_secs: u64,
    /// Fixed wait before every backend attempt.
    pub rate_limit_delay_ms: u64,
    pub batch_size: usize,
    pub retry: RetryPolicy,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: "https://api.anthropic.com".to_string(),
            model: "claude-3-5-sonnet-20240620".to_string(),
            max_tokens: 8000,
            system_prompt: "You are a professional translator.".to_string(),
            request_timeout_secs: 120,
            rate_limit_delay_ms: 1200,
            batch_size: DEFAULT_BATCH_SIZE,
            retry: RetryPolicy::default(),
        }
    }
}

impl TranslatorConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Check the settings the pipeline relies on.
    pub fn validate(&self) -> std::result::Result<(), TranslateError> {
        if self.batch_size == 0 {
            return Err(TranslateError::InvalidConfig(
                "batch size must be at least 1".into(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(TranslateError::InvalidConfig(
                "max attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
