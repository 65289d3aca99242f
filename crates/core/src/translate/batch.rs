//! Batched translation through a [`Backend`].
//! A batch is joined into one prompt, sent once (with rate limiting and
//! retries), and the reply is split back into one segment per input text.

use super::Backend;
use crate::clean::strip_preamble;
use crate::config::{RetryPolicy, TranslatorConfig};
use crate::error::TranslateError;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Token placed between segments in both the prompt and the reply.
pub const SEPARATOR: &str = "---";

/// Translates batches of block texts one request at a time.
pub struct BatchTranslator<B> {
    backend: B,
    rate_limit_delay: Duration,
    retry: RetryPolicy,
    batch_size: usize,
}

impl<B: Backend> BatchTranslator<B> {
    pub fn new(backend: B, config: &TranslatorConfig) -> Result<Self, TranslateError> {
        config.validate()?;
        Ok(Self {
            backend,
            rate_limit_delay: config.rate_limit_delay(),
            retry: config.retry.clone(),
            batch_size: config.batch_size,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Translate `texts` into `target_language`, returning one segment per
    /// segment found in the reply. The caller checks the count.
    pub async fn translate_batch(
        &self,
        texts: &[String],
        target_language: &str,
    ) -> Result<Vec<String>, TranslateError> {
        info!(
            "translating batch of {} text blocks to {}",
            texts.len(),
            target_language
        );
        let prompt = build_prompt(texts, target_language);
        let max = self.retry.max_attempts;
        let mut attempt = 0;
        loop {
            attempt += 1;
            sleep(self.rate_limit_delay).await;
            match self.backend.complete(&prompt).await {
                Ok(body) => {
                    debug!("received {} bytes on attempt {}", body.len(), attempt);
                    return Ok(split_response(&body));
                }
                Err(err) if attempt < max && err.is_retryable() => {
                    let wait = self.retry.backoff(attempt);
                    warn!(
                        "attempt {}/{} failed: {}; retrying in {} ms",
                        attempt,
                        max,
                        err,
                        wait.as_millis()
                    );
                    sleep(wait).await;
                }
                Err(err) => {
                    error!("attempt {}/{} failed, giving up: {}", attempt, max, err);
                    return Err(TranslateError::Backend {
                        attempts: attempt,
                        source: err,
                    });
                }
            }
        }
    }
}

/// Build the instruction plus the separator-joined segments.
pub fn build_prompt(texts: &[String], target_language: &str) -> String {
    format!(
        "Translate the following subtitle texts to {target_language}. Maintain the original \
         formatting and line breaks. Separate each translation with '{SEPARATOR}'.\n\n{}",
        texts.join(format!("\n{SEPARATOR}\n").as_str())
    )
}

/// Split a reply on the separator, trimming every segment.
pub fn split_response(body: &str) -> Vec<String> {
    strip_preamble(body)
        .split(SEPARATOR)
        .map(|s| s.trim().to_string())
        .collect()
}
