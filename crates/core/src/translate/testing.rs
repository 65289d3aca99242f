//! Scripted backend shared by the translation tests.

use super::Backend;
use crate::error::BackendError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::time::Instant;

type Reply = Result<String, BackendError>;

/// Replays queued replies in order, then falls back to `fallback` if set.
/// Records every prompt and the (tokio) instant of every call.
pub(crate) struct ScriptedBackend {
    replies: Mutex<VecDeque<Reply>>,
    fallback: Option<Box<dyn Fn(&str) -> Reply + Send + Sync>>,
    prompts: Mutex<Vec<String>>,
    calls: Mutex<Vec<Instant>>,
}

impl ScriptedBackend {
    pub(crate) fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fallback: None,
            prompts: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn always(f: impl Fn(&str) -> Reply + Send + Sync + 'static) -> Self {
        Self {
            fallback: Some(Box::new(f)),
            ..Self::new(Vec::new())
        }
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub(crate) fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        self.calls.lock().unwrap().push(Instant::now());
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(reply) = self.replies.lock().unwrap().pop_front() {
            return reply;
        }
        match &self.fallback {
            Some(f) => f(prompt),
            None => panic!("scripted backend ran out of replies"),
        }
    }
}

/// Reply as if every segment of `prompt` were translated by `f`.
pub(crate) fn echo_segments(prompt: &str, f: impl Fn(&str) -> String) -> String {
    let body = prompt.split_once("\n\n").map(|(_, b)| b).unwrap_or_default();
    body.split("\n---\n")
        .map(|seg| f(seg))
        .collect::<Vec<_>>()
        .join("\n---\n")
}
