// Test doubles for the text-generation capability.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::llm_client::{LlmError, TextGenerator};

/// Replays a fixed script of responses, then answers 503 forever.
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(script: Vec<Result<String, LlmError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(LlmError::Api {
                    status: 503,
                    message: "script exhausted".to_string(),
                })
            })
    }
}

/// Never answers within any reasonable deadline.
#[derive(Default)]
pub struct StallingGenerator {
    calls: AtomicUsize,
}

impl StallingGenerator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for StallingGenerator {
    async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
        Err(LlmError::EmptyContent)
    }
}

type Responder = dyn Fn(&str, &str) -> Result<String, LlmError> + Send + Sync;

/// Answers each prompt with a closure, so concurrent callers get prompt-specific output.
pub struct FnGenerator {
    respond: Box<Responder>,
    calls: AtomicUsize,
}

impl FnGenerator {
    pub fn new(
        respond: impl Fn(&str, &str) -> Result<String, LlmError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for FnGenerator {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(prompt, system)
    }
}

/// Pulls the value of a `KEY: value` line out of a prompt.
pub fn prompt_field<'a>(prompt: &'a str, key: &str) -> Option<&'a str> {
    prompt.lines().find_map(|line| {
        line.trim()
            .strip_prefix(key)
            .and_then(|rest| rest.strip_prefix(':'))
            .map(str::trim)
    })
}
