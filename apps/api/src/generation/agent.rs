//! Generation Agent: wraps every call to the text-generation capability.
//!
//! Each call gets a per-attempt timeout, bounded retries with exponential backoff,
//! and validation against an `ExpectedShape`. Callers that can live with generic
//! content use `generate_or_template`, which fills the shape from its template when
//! generation fails (unless strict mode is on). Output is tagged with its origin so
//! templated content is never mistaken for generated content.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::generation::shape::{ExpectedShape, PromptContext, Templated};
use crate::llm_client::{strip_json_fences, LlmError, TextGenerator};

// ────────────────────────────────────────────────────────────────────────────
// Settings and results
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AgentSettings {
    /// Total attempts per call, including the first. Never less than 1.
    pub max_attempts: u32,
    /// Deadline for a single attempt.
    pub call_timeout: Duration,
    /// Delay before the second attempt; doubles after each failure.
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// When true, `generate_or_template` fails instead of falling back.
    pub strict: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            call_timeout: Duration::from_secs(60),
            initial_backoff: Duration::from_millis(1000),
            max_backoff: Duration::from_secs(8),
            strict: false,
        }
    }
}

/// Where a piece of content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentOrigin {
    Generated,
    Templated,
}

#[derive(Debug, Clone)]
pub struct Generated<T> {
    pub value: T,
    pub origin: ContentOrigin,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("text generation is not configured")]
    Unavailable,

    #[error("{shape} generation gave up after {attempts} attempt(s): {last_error}")]
    Exhausted {
        shape: &'static str,
        attempts: u32,
        last_error: String,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Agent
// ────────────────────────────────────────────────────────────────────────────

/// Cheap to clone; the backend is shared.
#[derive(Clone)]
pub struct GenerationAgent {
    backend: Option<Arc<dyn TextGenerator>>,
    settings: AgentSettings,
}

impl GenerationAgent {
    pub fn new(backend: Arc<dyn TextGenerator>, settings: AgentSettings) -> Self {
        Self {
            backend: Some(backend),
            settings,
        }
    }

    /// An agent with no backend: every call fails, so callers take the template path.
    pub fn disabled(settings: AgentSettings) -> Self {
        Self {
            backend: None,
            settings,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Generates `S` with retries. No fallback.
    pub async fn generate<S: ExpectedShape>(
        &self,
        prompt: &PromptContext,
        ctx: &S::Context,
    ) -> Result<S::Output, GenerationError> {
        let backend = self.backend.as_deref().ok_or(GenerationError::Unavailable)?;
        let max_attempts = self.settings.max_attempts.max(1);
        let mut delay = self.settings.initial_backoff;
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < max_attempts {
            attempts += 1;
            match self.attempt::<S>(backend, prompt, ctx).await {
                Ok(output) => {
                    debug!("{} generated on attempt {}/{}", S::NAME, attempts, max_attempts);
                    return Ok(output);
                }
                Err(e) => {
                    warn!(
                        "{} generation attempt {}/{} failed: {}",
                        S::NAME,
                        attempts,
                        max_attempts,
                        e
                    );
                    let transient = e.is_transient();
                    last_error = Some(e);
                    if !transient || attempts == max_attempts {
                        break;
                    }
                    tokio::time::sleep(delay).await;
                    delay = next_backoff(delay, self.settings.max_backoff);
                }
            }
        }

        Err(GenerationError::Exhausted {
            shape: S::NAME,
            attempts,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no attempt made".to_string()),
        })
    }

    /// Generates `S`, falling back to its template on any failure.
    ///
    /// In strict mode the failure is returned instead.
    pub async fn generate_or_template<S: Templated>(
        &self,
        prompt: &PromptContext,
        ctx: &S::Context,
    ) -> Result<Generated<S::Output>, GenerationError> {
        match self.generate::<S>(prompt, ctx).await {
            Ok(value) => Ok(Generated {
                value,
                origin: ContentOrigin::Generated,
            }),
            Err(e) if self.settings.strict => Err(e),
            Err(e) => {
                if self.is_enabled() {
                    warn!("{} falling back to template: {}", S::NAME, e);
                } else {
                    debug!("{} using template, generation disabled", S::NAME);
                }
                Ok(Generated {
                    value: S::template(ctx),
                    origin: ContentOrigin::Templated,
                })
            }
        }
    }

    async fn attempt<S: ExpectedShape>(
        &self,
        backend: &dyn TextGenerator,
        prompt: &PromptContext,
        ctx: &S::Context,
    ) -> Result<S::Output, LlmError> {
        let timeout = self.settings.call_timeout;
        let raw = tokio::time::timeout(timeout, backend.complete(&prompt.prompt, &prompt.system))
            .await
            .map_err(|_| LlmError::Timeout(timeout))??;

        let draft: S = serde_json::from_str(strip_json_fences(&raw))?;
        draft.adapt(ctx).map_err(|v| LlmError::Shape(v.to_string()))
    }
}

fn next_backoff(current: Duration, max: Duration) -> Duration {
    current.saturating_mul(2).min(max)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::shape::{require_text, ShapeViolation};
    use crate::generation::testing::{ScriptedGenerator, StallingGenerator};

    #[derive(Debug, Deserialize)]
    struct Greeting {
        text: String,
    }

    impl ExpectedShape for Greeting {
        const NAME: &'static str = "greeting";
        type Context = str;
        type Output = String;

        fn adapt(self, name: &str) -> Result<String, ShapeViolation> {
            let text = require_text(Self::NAME, "text", &self.text)?;
            if !text.contains(name) {
                return Err(ShapeViolation::new(Self::NAME, "does not greet the caller"));
            }
            Ok(text)
        }
    }

    impl Templated for Greeting {
        fn template(name: &str) -> String {
            format!("Hello, {name}")
        }
    }

    fn fast_settings() -> AgentSettings {
        AgentSettings {
            max_attempts: 3,
            call_timeout: Duration::from_secs(5),
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(40),
            strict: false,
        }
    }

    fn prompt() -> PromptContext {
        PromptContext::new("system", "say hello")
    }

    #[tokio::test]
    async fn test_first_valid_answer_wins() {
        let backend = Arc::new(ScriptedGenerator::new(vec![Ok(
            r#"{"text": "Hi Ada"}"#.to_string()
        )]));
        let agent = GenerationAgent::new(backend.clone(), fast_settings());

        let out = agent.generate::<Greeting>(&prompt(), "Ada").await.unwrap();
        assert_eq!(out, "Hi Ada");
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_output_is_retried() {
        let backend = Arc::new(ScriptedGenerator::new(vec![
            Ok("not json".to_string()),
            Ok(r#"{"text": "Hi Bob"}"#.to_string()),
            Ok("```json\n{\"text\": \"Hi Ada\"}\n```".to_string()),
        ]));
        let agent = GenerationAgent::new(backend.clone(), fast_settings());

        let out = agent.generate::<Greeting>(&prompt(), "Ada").await.unwrap();
        assert_eq!(out, "Hi Ada");
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_reports_attempts() {
        let backend = Arc::new(ScriptedGenerator::new(vec![
            Err(LlmError::Api { status: 503, message: "overloaded".to_string() }),
            Err(LlmError::Api { status: 529, message: "overloaded".to_string() }),
            Err(LlmError::EmptyContent),
        ]));
        let agent = GenerationAgent::new(backend.clone(), fast_settings());

        let err = agent.generate::<Greeting>(&prompt(), "Ada").await.unwrap_err();
        match err {
            GenerationError::Exhausted { shape, attempts, .. } => {
                assert_eq!(shape, "greeting");
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_stops_retrying() {
        let backend = Arc::new(ScriptedGenerator::new(vec![
            Err(LlmError::Api { status: 401, message: "bad key".to_string() }),
            Ok(r#"{"text": "Hi Ada"}"#.to_string()),
        ]));
        let agent = GenerationAgent::new(backend.clone(), fast_settings());

        let err = agent.generate::<Greeting>(&prompt(), "Ada").await.unwrap_err();
        assert!(matches!(err, GenerationError::Exhausted { attempts: 1, .. }));
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_failed_attempt() {
        let backend = Arc::new(StallingGenerator::default());
        let agent = GenerationAgent::new(backend.clone(), fast_settings());

        let out = agent
            .generate_or_template::<Greeting>(&prompt(), "Ada")
            .await
            .unwrap();
        assert_eq!(out.value, "Hello, Ada");
        assert_eq!(out.origin, ContentOrigin::Templated);
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn test_generated_output_is_tagged() {
        let backend = Arc::new(ScriptedGenerator::new(vec![Ok(
            r#"{"text": "Welcome, Ada", "extra": 1}"#.to_string()
        )]));
        let agent = GenerationAgent::new(backend, fast_settings());

        let out = agent
            .generate_or_template::<Greeting>(&prompt(), "Ada")
            .await
            .unwrap();
        assert_eq!(out.origin, ContentOrigin::Generated);
        assert_eq!(out.value, "Welcome, Ada");
    }

    #[tokio::test(start_paused = true)]
    async fn test_strict_mode_surfaces_failure() {
        let backend = Arc::new(ScriptedGenerator::new(vec![]));
        let agent = GenerationAgent::new(
            backend,
            AgentSettings {
                strict: true,
                ..fast_settings()
            },
        );

        let result = agent
            .generate_or_template::<Greeting>(&prompt(), "Ada")
            .await;
        assert!(matches!(result, Err(GenerationError::Exhausted { .. })));
    }

    #[tokio::test]
    async fn test_disabled_agent_uses_template() {
        let agent = GenerationAgent::disabled(fast_settings());

        let err = agent.generate::<Greeting>(&prompt(), "Ada").await.unwrap_err();
        assert!(matches!(err, GenerationError::Unavailable));

        let out = agent
            .generate_or_template::<Greeting>(&prompt(), "Ada")
            .await
            .unwrap();
        assert_eq!(out.origin, ContentOrigin::Templated);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let max = Duration::from_millis(40);
        let d1 = next_backoff(Duration::from_millis(10), max);
        let d2 = next_backoff(d1, max);
        let d3 = next_backoff(d2, max);
        assert_eq!(d1, Duration::from_millis(20));
        assert_eq!(d2, Duration::from_millis(40));
        assert_eq!(d3, Duration::from_millis(40));
    }
}
