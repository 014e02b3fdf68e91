//! Expected output shapes for generation calls.
//!
//! Model output is never trusted as-is: it is deserialized into a typed draft (unknown
//! fields are ignored), then `adapt` checks the draft against the caller's context and
//! converts it into a domain value. A failed check counts as malformed output.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// One prompt sent to the generation capability.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub system: String,
    pub prompt: String,
}

impl PromptContext {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
        }
    }
}

/// A draft that failed validation.
#[derive(Debug, Error)]
#[error("{shape}: {reason}")]
pub struct ShapeViolation {
    pub shape: &'static str,
    pub reason: String,
}

impl ShapeViolation {
    pub fn new(shape: &'static str, reason: impl Into<String>) -> Self {
        Self {
            shape,
            reason: reason.into(),
        }
    }
}

/// A structured result the generation capability is asked to produce.
pub trait ExpectedShape: DeserializeOwned + Send {
    /// Short name used in logs and errors.
    const NAME: &'static str;

    /// Caller-supplied context the draft is validated against.
    type Context: ?Sized + Sync;

    /// The domain value produced once the draft is accepted.
    type Output: Send;

    /// Validate-then-adapt step.
    fn adapt(self, ctx: &Self::Context) -> Result<Self::Output, ShapeViolation>;
}

/// A shape that can be filled deterministically from its context alone.
pub trait Templated: ExpectedShape {
    fn template(ctx: &Self::Context) -> Self::Output;
}

/// Rejects an empty or whitespace-only string field.
pub fn require_text(
    shape: &'static str,
    field: &str,
    value: &str,
) -> Result<String, ShapeViolation> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ShapeViolation::new(shape, format!("`{field}` is empty")));
    }
    Ok(trimmed.to_string())
}

/// Trims entries and drops the blank ones.
pub fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}
