// Generation agent layer.
// Every call to the text-generation capability goes through `GenerationAgent`:
// timeouts, retries, output validation and template fallback live here.

pub mod agent;
pub mod shape;

#[cfg(test)]
pub mod testing;

pub use agent::{AgentSettings, ContentOrigin, GenerationAgent, GenerationError};
pub use shape::{ExpectedShape, PromptContext, ShapeViolation, Templated};
