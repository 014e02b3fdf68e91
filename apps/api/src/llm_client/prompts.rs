// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction appended to curriculum prompts so content stays tied to the gap context.
pub const CONTEXT_INSTRUCTION: &str = "\
    CRITICAL: Build the content only around the skill, role and project details in this \
    prompt. Do NOT reference tools, datasets or employers that are not mentioned. \
    Prefer hands-on, practical exercises over reading lists.";

/// Caps free text inserted into prompts so one oversized document cannot blow the
/// context window.
pub const MAX_PROMPT_TEXT_CHARS: usize = 6000;

/// Truncates `text` to `MAX_PROMPT_TEXT_CHARS` characters on a char boundary.
pub fn clip(text: &str) -> &str {
    match text.char_indices().nth(MAX_PROMPT_TEXT_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
