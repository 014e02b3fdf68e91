//! Skill Normalizer: maps raw skill mentions to canonical `Skill` identities.
//!
//! Pure and deterministic: no I/O, no generation calls. Resolution order is
//! exact cleaned form → compact key → the cleaned string itself.

use crate::skills::taxonomy;
use crate::skills::Skill;

/// Characters that separate words inside a mention and collapse to a single space.
fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '-' | '_' | '/' | '|')
}

/// Characters that carry meaning inside a skill name ("c++", "c#", "node.js").
pub(crate) fn is_significant(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '+' | '#' | '.' | '&')
}

/// Lower-cases, strips surrounding punctuation, and collapses separator runs.
pub fn clean(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let trimmed = lowered.trim_matches(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'));

    let mut out = String::with_capacity(trimmed.len());
    let mut pending_space = false;
    for c in trimmed.chars() {
        if is_separator(c) {
            pending_space = !out.is_empty();
        } else if is_significant(c) {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
        // Other punctuation (quotes, brackets, commas) is dropped.
    }
    out
}

/// Collapses spaces, dots and hyphens so "node js", "node.js" and "nodejs" meet.
pub fn compact_key(input: &str) -> String {
    input
        .chars()
        .filter(|c| !matches!(c, ' ' | '.' | '-'))
        .collect()
}

/// Normalizes a raw mention into its canonical `Skill`.
///
/// Unknown mentions become their own canonical skill, labelled in title case.
pub fn normalize(raw: &str) -> Skill {
    let cleaned = clean(raw);
    match taxonomy::lookup(&cleaned) {
        Some(entry) => Skill::from_entry(entry),
        None => Skill::unknown(cleaned),
    }
}

/// Like `normalize`, but rejects mentions that clean down to nothing useful.
pub fn try_normalize(raw: &str) -> Option<Skill> {
    let skill = normalize(raw);
    if skill.name.chars().any(char::is_alphanumeric) {
        Some(skill)
    } else {
        None
    }
}

/// Canonical-name equivalence. Reflexive, symmetric and transitive because the
/// alias table is closed when it is built.
pub fn equal(a: &Skill, b: &Skill) -> bool {
    a.name == b.name
}
