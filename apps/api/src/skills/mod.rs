// Skill identities: canonical names, aliases and the taxonomy behind them.
// Everything here is pure; no network or generation calls.

pub mod normalizer;
pub mod taxonomy;

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

pub use normalizer::{normalize, try_normalize};
use taxonomy::{SkillCategory, TaxonomyEntry};

/// A canonical skill. Identity is `name` alone: equality, ordering and hashing ignore
/// the label and aliases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    /// Canonical name (cleaned, lower-case).
    pub name: String,
    /// Human-facing label ("PostgreSQL", "A/B Testing").
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

/// Unique skills, iterated in canonical-name order.
pub type SkillSet = BTreeSet<Skill>;

impl Skill {
    fn from_entry(entry: &TaxonomyEntry) -> Self {
        let mut aliases: Vec<String> = entry.aliases.iter().map(|a| a.to_string()).collect();
        aliases.sort();
        Self {
            name: entry.canonical.to_string(),
            label: entry.label.to_string(),
            aliases,
        }
    }

    fn unknown(cleaned: String) -> Self {
        Self {
            label: title_case(&cleaned),
            name: cleaned,
            aliases: Vec::new(),
        }
    }

    /// Taxonomy parent of this skill, if it is a known skill.
    pub fn category(&self) -> Option<SkillCategory> {
        taxonomy::category_of(&self.name)
    }
}

impl PartialEq for Skill {
    fn eq(&self, other: &Self) -> bool {
        normalizer::equal(self, other)
    }
}

impl Eq for Skill {}

impl Hash for Skill {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Skill {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Skill {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

/// Normalizes every mention and collapses duplicates.
pub fn normalize_all<'a>(mentions: impl IntoIterator<Item = &'a str>) -> SkillSet {
    mentions.into_iter().filter_map(try_normalize).collect()
}

/// Comma-joined labels, used in prompts and reasons.
pub fn join_labels<'a>(skills: impl IntoIterator<Item = &'a Skill>) -> String {
    skills
        .into_iter()
        .map(|s| s.label.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
