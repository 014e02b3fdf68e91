//! Taxonomy phrase scanning over free text.
//!
//! Phrases (canonical names, labels, aliases) match case-insensitively on word
//! boundaries. Phrases of two characters or fewer are too ambiguous for that ("r",
//! "go", "py"), so they are only found through the entry's case-sensitive acronyms.
//! Offsets are byte offsets into the original text.

use std::sync::LazyLock;

use crate::skills::normalizer::{clean, is_significant};
use crate::skills::taxonomy::{self, TAXONOMY};
use crate::skills::{normalize, Skill};

/// A skill found in text at a byte offset.
#[derive(Debug, Clone)]
pub struct Mention {
    pub skill: Skill,
    pub offset: usize,
}

struct ScanPhrase {
    text: String,
    entry: usize,
    case_sensitive: bool,
}

static SCAN_PHRASES: LazyLock<Vec<ScanPhrase>> = LazyLock::new(|| {
    let mut phrases = Vec::new();
    for (i, e) in TAXONOMY.iter().enumerate() {
        let mut forms: Vec<String> = std::iter::once(e.canonical)
            .chain(e.aliases.iter().copied())
            .map(str::to_ascii_lowercase)
            .chain(std::iter::once(e.label.to_ascii_lowercase()))
            .filter(|f| f.chars().count() > 2)
            .collect();
        forms.sort();
        forms.dedup();
        phrases.extend(forms.into_iter().map(|text| ScanPhrase {
            text,
            entry: i,
            case_sensitive: false,
        }));
        phrases.extend(e.acronyms.iter().map(|a| ScanPhrase {
            text: a.to_string(),
            entry: i,
            case_sensitive: true,
        }));
    }
    phrases
});

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '+' | '#' | '_' | '&')
}

/// True when `hay[start..end]` is not glued to a neighbouring word.
fn on_boundary(hay: &str, start: usize, end: usize) -> bool {
    let before_ok = hay[..start]
        .chars()
        .next_back()
        .map_or(true, |c| !is_word_char(c) && c != '.');
    let after_ok = hay[end..].chars().next().map_or(true, |c| !is_word_char(c));
    before_ok && after_ok
}

fn occurrences<'a>(hay: &'a str, needle: &'a str) -> impl Iterator<Item = usize> + 'a {
    hay.match_indices(needle)
        .map(|(i, _)| i)
        .filter(move |&i| on_boundary(hay, i, i + needle.len()))
}

/// Every taxonomy mention in `text`, in offset order.
///
/// A match lying entirely inside a longer match is dropped, so "health data analysis"
/// does not also report "data analysis".
pub fn scan(text: &str) -> Vec<Mention> {
    // ASCII lowering keeps byte offsets aligned with `text`.
    let lowered = text.to_ascii_lowercase();
    let mut spans: Vec<(usize, usize, usize)> = Vec::new();
    for phrase in SCAN_PHRASES.iter() {
        let hay = if phrase.case_sensitive { text } else { lowered.as_str() };
        for start in occurrences(hay, &phrase.text) {
            spans.push((start, start + phrase.text.len(), phrase.entry));
        }
    }

    // Longest first at each start so containment checks see the outer span first.
    spans.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
    let mut kept: Vec<(usize, usize, usize)> = Vec::new();
    for span in spans {
        let covered = kept.iter().any(|k| k.0 <= span.0 && span.1 <= k.1);
        if !covered {
            kept.push(span);
        }
    }

    kept.into_iter()
        .map(|(offset, _, entry)| Mention {
            skill: normalize(TAXONOMY[entry].canonical),
            offset,
        })
        .collect()
}

/// `text` folded the way skill names are cleaned, keeping the source byte offset of
/// every folded byte.
struct Folded {
    text: String,
    origin: Vec<usize>,
}

fn fold(text: &str) -> Folded {
    let mut folded = Folded {
        text: String::with_capacity(text.len()),
        origin: Vec::with_capacity(text.len()),
    };
    let mut pending_space = None;
    for (at, c) in text.char_indices() {
        if !is_significant(c) {
            // Separators and stray punctuation both end a word.
            if !folded.text.is_empty() {
                pending_space.get_or_insert(at);
            }
            continue;
        }
        if let Some(space_at) = pending_space.take() {
            folded.text.push(' ');
            folded.origin.push(space_at);
        }
        for lower in c.to_lowercase() {
            folded.text.push(lower);
            folded.origin.extend(std::iter::repeat(at).take(lower.len_utf8()));
        }
    }
    folded
}

/// Byte offsets of every mention of `skill` in `text`, ascending.
///
/// Skills outside the taxonomy are matched on their canonical name against the folded
/// text, so "Real-time systems" finds "real time systems" and non-ASCII names match
/// regardless of case.
pub fn mentions_of(text: &str, skill: &Skill) -> Vec<usize> {
    let lowered = text.to_ascii_lowercase();
    let mut offsets = Vec::new();

    match taxonomy::lookup(&clean(&skill.name)) {
        Some(entry) => {
            let phrases = SCAN_PHRASES
                .iter()
                .filter(|p| std::ptr::eq(&TAXONOMY[p.entry], entry));
            for phrase in phrases {
                let hay = if phrase.case_sensitive { text } else { lowered.as_str() };
                offsets.extend(occurrences(hay, &phrase.text));
            }
        }
        None if !skill.name.is_empty() => {
            let folded = fold(text);
            offsets.extend(occurrences(&folded.text, &skill.name).map(|i| folded.origin[i]));
        }
        None => {}
    }

    offsets.sort_unstable();
    offsets.dedup();
    offsets
}
