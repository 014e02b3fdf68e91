//! Pattern rules for tier-1 extraction: line cues, list lines, and resume sections.
//!
//! Everything here is infallible. Text the rules do not understand is ignored.

use std::sync::LazyLock;

use regex::Regex;

use crate::extraction::models::{EducationEntry, ExperienceEntry};

/// How a line of job text frames the skills on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Required,
    Preferred,
    Neutral,
}

/// Longest accepted skill mention, in characters.
pub const MAX_SKILL_CHARS: usize = 60;
pub const MAX_SKILL_WORDS: usize = 6;
/// Resume experience blocks kept, most recent first.
const MAX_EXPERIENCE_ENTRIES: usize = 5;

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("static extraction pattern must compile")
}

static REQUIRED_CUE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)\b(?:required|requirements?|must|essential|mandatory|qualifications|minimum|needs?)\b")
});

static PREFERRED_CUE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)\b(?:preferred|nice[- ]to[- ]haves?|bonus|plus|desired|desirable|optional|ideally|advantageous)\b")
});

static LIST_LINE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(
        r"(?im)^[ \t]*(?:[-*•][ \t]*)?(?P<label>(?:technical[ \t]+)?(?:skills?|technologies|tools|proficiencies|tech[ \t]+stack)|required(?:[ \t]+skills)?|requirements|must[ \t-]+haves?|preferred(?:[ \t]+skills)?|nice[ \t-]+to[ \t-]+haves?|bonus)[ \t]*:[ \t]*(?P<items>\S[^\n]*)$",
    )
});

static PROFICIENCY: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)\b(?:proficient in|experienced with|familiar with|expert in)[ \t]*:?[ \t]*(?P<items>[^.\n]+)")
});

static ITEM_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)[ \t]*(?:[,;|•]|\band\b|\bor\b)[ \t]*"));

static EXPERIENCE_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)^#*[ \t]*(?:professional[ \t]+|work[ \t]+)?(?:experience|work history|employment(?:[ \t]+history)?)[ \t]*:?$")
});

static EDUCATION_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)^#*[ \t]*(?:education|academic background|qualifications)[ \t]*:?$")
});

static DATE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"\b(?:19|20)\d{2}\b|\b\d{1,2}/\d{4}\b"));

static YEAR: LazyLock<Regex> = LazyLock::new(|| pattern(r"\b(?:19|20)\d{2}\b"));

// ────────────────────────────────────────────────────────────────────────────
// Line cues
// ────────────────────────────────────────────────────────────────────────────

/// The cue carried by a single line. When both kinds appear, the earlier one wins.
pub fn cue_of(line: &str) -> Cue {
    let required = REQUIRED_CUE.find(line).map(|m| m.start());
    let preferred = PREFERRED_CUE.find(line).map(|m| m.start());
    match (required, preferred) {
        (Some(r), Some(p)) if p < r => Cue::Preferred,
        (Some(_), _) => Cue::Required,
        (None, Some(_)) => Cue::Preferred,
        (None, None) => Cue::Neutral,
    }
}

/// A section heading: "Requirements:", "## Nice to have", "QUALIFICATIONS".
pub fn is_heading(line: &str) -> bool {
    let trimmed = line.trim();
    let body = trimmed.trim_start_matches('#').trim();
    if body.is_empty() || body.split_whitespace().count() > MAX_SKILL_WORDS {
        return false;
    }
    if let Some(label) = body.strip_suffix(':') {
        return !label.trim().is_empty();
    }
    if trimmed.starts_with('#') {
        return true;
    }
    let letters: Vec<char> = body.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() >= 3 && letters.iter().all(|c| c.is_uppercase())
}

#[derive(Debug, Clone)]
pub struct ClassifiedLine<'a> {
    /// Byte offset of the line start.
    pub start: usize,
    pub text: &'a str,
    pub heading: bool,
    /// The line's own cue, or the cue of the heading it sits under.
    pub cue: Cue,
}

/// Splits text into lines, carrying each heading's cue down to the lines under it.
pub fn classify_lines(text: &str) -> Vec<ClassifiedLine<'_>> {
    let mut lines = Vec::new();
    let mut section = Cue::Neutral;
    let mut start = 0;
    for raw in text.split_inclusive('\n') {
        let line = raw.trim_end_matches(['\n', '\r']);
        let own = cue_of(line);
        let heading = is_heading(line);
        let cue = if heading {
            section = own;
            own
        } else if own != Cue::Neutral {
            own
        } else {
            section
        };
        lines.push(ClassifiedLine {
            start,
            text: line,
            heading,
            cue,
        });
        start += raw.len();
    }
    lines
}

/// The line containing byte `offset`.
pub fn line_at<'l, 'a>(
    lines: &'l [ClassifiedLine<'a>],
    offset: usize,
) -> Option<&'l ClassifiedLine<'a>> {
    let idx = lines.partition_point(|l| l.start <= offset);
    idx.checked_sub(1).map(|i| &lines[i])
}

/// Byte span of the requirements section: from the first required-cued heading to
/// the next heading. Without such a heading the whole text counts.
pub fn requirements_span(lines: &[ClassifiedLine<'_>], text_len: usize) -> (usize, usize) {
    let Some(pos) = lines
        .iter()
        .position(|l| l.heading && l.cue == Cue::Required)
    else {
        return (0, text_len);
    };
    let start = lines[pos].start;
    let end = lines[pos + 1..]
        .iter()
        .find(|l| l.heading)
        .map(|l| l.start)
        .unwrap_or(text_len);
    (start, end)
}

// ────────────────────────────────────────────────────────────────────────────
// List lines
// ────────────────────────────────────────────────────────────────────────────

/// A skill named on a list line ("Skills: a, b", "Preferred: c").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub text: String,
    pub offset: usize,
    pub cue: Cue,
}

/// Accepts strings of 2..=60 characters and at most six words.
pub fn is_plausible_skill(text: &str) -> bool {
    let trimmed = text.trim();
    let chars = trimmed.chars().count();
    (2..=MAX_SKILL_CHARS).contains(&chars)
        && trimmed.split_whitespace().count() <= MAX_SKILL_WORDS
        && trimmed.chars().any(char::is_alphanumeric)
}

fn split_items(items: &str, base: usize, cue: Cue, out: &mut Vec<ListItem>) {
    let mut push = |from: usize, to: usize| {
        let piece = &items[from..to];
        // Drop parentheticals: "Python (5 years)" names Python.
        let piece = piece.split('(').next().unwrap_or(piece);
        let lead = piece.len() - piece.trim_start().len();
        let text = piece
            .trim()
            .trim_end_matches(|c: char| matches!(c, '.' | ')' | '"' | '\'' | ':'));
        if is_plausible_skill(text) {
            out.push(ListItem {
                text: text.to_string(),
                offset: base + from + lead,
                cue,
            });
        }
    };

    let mut last = 0;
    for sep in ITEM_SEPARATOR.find_iter(items) {
        push(last, sep.start());
        last = sep.end();
    }
    push(last, items.len());
}

/// Items from every list line and proficiency phrase in `text`.
pub fn list_items(text: &str) -> Vec<ListItem> {
    let mut out = Vec::new();
    for caps in LIST_LINE.captures_iter(text) {
        let (Some(label), Some(items)) = (caps.name("label"), caps.name("items")) else {
            continue;
        };
        let raw = items.as_str().trim_end_matches('\r');
        split_items(raw, items.start(), cue_of(label.as_str()), &mut out);
    }
    for caps in PROFICIENCY.captures_iter(text) {
        if let Some(items) = caps.name("items") {
            split_items(items.as_str(), items.start(), Cue::Neutral, &mut out);
        }
    }
    out.sort_by_key(|item| item.offset);
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Resume sections
// ────────────────────────────────────────────────────────────────────────────

/// Paragraphs separated by blank lines, trimmed.
pub fn paragraphs(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(current.join("\n").trim().to_string());
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        out.push(current.join("\n").trim().to_string());
    }
    out
}

/// Blank-line separated blocks under every heading matching `heading`.
fn section_blocks<'a>(text: &'a str, heading: &Regex) -> Vec<Vec<&'a str>> {
    let mut blocks = Vec::new();
    let mut inside = false;
    let mut block: Vec<&str> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if heading.is_match(trimmed) {
            inside = true;
            continue;
        }
        if !inside {
            continue;
        }
        // A new heading or a "Skills: ..." line closes the section.
        if (is_heading(trimmed) && !DATE.is_match(trimmed)) || LIST_LINE.is_match(trimmed) {
            inside = false;
        }
        if !inside || trimmed.is_empty() {
            if !block.is_empty() {
                blocks.push(std::mem::take(&mut block));
            }
            continue;
        }
        block.push(trimmed);
    }
    if !block.is_empty() {
        blocks.push(block);
    }
    blocks
}

pub fn experience(text: &str) -> Vec<ExperienceEntry> {
    section_blocks(text, &EXPERIENCE_HEADING)
        .into_iter()
        .filter_map(|lines| {
            let mut entry = ExperienceEntry::default();
            for line in lines.iter().take(3) {
                if DATE.is_match(line) && entry.duration.is_empty() {
                    entry.duration = line.to_string();
                } else if entry.role.is_empty() {
                    entry.role = line.to_string();
                } else if entry.company.is_empty() {
                    entry.company = line.to_string();
                }
            }
            entry.description = lines.iter().skip(3).copied().collect::<Vec<_>>().join("\n");
            (!entry.role.is_empty() || !entry.company.is_empty()).then_some(entry)
        })
        .take(MAX_EXPERIENCE_ENTRIES)
        .collect()
}

pub fn education(text: &str) -> Vec<EducationEntry> {
    section_blocks(text, &EDUCATION_HEADING)
        .into_iter()
        .filter_map(|lines| {
            let mut entry = EducationEntry::default();
            for line in lines.iter().take(3) {
                if let Some(year) = YEAR.find(line) {
                    entry.year = year.as_str().to_string();
                    // "BSc Biology, 2016": the text before the year still names the degree.
                    let rest = line[..year.start()].trim().trim_end_matches([',', '-', '(']);
                    if entry.degree.is_empty() && !rest.trim().is_empty() {
                        entry.degree = rest.trim().to_string();
                    }
                } else if entry.degree.is_empty() {
                    entry.degree = line.to_string();
                } else if entry.institution.is_empty() {
                    entry.institution = line.to_string();
                }
            }
            (!entry.degree.is_empty() || !entry.institution.is_empty()).then_some(entry)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_of_line() {
        assert_eq!(cue_of("Must have 3+ years of Python"), Cue::Required);
        assert_eq!(cue_of("Experience with Docker is a plus"), Cue::Preferred);
        assert_eq!(cue_of("Preferred Qualifications:"), Cue::Preferred);
        assert_eq!(cue_of("You will build pipelines"), Cue::Neutral);
    }

    #[test]
    fn test_is_heading() {
        assert!(is_heading("Requirements:"));
        assert!(is_heading("## Nice to have"));
        assert!(is_heading("EXPERIENCE"));
        assert!(!is_heading("Required: Python, SQL"));
        assert!(!is_heading("We are a small team building tools for clinicians."));
    }

    #[test]
    fn test_heading_cue_carries_to_following_lines() {
        let text = "About us\nRequirements:\n- Python\n- SQL\nNice to have:\n- Docker\n";
        let lines = classify_lines(text);
        let cue_for = |needle: &str| lines.iter().find(|l| l.text.contains(needle)).unwrap().cue;
        assert_eq!(cue_for("About"), Cue::Neutral);
        assert_eq!(cue_for("Python"), Cue::Required);
        assert_eq!(cue_for("SQL"), Cue::Required);
        assert_eq!(cue_for("Docker"), Cue::Preferred);
    }

    #[test]
    fn test_line_at_and_offsets() {
        let text = "first\r\nsecond\nthird";
        let lines = classify_lines(text);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].text, "second");
        assert_eq!(line_at(&lines, text.find("cond").unwrap()).unwrap().text, "second");
        assert_eq!(line_at(&lines, text.len() - 1).unwrap().text, "third");
    }

    #[test]
    fn test_requirements_span_bounded_by_next_heading() {
        let text = "Intro line\nRequirements:\n- Python\nBenefits:\n- Snacks\n";
        let lines = classify_lines(text);
        let (start, end) = requirements_span(&lines, text.len());
        assert_eq!(&text[start..end], "Requirements:\n- Python\n");
    }

    #[test]
    fn test_requirements_span_defaults_to_whole_text() {
        let text = "We need Python and SQL";
        let lines = classify_lines(text);
        assert_eq!(requirements_span(&lines, text.len()), (0, text.len()));
    }

    #[test]
    fn test_list_items_split_and_offsets() {
        let text = "Summary\nTechnical Skills: Python, SQL; Docker and Kubernetes\n";
        let items = list_items(text);
        let names: Vec<&str> = items.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(names, vec!["Python", "SQL", "Docker", "Kubernetes"]);
        assert_eq!(&text[items[1].offset..items[1].offset + 3], "SQL");
        assert!(items.iter().all(|i| i.cue == Cue::Neutral));
    }

    #[test]
    fn test_list_items_carry_label_cue() {
        let text = "Required: Causal Inference, RCTs\nPreferred: Health Economics (bonus)\n";
        let items = list_items(text);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].cue, Cue::Required);
        assert_eq!(items[2].text, "Health Economics");
        assert_eq!(items[2].cue, Cue::Preferred);
    }

    #[test]
    fn test_proficiency_phrase() {
        let items = list_items("I am proficient in Rust and Go. I also cook.");
        let names: Vec<&str> = items.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(names, vec!["Rust", "Go"]);
    }

    #[test]
    fn test_plausible_skill_bounds() {
        assert!(is_plausible_skill("SQL"));
        assert!(!is_plausible_skill("R"));
        assert!(!is_plausible_skill("one two three four five six seven"));
        assert!(!is_plausible_skill(&"x".repeat(61)));
        assert!(!is_plausible_skill("--"));
    }

    #[test]
    fn test_paragraphs() {
        let paras = paragraphs("  first line\nstill first\n\n\n second \n");
        assert_eq!(paras, vec!["first line\nstill first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_experience_blocks() {
        let text = "Jane Doe\n\nEXPERIENCE\nData Scientist\nAcme Health\n2019 - 2023\nBuilt churn models\n\nAnalyst\nBeta Corp\n2016 - 2019\n\nEDUCATION\nMSc Statistics\nUniversity of Leeds\n2016\n";
        let entries = experience(text);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].role, "Data Scientist");
        assert_eq!(entries[0].company, "Acme Health");
        assert_eq!(entries[0].duration, "2019 - 2023");
        assert_eq!(entries[0].description, "Built churn models");
        assert_eq!(entries[1].company, "Beta Corp");
    }

    #[test]
    fn test_education_blocks() {
        let text = "Education:\nMSc Statistics\nUniversity of Leeds\n2016\n\nBSc Biology, 2014\n";
        let entries = education(text);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].degree, "MSc Statistics");
        assert_eq!(entries[0].institution, "University of Leeds");
        assert_eq!(entries[0].year, "2016");
        assert_eq!(entries[1].degree, "BSc Biology");
        assert_eq!(entries[1].year, "2014");
    }
}
