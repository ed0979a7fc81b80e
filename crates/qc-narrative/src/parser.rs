//! Strict section parser for generated report text.
//!
//! Accepts markdown with `#`-style headings. Known headings map onto
//! [`SectionKind`]; text under unknown headings (the document title, stray
//! preambles) is discarded. A horizontal rule closes the current section and
//! opens the footer, which becomes the Metadata section unless an explicit
//! Metadata heading exists. The result is either every required section with
//! a non-empty body, in canonical order, or `MalformedGeneration`.

use once_cell::sync::Lazy;
use qc_core::{NarrativeSection, QcError, SectionKind, Status};
use regex::Regex;

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.+?)\s*#*\s*$").expect("valid heading regex"));

static RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:-{3,}|\*{3,}|_{3,})\s*$").expect("valid rule regex"));

static LIST_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:\d+[.)]|[-*+])\s+\S").expect("valid list regex"));

static STATUS_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(OK|WARNING|CRITICAL|UNDEFINED)\b").expect("valid status word regex")
});

const CANONICAL_ORDER: [SectionKind; 6] = [
    SectionKind::NoData,
    SectionKind::KeyMetrics,
    SectionKind::StatusAssessment,
    SectionKind::TopActions,
    SectionKind::RootCauses,
    SectionKind::Metadata,
];

fn rank(kind: SectionKind) -> usize {
    CANONICAL_ORDER
        .iter()
        .position(|k| *k == kind)
        .unwrap_or(CANONICAL_ORDER.len())
}

/// Heading text with emphasis markers dropped, lowercased
fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '*' | '_' | '`'))
        .collect::<String>()
        .trim()
        .to_lowercase()
}

/// Classify a heading. The second value is any status word carried in the
/// heading itself (`Status: **CRITICAL**`), which belongs to the body.
fn classify_heading(raw: &str) -> Option<(SectionKind, Option<String>)> {
    let text = normalize(raw);
    if text.contains("key metric") {
        return Some((SectionKind::KeyMetrics, None));
    }
    if text.contains("root cause") {
        return Some((SectionKind::RootCauses, None));
    }
    if text.starts_with("status") {
        let rest = text
            .trim_start_matches("status")
            .trim_start_matches(" assessment")
            .trim_start_matches(|c: char| c == ':' || c == '-' || c.is_whitespace())
            .trim();
        let carried = (!rest.is_empty()).then(|| raw.trim().to_string());
        return Some((SectionKind::StatusAssessment, carried));
    }
    if text.contains("action") {
        return Some((SectionKind::TopActions, None));
    }
    if text.starts_with("metadata") {
        return Some((SectionKind::Metadata, None));
    }
    None
}

fn strip_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(after_open) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (```markdown) along with the opening fence
    let body = after_open.split_once('\n').map(|(_, b)| b).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn join_body(lines: &[&str]) -> String {
    lines.join("\n").trim().to_string()
}

#[derive(Clone, Copy)]
enum Cursor {
    /// Before the first heading, or under an unknown heading
    Discard,
    Section(SectionKind),
    Footer,
}

/// Count list items in a Top Actions body
pub fn count_list_items(body: &str) -> usize {
    body.lines().filter(|l| LIST_ITEM.is_match(l)).count()
}

/// Split a Status Assessment body into the status its lead line claims and
/// the commentary after it. A lead line naming a status, or starting with
/// "Status", is consumed; anything else is commentary.
pub fn split_status_lead(body: &str) -> (Option<Status>, &str) {
    let body = body.trim();
    let (lead, rest) = body.split_once('\n').unwrap_or((body, ""));

    let claimed = STATUS_WORD
        .captures(lead)
        .and_then(|caps| caps.get(1))
        .map(|m| match m.as_str() {
            "OK" => Status::Ok,
            "WARNING" => Status::Warning,
            "CRITICAL" => Status::Critical,
            _ => Status::Undefined,
        });

    if claimed.is_some() || normalize(lead).starts_with("status") {
        (claimed, rest.trim())
    } else {
        (None, body)
    }
}

/// Parse generated markdown into canonical sections
pub fn parse_sections(raw: &str, min_actions: usize) -> Result<Vec<NarrativeSection>, QcError> {
    let text = strip_fence(raw);

    let mut sections: Vec<(SectionKind, Vec<&str>)> = Vec::new();
    let mut footer: Vec<&str> = Vec::new();
    let mut cursor = Cursor::Discard;
    let mut carried: Option<String> = None;

    for line in text.lines() {
        if let Some(caps) = HEADING.captures(line) {
            let heading = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            cursor = match classify_heading(heading) {
                Some((kind, status_word)) => {
                    if sections.iter().any(|(k, _)| *k == kind) {
                        return Err(QcError::MalformedGeneration(format!(
                            "duplicate section '{}'",
                            kind.title()
                        )));
                    }
                    sections.push((kind, Vec::new()));
                    if status_word.is_some() {
                        carried = status_word;
                    }
                    Cursor::Section(kind)
                }
                None => Cursor::Discard,
            };
            continue;
        }

        if RULE.is_match(line) {
            cursor = Cursor::Footer;
            continue;
        }

        match cursor {
            Cursor::Discard => {}
            Cursor::Footer => footer.push(line),
            Cursor::Section(kind) => {
                if let Some((_, body)) = sections.iter_mut().find(|(k, _)| *k == kind) {
                    body.push(line);
                }
            }
        }
    }

    let mut out: Vec<NarrativeSection> = sections
        .iter()
        .map(|(kind, lines)| {
            let mut body = join_body(lines);
            if *kind == SectionKind::StatusAssessment {
                if let Some(word) = &carried {
                    body = if body.is_empty() {
                        word.clone()
                    } else {
                        format!("{}\n\n{}", word, body)
                    };
                }
            }
            NarrativeSection::new(*kind, body)
        })
        .collect();

    let footer_body = join_body(&footer);
    if !footer_body.is_empty() && !out.iter().any(|s| s.kind == SectionKind::Metadata) {
        out.push(NarrativeSection::new(SectionKind::Metadata, footer_body));
    }

    // Optional sections that came back empty carry nothing worth rendering
    out.retain(|s| s.kind.is_required() || !s.body.is_empty());

    validate(&out, min_actions)?;
    out.sort_by_key(|s| rank(s.kind));
    Ok(out)
}

fn validate(sections: &[NarrativeSection], min_actions: usize) -> Result<(), QcError> {
    for kind in SectionKind::REQUIRED {
        match sections.iter().find(|s| s.kind == kind) {
            None => {
                return Err(QcError::MalformedGeneration(format!(
                    "missing required section '{}'",
                    kind.title()
                )))
            }
            Some(s) if s.body.is_empty() => {
                return Err(QcError::MalformedGeneration(format!(
                    "section '{}' is empty",
                    kind.title()
                )))
            }
            Some(_) => {}
        }
    }

    if let Some(actions) = sections.iter().find(|s| s.kind == SectionKind::TopActions) {
        let found = count_list_items(&actions.body);
        if found < min_actions {
            return Err(QcError::MalformedGeneration(format!(
                "expected at least {} actions, found {}",
                min_actions, found
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "\
## Quality Control Report

### Key Metrics
| Metric | Value | Status |
|--------|-------|--------|
| Total Processed | 100 | - |

### Status: **CRITICAL**

Immediate Action Required: loss rate at 20%.

### Top 3 Actions
1. Inspect drying line moisture sensors
2. Re-sort the last two batches manually
3. Review supplier intake for the morning shift

### Root Causes (2-3 max)
- Extended storage before intake
- Humidity control drift

---
*Report period: Last 24 hours*
*Requires Quality Manager approval before distribution*
";

    fn kinds(sections: &[NarrativeSection]) -> Vec<SectionKind> {
        sections.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn test_parses_well_formed_report() {
        let sections = parse_sections(WELL_FORMED, 3).unwrap();
        assert_eq!(
            kinds(&sections),
            vec![
                SectionKind::KeyMetrics,
                SectionKind::StatusAssessment,
                SectionKind::TopActions,
                SectionKind::RootCauses,
                SectionKind::Metadata,
            ]
        );
        let status = &sections[1];
        assert!(status.body.starts_with("Status: **CRITICAL**"));
        assert!(status.body.contains("Immediate Action Required"));
        assert!(sections[4].body.contains("Quality Manager approval"));
        assert!(!sections[3].body.contains("Report period"));
    }

    #[test]
    fn test_code_fence_is_stripped() {
        let fenced = format!("```markdown\n{}\n```", WELL_FORMED);
        assert_eq!(parse_sections(&fenced, 3).unwrap().len(), 5);
    }

    #[test]
    fn test_missing_required_section_is_malformed() {
        let raw = "### Key Metrics\n| a | b |\n\n### Top Actions\n1. a\n2. b\n3. c\n";
        let err = parse_sections(raw, 3).unwrap_err();
        assert!(matches!(err, QcError::MalformedGeneration(ref m) if m.contains("Status Assessment")));
    }

    #[test]
    fn test_empty_required_section_is_malformed() {
        let raw = "### Key Metrics\n\n### Status Assessment\nOK\n\n### Top Actions\n1. a\n2. b\n3. c\n";
        let err = parse_sections(raw, 3).unwrap_err();
        assert!(matches!(err, QcError::MalformedGeneration(ref m) if m.contains("empty")));
    }

    #[test]
    fn test_too_few_actions_is_malformed() {
        let raw = "### Key Metrics\nx\n### Status\nOK\n### Top Actions\n1. only one\n- and two\n";
        let err = parse_sections(raw, 3).unwrap_err();
        assert!(matches!(err, QcError::MalformedGeneration(ref m) if m.contains("found 2")));
    }

    #[test]
    fn test_duplicate_heading_is_malformed() {
        let raw = "### Key Metrics\nx\n### Key Metrics\ny\n";
        assert!(matches!(
            parse_sections(raw, 0),
            Err(QcError::MalformedGeneration(_))
        ));
    }

    #[test]
    fn test_unknown_headings_are_dropped() {
        let raw = "Sure, here is the report.\n# Overview\nchatter\n### Key Metrics\nx\n### Status Assessment\nfine\n### Actions\n1. a\n2. b\n3. c\n";
        let sections = parse_sections(raw, 3).unwrap();
        assert_eq!(sections.len(), 3);
        assert!(sections.iter().all(|s| !s.body.contains("chatter")));
    }

    #[test]
    fn test_explicit_metadata_wins_over_footer() {
        let raw = "### Key Metrics\nx\n### Status\nOK\n### Top Actions\n1. a\n2. b\n3. c\n### Metadata\nmodel run 7\n---\nfooter text\n";
        let sections = parse_sections(raw, 3).unwrap();
        let meta = sections.iter().find(|s| s.kind == SectionKind::Metadata).unwrap();
        assert_eq!(meta.body, "model run 7");
    }

    #[test]
    fn test_status_lead_is_split_from_commentary() {
        let (claimed, rest) = split_status_lead("Status: **OK**\n\nNormal operations, no action needed.");
        assert_eq!(claimed, Some(Status::Ok));
        assert_eq!(rest, "Normal operations, no action needed.");

        let (claimed, rest) = split_status_lead("Status Assessment\nWithin limits.");
        assert_eq!(claimed, None);
        assert_eq!(rest, "Within limits.");

        let (claimed, rest) = split_status_lead("Loss is climbing on line 2.\nWatch it.");
        assert_eq!(claimed, None);
        assert_eq!(rest, "Loss is climbing on line 2.\nWatch it.");
    }

    #[test]
    fn test_count_list_items() {
        assert_eq!(count_list_items("1. a\n2) b\n- c\n* d\n+ e\nprose"), 5);
        assert_eq!(count_list_items("-nospace\n1.x"), 0);
    }
}
