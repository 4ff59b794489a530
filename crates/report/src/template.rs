//! Document template and header normalization

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::sections::{ReportSections, SectionKey};

/// Byline text before the date
pub const BYLINE_PREFIX: &str = "Disaster Assessment Report | Generated on ";

/// Lines longer than this are never headers
const MAX_HEADER_CHARS: usize = 60;

static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(#{1,6}\s*)?(\*{1,2})?\s*(title|byline|introduction|details|impact|response|aftermath|lessons)\b")
        .expect("invalid header regex")
});

/// Any canonical header, with or without its `**` markup, anywhere in a line
static CANONICAL_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    let alternatives = SectionKey::ALL
        .iter()
        .map(|key| regex::escape(key.header().trim_matches('*')))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\*{{0,2}}[ \t]*(?:{})[ \t]*\*{{0,2}}:?", alternatives))
        .expect("invalid canonical header regex")
});

static BLANK_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("invalid blank-run regex"));

/// Today's date in local time, for bylines
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// `Disaster Assessment Report | Generated on October 19, 2026`
pub fn format_byline(date: NaiveDate) -> String {
    format!("{}{}", BYLINE_PREFIX, date.format("%B %d, %Y"))
}

/// Section a header-looking line refers to
///
/// A line counts as a header only when it starts with a known keyword and
/// is marked as one: markdown markup, a trailing colon, or all capitals.
/// Sentences (trailing period) and long lines are never headers.
pub fn match_header(line: &str) -> Option<SectionKey> {
    let line = line.trim();
    if line.is_empty() || line.chars().count() > MAX_HEADER_CHARS || line.ends_with('.') {
        return None;
    }

    let caps = HEADER_RE.captures(line)?;
    let marked = caps.get(1).is_some()
        || caps.get(2).is_some()
        || line.trim_end_matches('*').ends_with(':')
        || !line.chars().any(char::is_lowercase);
    if !marked {
        return None;
    }

    match caps[3].to_lowercase().as_str() {
        "title" | "byline" => Some(SectionKey::Title),
        "introduction" => Some(SectionKey::Introduction),
        "details" => Some(SectionKey::Details),
        "impact" => Some(SectionKey::Impact),
        "response" => Some(SectionKey::Response),
        "aftermath" | "lessons" => Some(SectionKey::Aftermath),
        _ => None,
    }
}

/// Remove every canonical header from `text`, wherever it occurs
pub fn strip_canonical_headers(text: &str) -> String {
    let stripped = CANONICAL_HEADER_RE.replace_all(text, "");
    let lines = stripped.lines().map(str::trim).collect::<Vec<_>>().join("\n");
    BLANK_RUN_RE
        .replace_all(&lines, "\n\n")
        .trim()
        .to_string()
}

/// Drop headers echoed back by the engine
///
/// Canonical headers go wherever they appear; other header-looking lines
/// go when they stand alone.
pub fn strip_header_lines(text: &str) -> String {
    strip_canonical_headers(text)
        .lines()
        .filter(|line| match_header(line).is_none())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Assemble the six sections into the final document
pub fn assemble_report(sections: &ReportSections, date: NaiveDate) -> String {
    let mut blocks = Vec::with_capacity(SectionKey::ALL.len());

    blocks.push(format!(
        "{}\n{}\n{}",
        SectionKey::Title.header(),
        sections.title,
        format_byline(date)
    ));

    for key in &SectionKey::ALL[1..] {
        blocks.push(format!("{}\n{}", key.header(), sections.get(*key)));
    }

    blocks.join("\n\n")
}

/// Canonicalize section headers in free text
///
/// Header-looking lines become the canonical headers, a repeated header of
/// the current section is dropped, runs of blank lines collapse to one and
/// a Title & Byline block is added when missing. All other lines are kept
/// (trimmed).
pub fn normalize_headers(text: &str, date: NaiveDate) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current: Option<SectionKey> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            lines.push(String::new());
            continue;
        }

        match match_header(trimmed) {
            Some(key) if Some(key) == current => {}
            Some(key) => {
                if lines.last().is_some_and(|l| !l.is_empty()) {
                    lines.push(String::new());
                }
                lines.push(key.header().to_string());
                current = Some(key);
            }
            None => lines.push(trimmed.to_string()),
        }
    }

    let joined = lines.join("\n");
    let mut result = BLANK_RUN_RE
        .replace_all(&joined, "\n\n")
        .trim()
        .to_string();

    if !result.contains(SectionKey::Title.header()) {
        result = format!(
            "{}\n{}\n\n{}",
            SectionKey::Title.header(),
            format_byline(date),
            result
        )
        .trim_end()
        .to_string();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn sample_sections() -> ReportSections {
        ReportSections {
            title: "Earthquake Strikes Northern Region".to_string(),
            introduction: "An earthquake struck the north at 3:45 AM.".to_string(),
            details: "The rupture propagated along the fault.".to_string(),
            impact: "According to reports, 50 injured and 5 dead.".to_string(),
            response: "Rescue teams were deployed.".to_string(),
            aftermath: "Aftershocks remain a risk.".to_string(),
        }
    }

    #[test]
    fn test_byline_format() {
        assert_eq!(
            format_byline(date()),
            "Disaster Assessment Report | Generated on October 19, 2026"
        );
    }

    #[test]
    fn test_assembled_headers_in_order_once_each() {
        let doc = assemble_report(&sample_sections(), date());

        let mut last = 0;
        for key in SectionKey::ALL {
            assert_eq!(doc.matches(key.header()).count(), 1, "{:?}", key);
            let pos = doc.find(key.header()).unwrap();
            assert!(pos >= last);
            last = pos;
        }
        assert!(doc.starts_with("**TITLE & BYLINE**\nEarthquake Strikes Northern Region\nDisaster Assessment Report"));
    }

    #[test]
    fn test_match_header_variants() {
        assert_eq!(match_header("**Impact & Damage**"), Some(SectionKey::Impact));
        assert_eq!(match_header("## Details of the Event"), Some(SectionKey::Details));
        assert_eq!(match_header("RESPONSE"), Some(SectionKey::Response));
        assert_eq!(match_header("Lessons learned:"), Some(SectionKey::Aftermath));
        assert_eq!(match_header("Byline:"), Some(SectionKey::Title));
    }

    #[test]
    fn test_body_text_is_not_a_header() {
        assert_eq!(match_header("Response teams arrived quickly."), None);
        assert_eq!(match_header("Impact was severe in the east"), None);
        assert_eq!(match_header("Rescue teams were deployed"), None);
        assert_eq!(match_header(&format!("**IMPACT** {}", "x".repeat(80))), None);
    }

    #[test]
    fn test_strip_header_lines() {
        let text = "**IMPACT & DAMAGE**\nAccording to reports, 5 dead.\nIMPACT:";
        assert_eq!(strip_header_lines(text), "According to reports, 5 dead.");
    }

    #[test]
    fn test_strip_inline_canonical_headers() {
        let text = "**IMPACT & DAMAGE (Figures & Facts)** According to reports, 50 injured.\n\n\n\
                    Roads closed. **RESPONSE & RELIEF EFFORTS**";
        assert_eq!(
            strip_header_lines(text),
            "According to reports, 50 injured.\n\nRoads closed."
        );
        assert_eq!(
            strip_canonical_headers("Quake Report\n**IMPACT & DAMAGE (Figures & Facts)"),
            "Quake Report"
        );
    }

    #[test]
    fn test_normalize_canonicalizes_headers() {
        let text = "Introduction:\nA flood hit the valley.\n\n\n\n## impact\nAccording to reports, 3 dead.\n**Impact**\nRoads closed.";
        let out = normalize_headers(text, date());

        assert!(out.starts_with("**TITLE & BYLINE**\nDisaster Assessment Report | Generated on October 19, 2026"));
        assert!(out.contains("**INTRODUCTION (What, When, Where)**\nA flood hit the valley."));
        assert_eq!(out.matches("**IMPACT & DAMAGE (Figures & Facts)**").count(), 1);
        assert!(out.contains("Roads closed."));
        assert!(!out.contains("\n\n\n"));
    }

    #[test]
    fn test_assembled_report_is_a_fixed_point() {
        let doc = assemble_report(&sample_sections(), date());
        assert_eq!(normalize_headers(&doc, date()), doc);
    }

    #[test]
    fn test_normalize_empty_text() {
        let out = normalize_headers("", date());
        assert_eq!(out, format!("**TITLE & BYLINE**\n{}", format_byline(date())));
    }
}
