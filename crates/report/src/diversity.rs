//! Best-effort repair of sections that open the same way
//!
//! Only the first [`OPENING_CHARS`] characters are compared. This is a
//! cheap textual patch, not a semantic duplicate check, and it never
//! calls the engine again.

use crisisbrief_llm::is_degraded;
use tracing::{debug, warn};

use crate::sections::ReportSections;

/// Characters compared between section openings
pub const OPENING_CHARS: usize = 50;

/// Openings this short are never treated as a collision
const MIN_COLLISION_CHARS: usize = 20;

const PROGRESSION_FRAMING: &str = "The disaster progressed as follows: ";
const REPORTS_ATTRIBUTION: &str = "According to initial reports, ";
const ASSESSMENT_ONGOING: &str = "Full assessment ongoing.";

const IMPACT_VOCABULARY: &[&str] = &[
    "casualt", "injur", "dead", "death", "killed", "fatalit", "damage", "destroyed",
    "evacuated", "displaced", "missing", "homeless",
];

const ATTRIBUTION_PHRASES: &[&str] = &[
    "according to",
    "preliminary estimate",
    "initial report",
    "initial assessment",
    "assessment ongoing",
    "reports indicate",
    "reportedly",
];

/// Repairs applied by [`ensure_section_diversity`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiversityOutcome {
    pub details_reframed: bool,
    pub impact_reattributed: bool,
}

/// Normalized opening used for collision checks
pub fn opening(text: &str) -> String {
    let head: String = text.chars().take(OPENING_CHARS).collect();
    head.to_lowercase().trim().to_string()
}

/// Opening of a section that takes part in collision checks
///
/// Degraded sections (sentinel or error text) never collide. Openings of
/// [`MIN_COLLISION_CHARS`] characters or fewer never collide either, and
/// this holds for the impact comparisons as well as introduction/details.
fn comparable_opening(text: &str) -> Option<String> {
    if is_degraded(text) {
        return None;
    }
    let start = opening(text);
    (start.chars().count() > MIN_COLLISION_CHARS).then_some(start)
}

fn collides(a: &Option<String>, b: &Option<String>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

/// Whether the text talks about casualties or damage
pub fn has_impact_vocabulary(text: &str) -> bool {
    let lower = text.to_lowercase();
    IMPACT_VOCABULARY.iter().any(|word| lower.contains(word))
}

fn has_attribution(text: &str) -> bool {
    let lower = text.to_lowercase();
    ATTRIBUTION_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Lower-case a sentence-initial capital unless it starts an acronym
fn decapitalize(text: &str) -> String {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(second)) if first.is_uppercase() && !second.is_uppercase() => {
            let mut out: String = first.to_lowercase().collect();
            out.push_str(&text[first.len_utf8()..]);
            out
        }
        _ => text.to_string(),
    }
}

/// Re-lead an impact section with an attribution phrase
fn reattribute(impact: &str) -> String {
    let trimmed = impact.trim_start();
    if let Some(rest) = trimmed.strip_prefix("The disaster") {
        return format!("Initial assessments indicate the disaster{}", rest);
    }
    format!("{}{}", REPORTS_ATTRIBUTION, decapitalize(trimmed))
}

/// Patch colliding openings in place
///
/// * introduction == details: details gets a progression framing clause.
/// * impact == introduction or details, and impact mentions casualties or
///   damage: impact is re-led with an attribution phrase.
///
/// Both checks ignore openings of 20 characters or fewer.
pub fn ensure_section_diversity(sections: &mut ReportSections) -> DiversityOutcome {
    let intro_start = comparable_opening(&sections.introduction);
    let details_start = comparable_opening(&sections.details);
    let impact_start = comparable_opening(&sections.impact);

    let mut outcome = DiversityOutcome::default();

    if collides(&intro_start, &details_start) {
        warn!("Introduction and Details sections open the same way, reframing Details");
        sections.details = format!("{}{}", PROGRESSION_FRAMING, sections.details);
        outcome.details_reframed = true;
    }

    if collides(&impact_start, &intro_start) || collides(&impact_start, &details_start) {
        if has_impact_vocabulary(&sections.impact) {
            warn!("Impact section repeats the event description, re-attributing");
            sections.impact = reattribute(&sections.impact);
            outcome.impact_reattributed = true;
        } else {
            debug!("Impact section repeats the event description but carries no figures");
        }
    }

    outcome
}

/// Make sure the impact section cites its figures
///
/// Text that already attributes is returned as is. Degraded sections are
/// left alone.
pub fn ensure_attribution(impact: &str) -> String {
    if is_degraded(impact) || has_attribution(impact) {
        return impact.to_string();
    }

    let has_figures = impact.chars().any(|c| c.is_ascii_digit());
    if has_figures || has_impact_vocabulary(impact) {
        format!("{}{}", REPORTS_ATTRIBUTION, decapitalize(impact.trim_start()))
    } else if impact.trim().is_empty() {
        ASSESSMENT_ONGOING.to_string()
    } else {
        format!("{} {}", impact.trim_end(), ASSESSMENT_ONGOING)
    }
}
