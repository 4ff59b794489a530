//! Report sections and their extraction prompts

use serde::Serialize;

use crate::disaster::DisasterType;

/// Characters of source text used to seed the title prompt
pub const TITLE_SEED_CHARS: usize = 200;

/// The six blocks of a structured report, in document order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKey {
    Title,
    Introduction,
    Details,
    Impact,
    Response,
    Aftermath,
}

impl SectionKey {
    pub const ALL: [SectionKey; 6] = [
        SectionKey::Title,
        SectionKey::Introduction,
        SectionKey::Details,
        SectionKey::Impact,
        SectionKey::Response,
        SectionKey::Aftermath,
    ];

    /// Canonical document header
    pub fn header(&self) -> &'static str {
        match self {
            Self::Title => "**TITLE & BYLINE**",
            Self::Introduction => "**INTRODUCTION (What, When, Where)**",
            Self::Details => "**DETAILS OF THE EVENT (How)**",
            Self::Impact => "**IMPACT & DAMAGE (Figures & Facts)**",
            Self::Response => "**RESPONSE & RELIEF EFFORTS**",
            Self::Aftermath => "**AFTERMATH & LESSONS LEARNED**",
        }
    }

    /// Label used in logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::Title => "Title & Byline",
            Self::Introduction => "Introduction",
            Self::Details => "Details",
            Self::Impact => "Impact",
            Self::Response => "Response",
            Self::Aftermath => "Aftermath",
        }
    }

    /// `(min_length, max_length)` for this section
    pub fn bounds(&self) -> (usize, usize) {
        match self {
            Self::Title => (5, 15),
            Self::Introduction => (30, 80),
            Self::Details => (40, 100),
            Self::Impact => (40, 100),
            Self::Response => (30, 80),
            Self::Aftermath => (30, 80),
        }
    }

    /// Extraction prompt for this section
    pub fn prompt(&self, disaster: DisasterType, text: &str) -> String {
        match self {
            Self::Title => {
                let seed: String = text.chars().take(TITLE_SEED_CHARS).collect();
                format!(
                    "Create a concise, professional title for this {} disaster report: {}",
                    disaster, seed
                )
            }
            Self::Introduction => format!(
                "Question: What type of disaster was this {}, when did it occur, and where? \
                 Answer ONLY these three questions in 2-3 sentences. \
                 Do not describe how it happened or its impact. Text: {}",
                disaster, text
            ),
            Self::Details => format!(
                "Question: How did this {} develop and progress? Describe the sequence, intensity changes, \
                 weather conditions, and physical processes. \
                 Do NOT mention what/when/where or casualties. Text: {}",
                disaster, text
            ),
            Self::Impact => format!(
                "Question: What are the human casualties, injuries, deaths, displaced people, and damage to \
                 buildings and infrastructure? Extract ONLY numbers and damage facts. \
                 Use 'according to reports' or 'preliminary estimates'. If no numbers, say 'assessment ongoing'. \
                 Do NOT describe the disaster event. Text: {}",
                text
            ),
            Self::Response => format!(
                "Question: What rescue operations, emergency services, government actions, relief efforts, \
                 and aid were deployed? Extract ONLY response actions. \
                 Do NOT describe the disaster or impact. Text: {}",
                text
            ),
            Self::Aftermath => format!(
                "Question: What are the ongoing risks, recovery challenges, and lessons about preparedness or \
                 early warning systems after this {}? Focus on future implications. \
                 If not mentioned, briefly note recovery will be challenging. \
                 Do NOT repeat disaster or response details. Text: {}",
                disaster, text
            ),
        }
    }
}

/// Generated text of all six sections
///
/// Every section is a field, so a report can never be assembled with one
/// missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSections {
    pub title: String,
    pub introduction: String,
    pub details: String,
    pub impact: String,
    pub response: String,
    pub aftermath: String,
}

impl ReportSections {
    pub fn get(&self, key: SectionKey) -> &str {
        match key {
            SectionKey::Title => &self.title,
            SectionKey::Introduction => &self.introduction,
            SectionKey::Details => &self.details,
            SectionKey::Impact => &self.impact,
            SectionKey::Response => &self.response,
            SectionKey::Aftermath => &self.aftermath,
        }
    }

    pub fn get_mut(&mut self, key: SectionKey) -> &mut String {
        match key {
            SectionKey::Title => &mut self.title,
            SectionKey::Introduction => &mut self.introduction,
            SectionKey::Details => &mut self.details,
            SectionKey::Impact => &mut self.impact,
            SectionKey::Response => &mut self.response,
            SectionKey::Aftermath => &mut self.aftermath,
        }
    }

    pub fn set(&mut self, key: SectionKey, text: String) {
        *self.get_mut(key) = text;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_bounds_are_valid() {
        for key in SectionKey::ALL {
            let (min, max) = key.bounds();
            assert!(min <= max, "{:?}", key);
        }
        assert_eq!(SectionKey::Title.bounds(), (5, 15));
        assert_eq!(SectionKey::Details.bounds(), (40, 100));
    }

    #[test]
    fn test_headers_are_unique() {
        let headers: HashSet<_> = SectionKey::ALL.iter().map(|k| k.header()).collect();
        assert_eq!(headers.len(), 6);
    }

    #[test]
    fn test_title_prompt_seeds_type_and_prefix() {
        let text = "x".repeat(500);
        let prompt = SectionKey::Title.prompt(DisasterType::Flood, &text);
        assert!(prompt.contains("this flood disaster report"));
        assert_eq!(prompt.matches('x').count(), TITLE_SEED_CHARS);
    }

    #[test]
    fn test_section_prompts_embed_full_text() {
        let text = "Heavy rain caused the river to burst its banks.";
        for key in &SectionKey::ALL[1..] {
            let prompt = key.prompt(DisasterType::Flood, text);
            assert!(prompt.starts_with("Question:"), "{:?}", key);
            assert!(prompt.ends_with(text), "{:?}", key);
        }
    }

    #[test]
    fn test_get_and_set() {
        let mut sections = ReportSections::default();
        sections.set(SectionKey::Impact, "According to reports, 5 dead.".to_string());
        assert_eq!(sections.get(SectionKey::Impact), "According to reports, 5 dead.");
        assert_eq!(sections.get(SectionKey::Response), "");
    }
}
