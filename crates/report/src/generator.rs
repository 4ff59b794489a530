use chrono::NaiveDate;
use crisisbrief_llm::{MultiLevelSummarizer, Summarizer, EMPTY_INPUT_SENTINEL};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument, Span};

use crate::disaster::DisasterType;
use crate::diversity::{ensure_attribution, ensure_section_diversity, DiversityOutcome};
use crate::sections::{ReportSections, SectionKey};
use crate::template::{assemble_report, strip_canonical_headers, strip_header_lines, today};

/// Progress of one report generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStage {
    Start,
    TitleGenerated,
    SectionsGenerated,
    DiversityChecked,
    Assembled,
    Done,
}

impl ReportStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::TitleGenerated => "title_generated",
            Self::SectionsGenerated => "sections_generated",
            Self::DiversityChecked => "diversity_checked",
            Self::Assembled => "assembled",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for ReportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated report with the intermediate results kept
#[derive(Debug, Clone, Serialize)]
pub struct StructuredReport {
    pub disaster_type: DisasterType,
    pub sections: ReportSections,
    #[serde(skip)]
    pub diversity: DiversityOutcome,
    pub document: String,
}

/// Alert, operational brief and structured authorities report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuredOutputs {
    pub alert: String,
    pub operational: String,
    pub structured_report: String,
}

/// Builds the six-section disaster assessment document
///
/// Each section is extracted with its own question-style prompt. Section
/// calls are sequential and a failed call only degrades its own section.
pub struct StructuredReportGenerator {
    summarizer: Arc<Summarizer>,
    levels: MultiLevelSummarizer,
    span: Span,
}

impl StructuredReportGenerator {
    pub fn new(summarizer: Arc<Summarizer>) -> Self {
        let span = info_span!(parent: summarizer.span(), "structured_report");
        let levels = MultiLevelSummarizer::new(summarizer.clone());
        Self {
            summarizer,
            levels,
            span,
        }
    }

    /// Structured report document for `text`, dated today
    pub async fn generate_structured_report(&self, text: &str) -> String {
        self.build_report(text, today()).await.document
    }

    /// Alert and operational passes followed by the structured report
    pub async fn generate_all_with_structured_report(&self, text: &str) -> StructuredOutputs {
        let (alert, operational) = self.levels.generate_alert_and_operational(text).await;
        let structured_report = self.generate_structured_report(text).await;

        StructuredOutputs {
            alert,
            operational,
            structured_report,
        }
    }

    /// Run the full report pipeline with an explicit byline date
    pub async fn build_report(&self, text: &str, date: NaiveDate) -> StructuredReport {
        async {
            let mut stage = ReportStage::Start;
            let disaster_type = DisasterType::detect(text);
            info!("Generating structured report (type: {})", disaster_type);

            let mut sections = ReportSections {
                title: clean_title(&self.section(SectionKey::Title, disaster_type, text).await),
                ..Default::default()
            };
            stage = advance(stage, ReportStage::TitleGenerated);

            for key in &SectionKey::ALL[1..] {
                let raw = self.section(*key, disaster_type, text).await;
                sections.set(*key, strip_header_lines(&raw));
            }
            sections.introduction = relead_introduction(&sections.introduction);
            stage = advance(stage, ReportStage::SectionsGenerated);

            let diversity = ensure_section_diversity(&mut sections);
            sections.impact = ensure_attribution(&sections.impact);
            stage = advance(stage, ReportStage::DiversityChecked);

            let document = assemble_report(&sections, date);
            stage = advance(stage, ReportStage::Assembled);

            info!("Structured report generated ({} characters)", document.len());
            advance(stage, ReportStage::Done);

            StructuredReport {
                disaster_type,
                sections,
                diversity,
                document,
            }
        }
        .instrument(self.span.clone())
        .await
    }

    async fn section(&self, key: SectionKey, disaster: DisasterType, text: &str) -> String {
        if text.trim().is_empty() {
            return EMPTY_INPUT_SENTINEL.to_string();
        }

        let (min_length, max_length) = key.bounds();
        let prompt = key.prompt(disaster, text);
        let result = self
            .summarizer
            .generate(&prompt, max_length, min_length, false)
            .await;

        debug!("{} section: {} characters", key.label(), result.len());
        result
    }
}

fn advance(from: ReportStage, to: ReportStage) -> ReportStage {
    debug!("Report stage {} -> {}", from, to);
    to
}

/// First line of a generated title without headers, markup, a `Title:`
/// label or trailing punctuation
fn clean_title(raw: &str) -> String {
    let stripped = strip_canonical_headers(raw);
    let first_line = stripped
        .lines()
        .map(str::trim)
        .find(|line| !line.trim_matches('*').trim().is_empty())
        .unwrap_or_default();

    let mut title = first_line.trim_matches('*').trim();
    if title.get(..6).is_some_and(|label| label.eq_ignore_ascii_case("title:")) {
        title = title[6..].trim_start();
    }
    title
        .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!'))
        .trim()
        .to_string()
}

/// `A powerful earthquake struck` becomes `The earthquake struck`
fn relead_introduction(intro: &str) -> String {
    match intro.strip_prefix("A powerful ") {
        Some(rest) => format!("The {}", rest),
        None => intro.to_string(),
    }
}
