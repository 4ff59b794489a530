//! Plain-text export of generated summaries

use serde::{Deserialize, Serialize};

const DOCUMENT_HEADER: &str = "DISASTER REPORT SUMMARIES";
const ALERT_HEADER: &str = "GENERAL PUBLIC ALERT (1-line, high-abstraction):";
const OPERATIONAL_HEADER: &str = "EMERGENCY RESPONDER OPERATIONAL SUMMARY (medium abstraction):";
const STRATEGIC_HEADER: &str = "AUTHORITIES STRATEGIC SUMMARY (low abstraction):";
const STRUCTURED_HEADER: &str =
    "AUTHORITIES STRATEGIC STRUCTURED DISASTER ASSESSMENT REPORT (low abstraction):";
const TRANSCRIPT_HEADER: &str = "TRANSCRIBED TEXT:";

/// Outputs collected for one export file
///
/// The structured report takes precedence over the strategic summary when
/// both are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportBundle {
    pub alert: String,
    pub operational: String,
    #[serde(default)]
    pub strategic: Option<String>,
    #[serde(default)]
    pub structured_report: Option<String>,
    #[serde(default)]
    pub transcript: Option<String>,
    pub original_text: String,
}

impl ExportBundle {
    /// Render the bundle as a downloadable text file
    pub fn render_plain_text(&self) -> String {
        let (authorities_header, authorities) = match (&self.structured_report, &self.strategic) {
            (Some(report), _) => (STRUCTURED_HEADER, report.as_str()),
            (None, Some(strategic)) => (STRATEGIC_HEADER, strategic.as_str()),
            (None, None) => (STRATEGIC_HEADER, ""),
        };

        let mut out = String::new();
        out.push_str(DOCUMENT_HEADER);
        out.push_str("\n\n");

        for (header, body) in [
            (ALERT_HEADER, self.alert.as_str()),
            (OPERATIONAL_HEADER, self.operational.as_str()),
            (authorities_header, authorities),
        ] {
            out.push_str(&format!("{}\n{}\n\n", header, body));
        }

        if let Some(transcript) = &self.transcript {
            out.push_str(&format!("{}\n{}\n\n", TRANSCRIPT_HEADER, transcript));
        }

        out.push_str(&format!("---\nOriginal Text:\n{}\n", self.original_text));
        out
    }

    /// File name offered for downloads
    pub fn file_name(&self) -> &'static str {
        "disaster_report_summaries.txt"
    }
}
