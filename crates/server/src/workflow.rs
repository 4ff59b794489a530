use crisisbrief_common::{CrisisBriefError, Result};
use crisisbrief_llm::{MultiLevelSummarizer, Summarizer, SummaryTriple};
use crisisbrief_report::{ExportBundle, StructuredOutputs, StructuredReportGenerator};
use crisisbrief_stt::{transcribe_bytes, Segment, Transcriber};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, info_span, Instrument, Span};

/// Pipeline execution steps
#[derive(Debug, Clone, Copy)]
pub enum PipelineStep {
    Transcription,
    Summarization,
    StructuredReport,
}

/// Summaries produced for one input text
///
/// Exactly one of `strategic` and `structured_report` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineOutputs {
    pub alert: String,
    pub operational: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_report: Option<String>,
}

impl From<SummaryTriple> for PipelineOutputs {
    fn from(triple: SummaryTriple) -> Self {
        Self {
            alert: triple.alert,
            operational: triple.operational,
            strategic: Some(triple.strategic),
            structured_report: None,
        }
    }
}

impl From<StructuredOutputs> for PipelineOutputs {
    fn from(outputs: StructuredOutputs) -> Self {
        Self {
            alert: outputs.alert,
            operational: outputs.operational,
            strategic: None,
            structured_report: Some(outputs.structured_report),
        }
    }
}

impl PipelineOutputs {
    /// Bundle for plain-text export
    pub fn into_export(self, original_text: &str, transcript: Option<String>) -> ExportBundle {
        ExportBundle {
            alert: self.alert,
            operational: self.operational,
            strategic: self.strategic,
            structured_report: self.structured_report,
            transcript,
            original_text: original_text.to_string(),
        }
    }
}

/// Transcript plus the summaries generated from it
#[derive(Debug, Clone, Serialize)]
pub struct AudioOutputs {
    pub transcript: String,
    pub segments: Vec<Segment>,
    #[serde(flatten)]
    pub summaries: PipelineOutputs,
}

/// Runs transcription and summarization for one engine configuration
pub struct ReportPipeline {
    levels: MultiLevelSummarizer,
    reports: StructuredReportGenerator,
    transcriber: Arc<dyn Transcriber>,
    span: Span,
}

impl ReportPipeline {
    pub fn new(summarizer: Arc<Summarizer>, transcriber: Arc<dyn Transcriber>) -> Self {
        let span = info_span!("pipeline", model = %summarizer.model_name());
        Self {
            levels: MultiLevelSummarizer::new(summarizer.clone()),
            reports: StructuredReportGenerator::new(summarizer),
            transcriber,
            span,
        }
    }

    /// Alert, operational and strategic summaries
    pub async fn generate_all_summaries(&self, text: &str) -> SummaryTriple {
        info!("Step {:?}", PipelineStep::Summarization);
        self.levels
            .generate_all(text)
            .instrument(self.span.clone())
            .await
    }

    /// Alert and operational summaries plus the structured report
    pub async fn generate_all_summaries_with_structured_report(&self, text: &str) -> StructuredOutputs {
        info!("Step {:?}", PipelineStep::StructuredReport);
        self.reports
            .generate_all_with_structured_report(text)
            .instrument(self.span.clone())
            .await
    }

    /// Either flavor of summaries
    pub async fn summarize(&self, text: &str, structured: bool) -> PipelineOutputs {
        if structured {
            self.generate_all_summaries_with_structured_report(text)
                .await
                .into()
        } else {
            self.generate_all_summaries(text).await.into()
        }
    }

    /// Transcribe uploaded audio and summarize the transcript
    ///
    /// Transcription runs on the blocking pool. An empty transcript is an
    /// error, not an empty result.
    pub async fn process_audio(
        &self,
        bytes: Vec<u8>,
        suffix: &str,
        language: Option<String>,
        structured: bool,
    ) -> Result<AudioOutputs> {
        info!(
            "Step {:?}: {} bytes ({})",
            PipelineStep::Transcription,
            bytes.len(),
            suffix
        );

        let transcriber = self.transcriber.clone();
        let suffix = suffix.to_string();
        let transcription = tokio::task::spawn_blocking(move || {
            transcribe_bytes(transcriber.as_ref(), &bytes, &suffix, language.as_deref())
        })
        .instrument(self.span.clone())
        .await
        .map_err(|e| CrisisBriefError::internal(format!("Transcription task failed: {}", e)))??;

        info!("Transcription completed: {} characters", transcription.text.len());

        let summaries = self.summarize(&transcription.text, structured).await;

        Ok(AudioOutputs {
            transcript: transcription.text,
            segments: transcription.segments,
            summaries,
        })
    }

    pub fn transcriber(&self) -> &Arc<dyn Transcriber> {
        &self.transcriber
    }
}
