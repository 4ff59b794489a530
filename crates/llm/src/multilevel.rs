use std::sync::Arc;
use tracing::{info, info_span, Instrument, Span};

use crate::prompts::{AbstractionLevel, AudienceRole};
use crate::summarize::Summarizer;
use crate::types::{GenerationRequest, SummaryTriple};

/// One fixed generation pass of the multi-level plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryPass {
    pub name: &'static str,
    pub role: AudienceRole,
    pub level: AbstractionLevel,
    pub min_length: usize,
    pub max_length: usize,
}

impl SummaryPass {
    /// Generation request for this pass over `text`
    pub fn request(&self, text: &str) -> GenerationRequest {
        GenerationRequest::new(text, self.min_length, self.max_length)
            .for_audience(self.role, self.level)
    }
}

/// One-line public alert
pub const ALERT_PASS: SummaryPass = SummaryPass {
    name: "alert",
    role: AudienceRole::GeneralPublic,
    level: AbstractionLevel::High,
    min_length: 8,
    max_length: 20,
};

/// Responder brief
pub const OPERATIONAL_PASS: SummaryPass = SummaryPass {
    name: "operational",
    role: AudienceRole::EmergencyResponders,
    level: AbstractionLevel::Medium,
    min_length: 25,
    max_length: 60,
};

/// Authorities summary
pub const STRATEGIC_PASS: SummaryPass = SummaryPass {
    name: "strategic",
    role: AudienceRole::Authorities,
    level: AbstractionLevel::Low,
    min_length: 60,
    max_length: 150,
};

/// Passes in execution order
pub const PASS_PLAN: [SummaryPass; 3] = [ALERT_PASS, OPERATIONAL_PASS, STRATEGIC_PASS];

/// Drives the alert / operational / strategic passes
///
/// Passes run one after another and share nothing but the input text; a
/// degraded pass leaves its slot holding the degraded string.
pub struct MultiLevelSummarizer {
    summarizer: Arc<Summarizer>,
    span: Span,
}

impl MultiLevelSummarizer {
    pub fn new(summarizer: Arc<Summarizer>) -> Self {
        let span = info_span!(parent: summarizer.span(), "multi_level");
        Self { summarizer, span }
    }

    pub fn summarizer(&self) -> &Arc<Summarizer> {
        &self.summarizer
    }

    /// Run all three passes
    pub async fn generate_all(&self, text: &str) -> SummaryTriple {
        async {
            info!("Generating multi-level summaries ({} chars)", text.len());

            let alert = self.run_pass(&ALERT_PASS, text).await;
            let operational = self.run_pass(&OPERATIONAL_PASS, text).await;
            let strategic = self.run_pass(&STRATEGIC_PASS, text).await;

            info!("All summaries generated");
            SummaryTriple::new(alert, operational, strategic)
        }
        .instrument(self.span.clone())
        .await
    }

    /// Run only the alert and operational passes
    pub async fn generate_alert_and_operational(&self, text: &str) -> (String, String) {
        async {
            let alert = self.run_pass(&ALERT_PASS, text).await;
            let operational = self.run_pass(&OPERATIONAL_PASS, text).await;
            (alert, operational)
        }
        .instrument(self.span.clone())
        .await
    }

    /// Run a single pass
    pub async fn run_pass(&self, pass: &SummaryPass, text: &str) -> String {
        info!(
            "Pass '{}' ({} / {}, {}..={})",
            pass.name, pass.role, pass.level, pass.min_length, pass.max_length
        );
        self.summarizer.run(&pass.request(text)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_trait::SummarizationEngine;
    use crate::summarize::{EMPTY_INPUT_SENTINEL, ERROR_PREFIX};
    use async_trait::async_trait;
    use crisisbrief_common::{CrisisBriefError, EngineConfig};
    use std::sync::Mutex;

    /// Replies with exactly `max_length` words derived from the prompt
    #[derive(Default)]
    struct BoundedEngine {
        bounds: Mutex<Vec<(usize, usize)>>,
    }

    #[async_trait]
    impl SummarizationEngine for BoundedEngine {
        async fn summarize(
            &self,
            prompt: &str,
            max_length: usize,
            min_length: usize,
            _sampling: bool,
        ) -> crisisbrief_common::Result<String> {
            self.bounds.lock().unwrap().push((min_length, max_length));
            let words: Vec<&str> = prompt.split_whitespace().cycle().take(max_length).collect();
            Ok(words.join(" "))
        }

        fn model_name(&self) -> &str {
            "bounded"
        }
    }

    /// Fails only for the authorities pass
    struct PartialEngine;

    #[async_trait]
    impl SummarizationEngine for PartialEngine {
        async fn summarize(&self, prompt: &str, _: usize, _: usize, _: bool) -> crisisbrief_common::Result<String> {
            if prompt.starts_with(AudienceRole::Authorities.guidance()) {
                Err(CrisisBriefError::engine("out of memory"))
            } else {
                Ok("fine".to_string())
            }
        }

        fn model_name(&self) -> &str {
            "partial"
        }
    }

    const REPORT: &str = "A severe earthquake measuring 7.2 on the Richter scale struck the northern region \
        early this morning at 3:45 AM. Initial reports indicate significant structural damage to residential \
        buildings. At least 50 people have been reported injured, with 5 confirmed fatalities.";

    fn orchestrator(engine: Arc<dyn SummarizationEngine>) -> MultiLevelSummarizer {
        MultiLevelSummarizer::new(Arc::new(Summarizer::new(engine, EngineConfig::new("test"))))
    }

    #[test]
    fn test_pass_bounds_are_ordered() {
        for pass in PASS_PLAN {
            assert!(pass.min_length <= pass.max_length, "{}", pass.name);
        }
        assert!(ALERT_PASS.max_length < OPERATIONAL_PASS.max_length);
        assert!(OPERATIONAL_PASS.max_length < STRATEGIC_PASS.max_length);
    }

    #[tokio::test]
    async fn test_passes_run_in_order_with_their_bounds() {
        let engine = Arc::new(BoundedEngine::default());
        let triple = orchestrator(engine.clone()).generate_all(REPORT).await;

        let bounds = engine.bounds.lock().unwrap().clone();
        assert_eq!(bounds, vec![(8, 20), (25, 60), (60, 150)]);

        assert_eq!(triple.alert.split_whitespace().count(), 20);
        assert_eq!(triple.operational.split_whitespace().count(), 60);
        assert_eq!(triple.strategic.split_whitespace().count(), 150);
        assert!(triple.strategic.len() >= triple.operational.len());
        assert!(triple.operational.len() >= triple.alert.len());
    }

    #[tokio::test]
    async fn test_generate_all_is_deterministic() {
        let summarizer = orchestrator(Arc::new(BoundedEngine::default()));
        let first = summarizer.generate_all(REPORT).await;
        let second = summarizer.generate_all(REPORT).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_input_yields_three_sentinels() {
        let engine = Arc::new(BoundedEngine::default());
        let triple = orchestrator(engine.clone()).generate_all("").await;

        assert_eq!(triple.alert, EMPTY_INPUT_SENTINEL);
        assert_eq!(triple.operational, EMPTY_INPUT_SENTINEL);
        assert_eq!(triple.strategic, EMPTY_INPUT_SENTINEL);
        assert!(engine.bounds.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_pass_does_not_block_others() {
        let triple = orchestrator(Arc::new(PartialEngine)).generate_all(REPORT).await;
        assert_eq!(triple.alert, "fine");
        assert_eq!(triple.operational, "fine");
        assert!(triple.strategic.starts_with(ERROR_PREFIX));
    }

    #[tokio::test]
    async fn test_alert_and_operational_only() {
        let engine = Arc::new(BoundedEngine::default());
        let (alert, operational) = orchestrator(engine.clone())
            .generate_alert_and_operational(REPORT)
            .await;
        assert!(!alert.is_empty());
        assert!(!operational.is_empty());
        assert_eq!(engine.bounds.lock().unwrap().len(), 2);
    }
}
