//! CrisisBrief summarization core
//!
//! Engine boundary, Ollama engine, audience guidance, the engine adapter
//! and the multi-level (alert / operational / strategic) orchestrator.

mod cache;
mod client;
mod llm_trait;
mod multilevel;
mod prompts;
mod summarize;
mod truncate;
mod types;

pub use cache::EngineCache;
pub use client::OllamaClient;
pub use llm_trait::SummarizationEngine;
pub use multilevel::{
    MultiLevelSummarizer, SummaryPass, ALERT_PASS, OPERATIONAL_PASS, PASS_PLAN, STRATEGIC_PASS,
};
pub use prompts::{build_prompt, guidance_block, AbstractionLevel, AudienceRole, GUIDANCE_SEPARATOR};
pub use summarize::{is_degraded, Summarizer, EMPTY_INPUT_SENTINEL, ERROR_PREFIX};
pub use truncate::{
    char_budget, truncate_chars, truncate_to_budget, CHARS_PER_TOKEN, DEFAULT_MAX_INPUT_TOKENS,
};
pub use types::{
    ComputeDevice, GenerateOptions, GenerateRequest, GenerateResponse, GenerationRequest,
    SummaryTriple,
};
