//! Guidance prompts for audience-adapted summaries

use crisisbrief_common::CrisisBriefError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::truncate::{char_budget, truncate_chars, truncate_to_budget};

/// Separates the guidance block from the report text
pub const GUIDANCE_SEPARATOR: &str = "\n\nReport:\n";

/// Who a summary is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudienceRole {
    GeneralPublic,
    EmergencyResponders,
    Authorities,
}

impl AudienceRole {
    pub const ALL: [AudienceRole; 3] = [
        AudienceRole::GeneralPublic,
        AudienceRole::EmergencyResponders,
        AudienceRole::Authorities,
    ];

    /// Framing instruction for this audience
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::GeneralPublic => {
                "Write for the general public: use plain language, name the hazard and the affected place, and say what people should do to stay safe."
            }
            Self::EmergencyResponders => {
                "Write for emergency responders: focus on operational facts such as affected areas, casualties, hazards on the ground, deployed resources and access constraints."
            }
            Self::Authorities => {
                "Write for government authorities: cover the scale of the event, its impact, the coordination of the response, resource gaps and decisions that need to be taken."
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GeneralPublic => "general_public",
            Self::EmergencyResponders => "emergency_responders",
            Self::Authorities => "authorities",
        }
    }
}

impl fmt::Display for AudienceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudienceRole {
    type Err = CrisisBriefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "general_public" | "public" => Ok(Self::GeneralPublic),
            "emergency_responders" | "responders" => Ok(Self::EmergencyResponders),
            "authorities" => Ok(Self::Authorities),
            other => Err(CrisisBriefError::invalid_input(format!(
                "Unknown audience role '{}' (expected general_public, emergency_responders or authorities)",
                other
            ))),
        }
    }
}

/// How much detail a summary keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbstractionLevel {
    High,
    Medium,
    Low,
}

impl AbstractionLevel {
    pub const ALL: [AbstractionLevel; 3] = [
        AbstractionLevel::High,
        AbstractionLevel::Medium,
        AbstractionLevel::Low,
    ];

    /// Granularity instruction for this level
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::High => "Keep it to one short sentence with only the single most important fact.",
            Self::Medium => "Summarize the key facts in a few concise sentences.",
            Self::Low => "Give a detailed summary that keeps the figures, times and places mentioned.",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for AbstractionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AbstractionLevel {
    type Err = CrisisBriefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(CrisisBriefError::invalid_input(format!(
                "Unknown abstraction level '{}' (expected high, medium or low)",
                other
            ))),
        }
    }
}

/// Guidance block for a role/level pair, `None` in plain mode
pub fn guidance_block(role: Option<AudienceRole>, level: Option<AbstractionLevel>) -> Option<String> {
    let parts: Vec<&str> = [role.map(|r| r.guidance()), level.map(|l| l.guidance())]
        .into_iter()
        .flatten()
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// Build the prompt sent to the engine
///
/// Without role and level the (truncated) text is returned unchanged.
/// Otherwise the guidance block is prepended and the text is cut so the
/// whole prompt stays inside the engine's input window.
pub fn build_prompt(
    text: &str,
    role: Option<AudienceRole>,
    level: Option<AbstractionLevel>,
    max_input_tokens: usize,
) -> String {
    let Some(guidance) = guidance_block(role, level) else {
        return truncate_to_budget(text, max_input_tokens).into_owned();
    };

    let overhead = guidance.chars().count() + GUIDANCE_SEPARATOR.len();
    let text_budget = char_budget(max_input_tokens).saturating_sub(overhead);
    let source = truncate_chars(text, text_budget);

    format!("{}{}{}", guidance, GUIDANCE_SEPARATOR, source)
}
