//! Shared types for AI text generation

use serde::{Deserialize, Serialize};

/// What a generation request is for
///
/// Backends may use this to pick canned output; the OpenAI-compatible
/// backend only sends the prompt text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    Predictions,
    Recommendations,
    SavingsTips,
    Budget,
    SpendingAnalysis,
}

impl PromptKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Predictions => "predictions",
            Self::Recommendations => "recommendations",
            Self::SavingsTips => "savings_tips",
            Self::Budget => "budget",
            Self::SpendingAnalysis => "spending_analysis",
        }
    }
}

/// A single system + user prompt pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub kind: PromptKind,
    pub system: String,
    pub prompt: String,
}

impl GenerationRequest {
    pub fn new(kind: PromptKind, system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            kind,
            system: system.into(),
            prompt: prompt.into(),
        }
    }
}
