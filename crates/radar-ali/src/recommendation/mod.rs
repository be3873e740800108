//! Recommendation pipeline: keyword scoring, model-assisted selection with a
//! hallucination guard, adherence analysis for new solutions, and regional gap detection.

pub mod adherence;
pub mod curation;
pub mod llm;
pub mod orchestrator;
pub mod prompt;
pub mod reply;
pub mod scoring;

#[cfg(test)]
mod tests;

pub use adherence::{AdherenceLevel, CompanyAdherence};
pub use curation::{detect_gaps, CurationConfig, CurationReport, UnderservedArea};
pub use llm::{
    model_from_config, ChatCompletionClient, DisabledModel, LanguageModel, LlmError, Prompt,
};
pub use orchestrator::{
    Fallback, FallbackReason, Recommendation, RecommendationOrchestrator, RecommendationOutcome,
    SelectionSource, NO_CANDIDATES_MESSAGE,
};
pub use reply::{ModelPick, SolutionSuggestion};
pub use scoring::{RecommendationResult, ScoredSolution, ScoringEngine};
