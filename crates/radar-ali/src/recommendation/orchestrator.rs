use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::curation::UnderservedArea;
use super::llm::{LanguageModel, LlmError, Prompt};
use super::prompt::{recommendation_prompt, suggestion_prompt, MAX_PICKS};
use super::reply::{parse_picks, parse_suggestions, ModelPick, SolutionSuggestion};
use super::scoring::{RecommendationResult, ScoredSolution, ScoringEngine};
use crate::radar::domain::{
    CompanyId, CompanyRecord, RadarSnapshot, ScheduledSolutionRecord, SolutionId, SolutionRecord,
};
use crate::radar::normalizer::normalize_label;
use crate::radar::regional::RegionalSummary;

pub const NO_CANDIDATES_MESSAGE: &str = "no matching solution found for this company";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSource {
    Model,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    ModelDisabled,
    ModelError,
    Timeout,
    Unparseable,
    InvalidSelection,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FallbackReason::ModelDisabled => "model disabled",
            FallbackReason::ModelError => "model error",
            FallbackReason::Timeout => "model timeout",
            FallbackReason::Unparseable => "unparseable reply",
            FallbackReason::InvalidSelection => "selection outside candidate set",
        };
        f.write_str(label)
    }
}

impl From<&LlmError> for FallbackReason {
    fn from(error: &LlmError) -> Self {
        match error {
            LlmError::Disabled => Self::ModelDisabled,
            LlmError::Timeout(_) => Self::Timeout,
            LlmError::Http(_) | LlmError::Status { .. } | LlmError::EmptyReply => Self::ModelError,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fallback {
    pub reason: FallbackReason,
    pub detail: String,
}

/// A validated pick shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub solution: SolutionRecord,
    pub score: f64,
    pub justification: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecommendationOutcome {
    Recommended {
        company_id: CompanyId,
        source: SelectionSource,
        fallback: Option<Fallback>,
        selections: Vec<Recommendation>,
        candidates: Vec<ScoredSolution>,
    },
    NoCandidates {
        company_id: CompanyId,
        message: String,
    },
}

impl RecommendationOutcome {
    pub fn selections(&self) -> &[Recommendation] {
        match self {
            Self::Recommended { selections, .. } => selections,
            Self::NoCandidates { .. } => &[],
        }
    }

    pub fn source(&self) -> Option<SelectionSource> {
        match self {
            Self::Recommended { source, .. } => Some(*source),
            Self::NoCandidates { .. } => None,
        }
    }

    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self {
            Self::Recommended { fallback, .. } => fallback.as_ref().map(|fallback| fallback.reason),
            Self::NoCandidates { .. } => None,
        }
    }
}

/// Ranks candidates, lets the model choose among them and validates the choice.
pub struct RecommendationOrchestrator {
    engine: ScoringEngine,
    model: Arc<dyn LanguageModel>,
    timeout: Duration,
}

impl RecommendationOrchestrator {
    pub fn new(engine: ScoringEngine, model: Arc<dyn LanguageModel>, timeout: Duration) -> Self {
        Self {
            engine,
            model,
            timeout,
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Recommend solutions from `catalog` for `company`.
    ///
    /// The model never introduces a solution: any pick outside the ranked candidates
    /// drops the whole reply in favor of the top algorithmic candidate.
    pub async fn recommend(
        &self,
        snapshot: &RadarSnapshot,
        catalog: &[SolutionRecord],
        company: &CompanyRecord,
    ) -> RecommendationOutcome {
        let result = self
            .engine
            .score(company, catalog, &snapshot.scheduled_index());

        let RecommendationResult {
            company_id,
            candidates,
        } = result;

        let Some(top) = candidates.first() else {
            info!(company = %company_id, "no candidate survived filtering");
            return RecommendationOutcome::NoCandidates {
                company_id,
                message: NO_CANDIDATES_MESSAGE.to_string(),
            };
        };

        let scheduled: Vec<&ScheduledSolutionRecord> = snapshot.scheduled_for(company).collect();
        let prompt = recommendation_prompt(company, &candidates, &scheduled);

        let selection = match self.call_model(&prompt).await {
            Ok(reply) => resolve_picks(&parse_picks(&reply), &candidates),
            Err(error) => Err(Fallback {
                reason: FallbackReason::from(&error),
                detail: error.to_string(),
            }),
        };

        match selection {
            Ok(selections) => {
                info!(
                    company = %company_id,
                    picks = selections.len(),
                    model = self.model.name(),
                    "model recommendation accepted"
                );
                RecommendationOutcome::Recommended {
                    company_id,
                    source: SelectionSource::Model,
                    fallback: None,
                    selections,
                    candidates,
                }
            }
            Err(fallback) => {
                warn!(
                    company = %company_id,
                    reason = %fallback.reason,
                    detail = %fallback.detail,
                    "falling back to top scored candidate"
                );
                let selections = vec![Recommendation {
                    solution: top.solution.clone(),
                    score: top.score,
                    justification: top.justification.clone(),
                }];
                RecommendationOutcome::Recommended {
                    company_id,
                    source: SelectionSource::Fallback,
                    fallback: Some(fallback),
                    selections,
                    candidates,
                }
            }
        }
    }

    /// Ask the model for new solutions covering the regional's gaps.
    pub async fn suggest_solutions(
        &self,
        summary: &RegionalSummary,
        gaps: &[UnderservedArea],
        scheduled: &[&ScheduledSolutionRecord],
    ) -> Result<Vec<SolutionSuggestion>, LlmError> {
        let prompt = suggestion_prompt(summary, gaps, scheduled);
        let reply = self.call_model(&prompt).await?;
        let suggestions = parse_suggestions(&reply);
        debug!(count = suggestions.len(), "parsed model suggestions");
        Ok(suggestions)
    }

    async fn call_model(&self, prompt: &Prompt) -> Result<String, LlmError> {
        tokio::time::timeout(self.timeout, self.model.complete(prompt))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout))?
    }
}

fn find_candidate<'a>(
    reference: &str,
    candidates: &'a [ScoredSolution],
) -> Option<&'a ScoredSolution> {
    let as_id = SolutionId::from_raw(reference);
    let as_title = normalize_label(reference);
    candidates.iter().find(|candidate| {
        candidate.solution.id.0 == reference.trim()
            || candidate.solution.id == as_id
            || normalize_label(&candidate.solution.title) == as_title
    })
}

/// Resolve by the bracketed reference, then by the title written after it.
fn resolve_pick<'a>(
    pick: &ModelPick,
    candidates: &'a [ScoredSolution],
) -> Option<&'a ScoredSolution> {
    find_candidate(&pick.reference, candidates).or_else(|| {
        pick.title
            .as_deref()
            .and_then(|title| find_candidate(title, candidates))
    })
}

/// Map every pick onto a candidate, or explain why the reply cannot be trusted.
fn resolve_picks(
    picks: &[ModelPick],
    candidates: &[ScoredSolution],
) -> Result<Vec<Recommendation>, Fallback> {
    if picks.is_empty() {
        return Err(Fallback {
            reason: FallbackReason::Unparseable,
            detail: "reply had no numbered picks".to_string(),
        });
    }

    let mut seen = HashSet::new();
    let mut selections = Vec::new();
    for pick in picks.iter().take(MAX_PICKS) {
        let Some(candidate) = resolve_pick(pick, candidates) else {
            return Err(Fallback {
                reason: FallbackReason::InvalidSelection,
                detail: format!("'{}' is not among the candidates", pick.reference),
            });
        };

        if !seen.insert(candidate.solution.id.clone()) {
            continue;
        }

        let justification = if pick.justification.trim().is_empty() {
            candidate.justification.clone()
        } else {
            pick.justification.clone()
        };

        selections.push(Recommendation {
            solution: candidate.solution.clone(),
            score: candidate.score,
            justification,
        });
    }

    Ok(selections)
}
