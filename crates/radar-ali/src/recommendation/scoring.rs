use serde::Serialize;
use std::collections::HashSet;

use crate::config::ScoringConfig;
use crate::radar::domain::{CompanyId, CompanyRecord, ScheduledIndex, SolutionRecord};
use crate::radar::normalizer::tokenize_all;

/// One ranked candidate for a company.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredSolution {
    pub solution: SolutionRecord,
    /// Share of the company's challenge terms found in the solution, in `[0, 1]`.
    pub score: f64,
    pub matched_terms: Vec<String>,
    pub justification: String,
}

/// Ranked candidates for one company. Recomputed per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    pub company_id: CompanyId,
    pub candidates: Vec<ScoredSolution>,
}

impl RecommendationResult {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn top(&self) -> Option<&ScoredSolution> {
        self.candidates.first()
    }
}

/// Terms a company is matched on: its challenge phrases.
pub fn company_terms(company: &CompanyRecord) -> Vec<String> {
    tokenize_all(company.challenges.iter().map(String::as_str))
}

/// Terms a solution offers: keyword tags plus description.
pub fn solution_terms(solution: &SolutionRecord) -> HashSet<String> {
    tokenize_all(
        solution
            .tags
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(solution.description.as_str())),
    )
    .into_iter()
    .collect()
}

/// Company terms present in the solution, in company order, and the recall they give.
pub fn recall(company_terms: &[String], solution_terms: &HashSet<String>) -> (Vec<String>, f64) {
    let matched: Vec<String> = company_terms
        .iter()
        .filter(|term| solution_terms.contains(*term))
        .cloned()
        .collect();
    let score = matched.len() as f64 / company_terms.len().max(1) as f64;
    (matched, score.min(1.0))
}

pub fn justification(
    company: &CompanyRecord,
    solution: &SolutionRecord,
    matched_terms: &[String],
) -> String {
    let challenges = if matched_terms.is_empty() {
        "No challenge terms matched".to_string()
    } else {
        format!("Matches challenges: {}", matched_terms.join(", "))
    };

    let stage = match (solution.target_stages.is_empty(), company.stage) {
        (false, Some(stage)) => format!("compatible with stage {}", stage.label()),
        (true, Some(_)) => "compatible with all stages".to_string(),
        (_, None) => "compatible with all stages (company stage unspecified)".to_string(),
    };

    format!("{challenges}; {stage}.")
}

/// Keyword-overlap ranking of the catalog for one company.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn top_n(&self) -> usize {
        self.config.top_n
    }

    /// Rank the catalog for `company` and keep the best `top_n`.
    ///
    /// Scheduled solutions (for the company or its regional) and stage-incompatible
    /// solutions never appear. Ties keep catalog order.
    pub fn score(
        &self,
        company: &CompanyRecord,
        catalog: &[SolutionRecord],
        scheduled: &ScheduledIndex,
    ) -> RecommendationResult {
        let mut result = self.rank_all(company, catalog, scheduled);
        result.candidates.truncate(self.config.top_n);
        result
    }

    /// Like [`score`](Self::score) without the `top_n` cut.
    pub fn rank_all(
        &self,
        company: &CompanyRecord,
        catalog: &[SolutionRecord],
        scheduled: &ScheduledIndex,
    ) -> RecommendationResult {
        let terms = company_terms(company);

        let mut candidates: Vec<ScoredSolution> = catalog
            .iter()
            .filter(|solution| !scheduled.is_scheduled(company, &solution.id))
            .filter(|solution| solution.accepts_stage(company.stage))
            .map(|solution| {
                let (matched_terms, score) = recall(&terms, &solution_terms(solution));
                ScoredSolution {
                    justification: justification(company, solution, &matched_terms),
                    solution: solution.clone(),
                    score,
                    matched_terms,
                }
            })
            .collect();

        // `sort_by` is stable, so equal scores keep catalog order.
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

        RecommendationResult {
            company_id: company.id.clone(),
            candidates,
        }
    }
}
