use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use super::reply::SolutionSuggestion;
use crate::radar::domain::{CompanyRecord, ScheduledSolutionRecord, SolutionRecord};
use crate::radar::normalizer::{tokenize, tokenize_all};
use crate::radar::regional::RegionalSummary;

/// Thresholds deciding when a challenge term counts as underserved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurationConfig {
    pub min_companies: usize,
    pub max_coverage_ratio: f64,
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            min_companies: 2,
            max_coverage_ratio: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnderservedArea {
    pub term: String,
    pub company_count: usize,
    pub solution_count: usize,
    /// `solution_count / company_count`.
    pub coverage_ratio: f64,
}

/// Gap analysis for a regional plus any model suggestions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurationReport {
    pub summary: RegionalSummary,
    pub underserved: Vec<UnderservedArea>,
    pub suggestions: Vec<SolutionSuggestion>,
    /// Why suggestions are missing when they were requested.
    pub suggestion_error: Option<String>,
}

/// Challenge terms mentioned by many companies but covered by few solutions.
///
/// Catalog, registered and scheduled solutions all count as coverage. Sorted by company
/// count descending, then coverage ascending, then term.
pub fn detect_gaps(
    companies: &[&CompanyRecord],
    solutions: &[SolutionRecord],
    scheduled: &[&ScheduledSolutionRecord],
    config: &CurationConfig,
) -> Vec<UnderservedArea> {
    let mut demand: BTreeMap<String, usize> = BTreeMap::new();
    for company in companies {
        for term in tokenize_all(company.challenges.iter().map(String::as_str)) {
            *demand.entry(term).or_default() += 1;
        }
    }

    let offers: Vec<HashSet<String>> = solutions
        .iter()
        .map(|solution| {
            tokenize_all(solution.tags.iter().map(String::as_str))
                .into_iter()
                .collect()
        })
        .chain(scheduled.iter().map(|record| {
            tokenize(&record.title)
                .into_iter()
                .chain(tokenize(&record.theme))
                .collect()
        }))
        .collect();

    let mut gaps: Vec<UnderservedArea> = demand
        .into_iter()
        .filter(|(_, company_count)| *company_count >= config.min_companies)
        .filter_map(|(term, company_count)| {
            let solution_count = offers.iter().filter(|offer| offer.contains(&term)).count();
            let coverage_ratio = solution_count as f64 / company_count as f64;
            (coverage_ratio <= config.max_coverage_ratio).then_some(UnderservedArea {
                term,
                company_count,
                solution_count,
                coverage_ratio,
            })
        })
        .collect();

    gaps.sort_by(|a, b| {
        b.company_count
            .cmp(&a.company_count)
            .then_with(|| {
                a.coverage_ratio
                    .partial_cmp(&b.coverage_ratio)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.term.cmp(&b.term))
    });
    gaps
}
