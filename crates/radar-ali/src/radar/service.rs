use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::cache::SnapshotCache;
use super::domain::{CompanyId, CompanyRecord, RadarSnapshot, ScheduledSolutionRecord, SolutionRecord};
use super::regional::{filter_companies, RegionalSummary};
use super::registry::{RegistryError, SolutionRegistry, SolutionSubmission};
use super::LoaderError;
use crate::recommendation::adherence::{self, CompanyAdherence};
use crate::recommendation::curation::{detect_gaps, CurationConfig, CurationReport};
use crate::recommendation::orchestrator::{RecommendationOrchestrator, RecommendationOutcome};

/// Row counts after a forced reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub companies: usize,
    pub solutions: usize,
    pub scheduled: usize,
    pub registered: usize,
    pub loaded_at: DateTime<Utc>,
}

/// A freshly registered solution and how well it fits the companies it targets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationReport {
    pub solution: SolutionRecord,
    pub adherence: Vec<CompanyAdherence>,
}

/// Service composing the snapshot cache, the session registry and the recommendation pipeline.
pub struct RadarService {
    cache: Arc<SnapshotCache>,
    registry: Arc<SolutionRegistry>,
    orchestrator: Arc<RecommendationOrchestrator>,
    curation: CurationConfig,
}

impl RadarService {
    pub fn new(
        cache: Arc<SnapshotCache>,
        registry: Arc<SolutionRegistry>,
        orchestrator: Arc<RecommendationOrchestrator>,
    ) -> Self {
        Self {
            cache,
            registry,
            orchestrator,
            curation: CurationConfig::default(),
        }
    }

    pub fn with_curation(mut self, curation: CurationConfig) -> Self {
        self.curation = curation;
        self
    }

    pub fn orchestrator(&self) -> &RecommendationOrchestrator {
        &self.orchestrator
    }

    pub async fn snapshot(&self) -> Result<Arc<RadarSnapshot>, RadarServiceError> {
        Ok(self.cache.current().await?)
    }

    /// Loaded catalog rows followed by registered solutions.
    pub async fn catalog(&self) -> Result<Vec<SolutionRecord>, RadarServiceError> {
        let snapshot = self.snapshot().await?;
        Ok(self.merged_catalog(&snapshot))
    }

    pub async fn dashboard(
        &self,
        regional: Option<&str>,
    ) -> Result<RegionalSummary, RadarServiceError> {
        let snapshot = self.snapshot().await?;
        Ok(RegionalSummary::build(&snapshot, regional))
    }

    pub async fn companies(
        &self,
        regional: Option<&str>,
    ) -> Result<Vec<CompanyRecord>, RadarServiceError> {
        let snapshot = self.snapshot().await?;
        Ok(filter_companies(&snapshot.companies, regional)
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn recommend(
        &self,
        company_id: &CompanyId,
    ) -> Result<RecommendationOutcome, RadarServiceError> {
        let snapshot = self.snapshot().await?;
        let company = snapshot
            .company(company_id)
            .ok_or_else(|| RadarServiceError::CompanyNotFound(company_id.clone()))?;
        let catalog = self.merged_catalog(&snapshot);

        Ok(self
            .orchestrator
            .recommend(&snapshot, &catalog, company)
            .await)
    }

    /// Register a solution and rate it against the companies of its regionals (all when none).
    pub async fn register(
        &self,
        submission: SolutionSubmission,
    ) -> Result<RegistrationReport, RadarServiceError> {
        let snapshot = self.snapshot().await?;
        let solution = self.registry.register(submission, &snapshot.solutions)?;

        let companies: Vec<&CompanyRecord> = if solution.regionals.is_empty() {
            snapshot.companies.iter().collect()
        } else {
            snapshot
                .companies
                .iter()
                .filter(|company| {
                    solution
                        .regionals
                        .iter()
                        .any(|regional| company.in_regional(regional))
                })
                .collect()
        };

        let adherence = adherence::analyze(&solution, &companies, &snapshot.scheduled_index());
        Ok(RegistrationReport {
            solution,
            adherence,
        })
    }

    /// Underserved challenge terms, plus model suggestions when `suggest` is set.
    pub async fn curation(
        &self,
        regional: Option<&str>,
        suggest: bool,
    ) -> Result<CurationReport, RadarServiceError> {
        let snapshot = self.snapshot().await?;
        let summary = RegionalSummary::build(&snapshot, regional);
        let companies = filter_companies(&snapshot.companies, summary.regional.as_deref());
        let scheduled: Vec<&ScheduledSolutionRecord> =
            snapshot.scheduled_in(summary.regional.as_deref()).collect();
        let catalog = self.merged_catalog(&snapshot);

        let underserved = detect_gaps(&companies, &catalog, &scheduled, &self.curation);

        let (suggestions, suggestion_error) = if suggest {
            match self
                .orchestrator
                .suggest_solutions(&summary, &underserved, &scheduled)
                .await
            {
                Ok(suggestions) => (suggestions, None),
                Err(error) => {
                    warn!(%error, "solution suggestions unavailable");
                    (Vec::new(), Some(error.to_string()))
                }
            }
        } else {
            (Vec::new(), None)
        };

        Ok(CurationReport {
            summary,
            underserved,
            suggestions,
            suggestion_error,
        })
    }

    pub async fn refresh(&self) -> Result<RefreshReport, RadarServiceError> {
        let snapshot = self.cache.refresh().await?;
        let report = RefreshReport {
            companies: snapshot.companies.len(),
            solutions: snapshot.solutions.len(),
            scheduled: snapshot.scheduled.len(),
            registered: self.registry.len(),
            loaded_at: snapshot.loaded_at,
        };
        info!(
            companies = report.companies,
            solutions = report.solutions,
            scheduled = report.scheduled,
            "radar data refreshed"
        );
        Ok(report)
    }

    fn merged_catalog(&self, snapshot: &RadarSnapshot) -> Vec<SolutionRecord> {
        let mut catalog = snapshot.solutions.clone();
        // a refresh may have brought a registered solution into the sheet itself
        let registered: Vec<SolutionRecord> = self
            .registry
            .all()
            .into_iter()
            .filter(|solution| !catalog.iter().any(|known| known.id == solution.id))
            .collect();
        catalog.extend(registered);
        catalog
    }
}

/// Error raised by the radar service.
#[derive(Debug, thiserror::Error)]
pub enum RadarServiceError {
    #[error("data unavailable: {0}")]
    DataUnavailable(#[from] LoaderError),
    #[error("company '{0}' not found")]
    CompanyNotFound(CompanyId),
    #[error(transparent)]
    Registration(#[from] RegistryError),
}

impl RadarServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DataUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::CompanyNotFound(_) => StatusCode::NOT_FOUND,
            Self::Registration(RegistryError::Duplicate(_)) => StatusCode::CONFLICT,
            Self::Registration(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}
