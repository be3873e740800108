use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;

use super::domain::{DiagnosticStage, SolutionId, SolutionModality, SolutionOrigin, SolutionRecord};
use super::normalizer::{normalize_label, split_list};

/// Payload for registering a new solution during the session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolutionSubmission {
    pub title: String,
    #[serde(default)]
    pub modality: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Stage names or meeting numbers; empty means every stage.
    #[serde(default)]
    pub stages: Vec<String>,
    #[serde(default)]
    pub sectors: Vec<String>,
    #[serde(default)]
    pub regionals: Vec<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("solution title must not be empty")]
    EmptyTitle,
    #[error("unknown diagnostic stage '{0}'")]
    UnknownStage(String),
    #[error("solution '{0}' already exists")]
    Duplicate(SolutionId),
}

/// Append-only store of solutions registered through the API. Lives for the process only.
#[derive(Debug, Default)]
pub struct SolutionRegistry {
    entries: Mutex<Vec<SolutionRecord>>,
}

impl SolutionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a submission. `catalog` holds the loaded rows the id must not clash with.
    pub fn register(
        &self,
        submission: SolutionSubmission,
        catalog: &[SolutionRecord],
    ) -> Result<SolutionRecord, RegistryError> {
        let title = submission.title.trim().to_string();
        if title.is_empty() {
            return Err(RegistryError::EmptyTitle);
        }

        let mut target_stages = Vec::new();
        for raw in submission.stages.iter().flat_map(|raw| split_list(raw)) {
            let stage = DiagnosticStage::parse(&raw).ok_or(RegistryError::UnknownStage(raw))?;
            if !target_stages.contains(&stage) {
                target_stages.push(stage);
            }
        }

        let id = SolutionId::from_raw(&title);
        let mut entries = self.entries();
        let title_key = normalize_label(&title);
        if let Some(known) = catalog
            .iter()
            .chain(entries.iter())
            .find(|known| known.id == id || normalize_label(&known.title) == title_key)
        {
            return Err(RegistryError::Duplicate(known.id.clone()));
        }

        let mut tags = Vec::new();
        for tag in split_list(&submission.theme)
            .into_iter()
            .chain(submission.keywords.iter().flat_map(|raw| split_list(raw)))
        {
            if !tags
                .iter()
                .any(|known: &String| normalize_label(known) == normalize_label(&tag))
            {
                tags.push(tag);
            }
        }

        let record = SolutionRecord {
            id,
            title,
            modality: SolutionModality::parse(&submission.modality),
            description: submission.description.trim().to_string(),
            tags,
            target_stages,
            target_sectors: flatten(&submission.sectors),
            regionals: flatten(&submission.regionals),
            origin: SolutionOrigin::Registered,
        };

        info!(id = %record.id, title = %record.title, "solution registered");
        entries.push(record.clone());
        Ok(record)
    }

    /// Registered solutions in registration order.
    pub fn all(&self) -> Vec<SolutionRecord> {
        self.entries().clone()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<SolutionRecord>> {
        // Entries are only ever appended whole, so a poisoned lock still holds a valid list.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn flatten(values: &[String]) -> Vec<String> {
    values.iter().flat_map(|raw| split_list(raw)).collect()
}
