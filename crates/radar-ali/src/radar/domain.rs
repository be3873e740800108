use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::normalizer::{normalize_label, slugify};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(pub String);

impl CompanyId {
    pub fn from_raw(raw: &str) -> Self {
        Self(slugify(raw))
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SolutionId(pub String);

impl SolutionId {
    pub fn from_raw(raw: &str) -> Self {
        Self(slugify(raw))
    }
}

impl fmt::Display for SolutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Meeting stages of the ALI 360 diagnostic cycle, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticStage {
    Nomear,
    Elaborar,
    Experimentar,
    Evoluir,
    Concluido,
}

impl DiagnosticStage {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Nomear,
            Self::Elaborar,
            Self::Experimentar,
            Self::Evoluir,
            Self::Concluido,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Nomear => "Nomear",
            Self::Elaborar => "Elaborar",
            Self::Experimentar => "Experimentar",
            Self::Evoluir => "Evoluir",
            Self::Concluido => "Concluído",
        }
    }

    /// Accepts the stage name or the meeting number (`1`..`5`) used by raw radar exports.
    pub fn parse(raw: &str) -> Option<Self> {
        let key = normalize_label(raw);
        let key = key.strip_suffix(" 0").unwrap_or(&key);
        match key {
            "1" | "nomear" => Some(Self::Nomear),
            "2" | "elaborar" => Some(Self::Elaborar),
            "3" | "experimentar" => Some(Self::Experimentar),
            "4" | "evoluir" => Some(Self::Evoluir),
            "5" | "concluido" => Some(Self::Concluido),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionModality {
    Curso,
    Consultoria,
    Workshop,
    Programa,
    Evento,
    Outro,
}

impl SolutionModality {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Curso => "Curso",
            Self::Consultoria => "Consultoria",
            Self::Workshop => "Workshop",
            Self::Programa => "Programa",
            Self::Evento => "Evento",
            Self::Outro => "Outro",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match normalize_label(raw).as_str() {
            "curso" | "course" | "capacitacao" => Self::Curso,
            "consultoria" | "consultancy" => Self::Consultoria,
            "workshop" | "oficina" => Self::Workshop,
            "programa" | "program" | "trilha" => Self::Programa,
            "evento" | "event" | "palestra" => Self::Evento,
            _ => Self::Outro,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionOrigin {
    Catalog,
    Registered,
}

/// Company diagnostic row from the radar sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub id: CompanyId,
    pub name: String,
    pub city: String,
    pub regional: String,
    pub sector: String,
    pub challenges: Vec<String>,
    pub specific_need: String,
    pub maturity: String,
    pub stage: Option<DiagnosticStage>,
}

impl CompanyRecord {
    pub fn in_regional(&self, regional: &str) -> bool {
        normalize_label(&self.regional) == normalize_label(regional)
    }

    /// Sheets reference companies either by their ID column or by name.
    pub fn answers_to(&self, id: &CompanyId) -> bool {
        &self.id == id || CompanyId::from_raw(&self.name) == *id
    }
}

/// Candidate course, consultancy or program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionRecord {
    pub id: SolutionId,
    pub title: String,
    pub modality: SolutionModality,
    pub description: String,
    pub tags: Vec<String>,
    /// Empty means the solution suits every stage.
    pub target_stages: Vec<DiagnosticStage>,
    pub target_sectors: Vec<String>,
    pub regionals: Vec<String>,
    pub origin: SolutionOrigin,
}

impl SolutionRecord {
    pub fn accepts_stage(&self, stage: Option<DiagnosticStage>) -> bool {
        if self.target_stages.is_empty() {
            return true;
        }
        stage.is_some_and(|stage| self.target_stages.contains(&stage))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ScheduleScope {
    Company(CompanyId),
    Regional(String),
}

/// A solution already committed to a company or a whole regional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledSolutionRecord {
    pub solution_id: SolutionId,
    pub scope: ScheduleScope,
    pub title: String,
    pub modality: SolutionModality,
    pub theme: String,
    pub city: String,
    pub planned_for: Option<NaiveDate>,
    pub consultant: Option<String>,
}

impl ScheduledSolutionRecord {
    pub fn regional(&self) -> Option<&str> {
        match &self.scope {
            ScheduleScope::Regional(regional) => Some(regional),
            ScheduleScope::Company(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ScopeKey {
    Company(CompanyId),
    Regional(String),
}

/// Lookup of scheduled solutions by company and by regional.
#[derive(Debug, Clone, Default)]
pub struct ScheduledIndex {
    entries: HashSet<(ScopeKey, SolutionId)>,
}

impl ScheduledIndex {
    pub fn from_records(records: &[ScheduledSolutionRecord]) -> Self {
        let mut index = Self::default();
        for record in records {
            index.insert(&record.scope, record.solution_id.clone());
        }
        index
    }

    pub fn insert(&mut self, scope: &ScheduleScope, solution_id: SolutionId) {
        let key = match scope {
            ScheduleScope::Company(id) => ScopeKey::Company(id.clone()),
            ScheduleScope::Regional(regional) => ScopeKey::Regional(normalize_label(regional)),
        };
        self.entries.insert((key, solution_id));
    }

    /// True when the solution is scheduled for this company or for its regional.
    pub fn is_scheduled(&self, company: &CompanyRecord, solution_id: &SolutionId) -> bool {
        self.entries
            .contains(&(ScopeKey::Company(company.id.clone()), solution_id.clone()))
            || self.entries.contains(&(
                ScopeKey::Company(CompanyId::from_raw(&company.name)),
                solution_id.clone(),
            ))
            || self.entries.contains(&(
                ScopeKey::Regional(normalize_label(&company.regional)),
                solution_id.clone(),
            ))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One consistent load of all radar tables.
#[derive(Debug, Clone, Serialize)]
pub struct RadarSnapshot {
    pub companies: Vec<CompanyRecord>,
    pub solutions: Vec<SolutionRecord>,
    pub scheduled: Vec<ScheduledSolutionRecord>,
    pub loaded_at: DateTime<Utc>,
}

impl RadarSnapshot {
    pub fn company(&self, id: &CompanyId) -> Option<&CompanyRecord> {
        self.companies
            .iter()
            .find(|company| &company.id == id)
            .or_else(|| self.companies.iter().find(|company| company.answers_to(id)))
    }

    pub fn scheduled_index(&self) -> ScheduledIndex {
        ScheduledIndex::from_records(&self.scheduled)
    }

    /// Distinct regional names in first-seen order.
    pub fn regionals(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.companies
            .iter()
            .filter(|company| seen.insert(normalize_label(&company.regional)))
            .map(|company| company.regional.clone())
            .collect()
    }

    /// Scheduled entries that apply to one company: its own and its regional's.
    pub fn scheduled_for<'a>(
        &'a self,
        company: &'a CompanyRecord,
    ) -> impl Iterator<Item = &'a ScheduledSolutionRecord> + 'a {
        self.scheduled
            .iter()
            .filter(move |record| match &record.scope {
                ScheduleScope::Company(id) => company.answers_to(id),
                ScheduleScope::Regional(regional) => company.in_regional(regional),
            })
    }

    /// Scheduled entries visible from a regional: the regional's own plus those of its companies.
    pub fn scheduled_in<'a>(
        &'a self,
        regional: Option<&'a str>,
    ) -> impl Iterator<Item = &'a ScheduledSolutionRecord> + 'a {
        self.scheduled
            .iter()
            .filter(move |record| match (regional, &record.scope) {
                (None, _) => true,
                (Some(regional), ScheduleScope::Regional(scope)) => {
                    normalize_label(scope) == normalize_label(regional)
                }
                (Some(regional), ScheduleScope::Company(id)) => self
                    .company(id)
                    .is_some_and(|company| company.in_regional(regional)),
            })
    }
}
