//! Radar ALI 360 data: company diagnostics, the solution catalog and scheduled solutions.
//!
//! Tables are fetched through a [`SheetSource`], parsed into typed records and held as one
//! [`RadarSnapshot`] by the [`SnapshotCache`]. A snapshot only exists when every table parsed.

pub mod cache;
pub mod domain;
pub mod normalizer;
mod parser;
pub mod regional;
pub mod registry;
pub mod router;
pub mod service;
pub mod source;

use chrono::Utc;
use std::fmt;
use std::io::Cursor;
use tracing::info;

pub use cache::SnapshotCache;
pub use domain::{
    CompanyId, CompanyRecord, DiagnosticStage, RadarSnapshot, ScheduleScope, ScheduledIndex,
    ScheduledSolutionRecord, SolutionId, SolutionModality, SolutionOrigin, SolutionRecord,
};
pub use regional::{filter_companies, LabelCount, RegionalSummary};
pub use registry::{RegistryError, SolutionRegistry, SolutionSubmission};
pub use router::radar_router;
pub use service::{RadarService, RadarServiceError, RefreshReport, RegistrationReport};
pub use source::{csv_export_url, DirectorySource, PublishedSheetSource, SheetSource};

/// The three sheets making up the radar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RadarTable {
    Companies,
    Solutions,
    Scheduled,
}

impl RadarTable {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Companies => "companies",
            Self::Solutions => "solutions",
            Self::Scheduled => "scheduled",
        }
    }

    /// Scheduled solutions are optional; a radar without them simply has nothing to suppress.
    pub const fn required(self) -> bool {
        !matches!(self, Self::Scheduled)
    }
}

impl fmt::Display for RadarTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure to produce a complete snapshot.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("failed to read {table} table: {source}")]
    Io {
        table: RadarTable,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to download {table} table: {source}")]
    Http {
        table: RadarTable,
        #[source]
        source: reqwest::Error,
    },
    #[error("malformed {table} csv: {source}")]
    Csv {
        table: RadarTable,
        #[source]
        source: csv::Error,
    },
    #[error("{table} row {line}: {reason}")]
    InvalidRow {
        table: RadarTable,
        line: usize,
        reason: String,
    },
    #[error("{table} table is not provided by the configured source")]
    MissingTable { table: RadarTable },
}

/// Loads all radar tables from a source into one snapshot.
pub struct RadarLoader;

impl RadarLoader {
    pub async fn load(source: &dyn SheetSource) -> Result<RadarSnapshot, LoaderError> {
        let companies = Self::fetch(source, RadarTable::Companies).await?;
        let solutions = Self::fetch(source, RadarTable::Solutions).await?;
        let scheduled = Self::fetch(source, RadarTable::Scheduled).await?;

        let companies = parser::parse_companies(Cursor::new(companies.unwrap_or_default()))?;
        let solutions = parser::parse_solutions(Cursor::new(solutions.unwrap_or_default()))?;
        let scheduled = match scheduled {
            Some(bytes) => parser::parse_scheduled(Cursor::new(bytes))?,
            None => Vec::new(),
        };

        info!(
            source = %source.describe(),
            companies = companies.len(),
            solutions = solutions.len(),
            scheduled = scheduled.len(),
            "radar snapshot loaded"
        );

        Ok(RadarSnapshot {
            companies,
            solutions,
            scheduled,
            loaded_at: Utc::now(),
        })
    }

    async fn fetch(
        source: &dyn SheetSource,
        table: RadarTable,
    ) -> Result<Option<Vec<u8>>, LoaderError> {
        match source.fetch(table).await? {
            None if table.required() => Err(LoaderError::MissingTable { table }),
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct StaticSource(HashMap<RadarTable, &'static str>);

    #[async_trait]
    impl SheetSource for StaticSource {
        async fn fetch(&self, table: RadarTable) -> Result<Option<Vec<u8>>, LoaderError> {
            Ok(self.0.get(&table).map(|csv| csv.as_bytes().to_vec()))
        }

        fn describe(&self) -> String {
            "static".to_string()
        }
    }

    #[tokio::test]
    async fn load_builds_snapshot_without_scheduled_table() {
        let source = StaticSource(HashMap::from([
            (
                RadarTable::Companies,
                "Nome da empresa,Regional,Desafio priorizado\nEmpresa A,Central,Marketing digital\n",
            ),
            (
                RadarTable::Solutions,
                "Nome da solução,Tema\nWorkshop de Marketing,Marketing\n",
            ),
        ]));

        let snapshot = RadarLoader::load(&source).await.expect("snapshot");
        assert_eq!(snapshot.companies.len(), 1);
        assert_eq!(snapshot.solutions.len(), 1);
        assert!(snapshot.scheduled.is_empty());
    }

    #[tokio::test]
    async fn load_fails_when_solutions_missing() {
        let source = StaticSource(HashMap::from([(
            RadarTable::Companies,
            "Nome da empresa\nEmpresa A\n",
        )]));

        match RadarLoader::load(&source).await {
            Err(LoaderError::MissingTable { table }) => assert_eq!(table, RadarTable::Solutions),
            other => panic!("expected missing table, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn load_never_yields_partial_snapshot() {
        let source = StaticSource(HashMap::from([
            (RadarTable::Companies, "Nome da empresa\nEmpresa A\n"),
            (RadarTable::Solutions, "Nome da solução\nCurso\n"),
            (RadarTable::Scheduled, "Nome da solução,Regional,Empresa\nCurso,,\n"),
        ]));

        assert!(matches!(
            RadarLoader::load(&source).await,
            Err(LoaderError::InvalidRow {
                table: RadarTable::Scheduled,
                ..
            })
        ));
    }
}
