use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use super::{LoaderError, RadarTable};

/// Read-only access to the raw CSV bytes of each radar table.
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// `Ok(None)` means the table is not provided by this source.
    async fn fetch(&self, table: RadarTable) -> Result<Option<Vec<u8>>, LoaderError>;

    fn describe(&self) -> String;
}

/// Local directory of CSV exports: `companies.csv`, `solutions.csv`, `scheduled.csv`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, table: RadarTable) -> PathBuf {
        self.root.join(format!("{}.csv", table.as_str()))
    }
}

#[async_trait]
impl SheetSource for DirectorySource {
    async fn fetch(&self, table: RadarTable) -> Result<Option<Vec<u8>>, LoaderError> {
        let path = self.path_for(table);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound && !table.required() => {
                debug!(path = %path.display(), "optional table missing");
                Ok(None)
            }
            Err(source) => Err(LoaderError::Io { table, source }),
        }
    }

    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }
}

/// Google Sheets tabs published as CSV and fetched over HTTPS.
#[derive(Debug, Clone)]
pub struct PublishedSheetSource {
    http: reqwest::Client,
    companies_url: String,
    solutions_url: String,
    scheduled_url: Option<String>,
}

impl PublishedSheetSource {
    pub fn new(
        companies_url: impl Into<String>,
        solutions_url: impl Into<String>,
        scheduled_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            companies_url: companies_url.into(),
            solutions_url: solutions_url.into(),
            scheduled_url,
        })
    }

    fn url_for(&self, table: RadarTable) -> Option<&str> {
        match table {
            RadarTable::Companies => Some(self.companies_url.as_str()),
            RadarTable::Solutions => Some(self.solutions_url.as_str()),
            RadarTable::Scheduled => self.scheduled_url.as_deref(),
        }
    }
}

#[async_trait]
impl SheetSource for PublishedSheetSource {
    async fn fetch(&self, table: RadarTable) -> Result<Option<Vec<u8>>, LoaderError> {
        let Some(url) = self.url_for(table) else {
            return Ok(None);
        };

        debug!(%table, url, "downloading sheet export");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|source| LoaderError::Http { table, source })?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| LoaderError::Http { table, source })?;

        Ok(Some(bytes.to_vec()))
    }

    fn describe(&self) -> String {
        "published google sheets".to_string()
    }
}

/// CSV export URL of one tab (`gid`) of a Google spreadsheet.
pub fn csv_export_url(spreadsheet_id: &str, gid: u64) -> String {
    format!("https://docs.google.com/spreadsheets/d/{spreadsheet_id}/export?format=csv&gid={gid}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("radar-ali-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    #[tokio::test]
    async fn directory_source_treats_missing_scheduled_as_absent() {
        let dir = scratch_dir("optional");
        let source = DirectorySource::new(&dir);
        let scheduled = source
            .fetch(RadarTable::Scheduled)
            .await
            .expect("optional table");
        assert!(scheduled.is_none());
    }

    #[tokio::test]
    async fn directory_source_requires_companies() {
        let dir = scratch_dir("required");
        let source = DirectorySource::new(&dir);
        match source.fetch(RadarTable::Companies).await {
            Err(LoaderError::Io { table, .. }) => assert_eq!(table, RadarTable::Companies),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn export_url_points_at_csv_tab() {
        assert_eq!(
            csv_export_url("abc123", 42),
            "https://docs.google.com/spreadsheets/d/abc123/export?format=csv&gid=42"
        );
    }
}
