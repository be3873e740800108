use metrics_exporter_prometheus::PrometheusHandle;
use radar_ali::config::{AppConfig, DataConfig, DataSourceConfig};
use radar_ali::error::AppError;
use radar_ali::radar::{
    DirectorySource, PublishedSheetSource, RadarService, SheetSource, SnapshotCache,
    SolutionRegistry,
};
use radar_ali::recommendation::{model_from_config, RecommendationOrchestrator, ScoringEngine};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

const SHEET_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Point the configuration at a local CSV directory, replacing any sheet URLs.
pub(crate) fn override_data_dir(config: &mut AppConfig, data_dir: Option<PathBuf>) {
    if let Some(dir) = data_dir {
        config.data.source = DataSourceConfig::Directory(dir);
    }
}

pub(crate) fn sheet_source(config: &DataConfig) -> Result<Arc<dyn SheetSource>, AppError> {
    match &config.source {
        DataSourceConfig::Directory(root) => {
            Ok(Arc::new(DirectorySource::new(root)) as Arc<dyn SheetSource>)
        }
        DataSourceConfig::PublishedSheets {
            companies_url,
            solutions_url,
            scheduled_url,
        } => Ok(Arc::new(PublishedSheetSource::new(
            companies_url.clone(),
            solutions_url.clone(),
            scheduled_url.clone(),
            SHEET_DOWNLOAD_TIMEOUT,
        )?)),
    }
}

/// Wire the snapshot cache, the session registry and the recommendation pipeline.
pub(crate) fn build_radar_service(config: &AppConfig) -> Result<Arc<RadarService>, AppError> {
    let source = sheet_source(&config.data)?;
    info!(
        source = %source.describe(),
        ttl_secs = config.data.cache_ttl.as_secs(),
        "radar data source configured"
    );
    let cache = Arc::new(SnapshotCache::new(source, config.data.cache_ttl));

    let model = Arc::from(model_from_config(&config.llm)?);
    let orchestrator = Arc::new(RecommendationOrchestrator::new(
        ScoringEngine::new(config.scoring),
        model,
        config.llm.timeout,
    ));
    info!(
        model = orchestrator.model_name(),
        top_n = config.scoring.top_n,
        "recommendation pipeline ready"
    );

    Ok(Arc::new(RadarService::new(
        cache,
        Arc::new(SolutionRegistry::new()),
        orchestrator,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use radar_ali::config::{
        AppEnvironment, LlmConfig, ScoringConfig, ServerConfig, TelemetryConfig,
    };

    fn config() -> AppConfig {
        AppConfig {
            environment: AppEnvironment::Test,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            telemetry: TelemetryConfig {
                log_level: "warn".to_string(),
            },
            data: DataConfig {
                source: DataSourceConfig::PublishedSheets {
                    companies_url: "https://sheets.example.test/companies.csv".to_string(),
                    solutions_url: "https://sheets.example.test/solutions.csv".to_string(),
                    scheduled_url: None,
                },
                cache_ttl: Duration::from_secs(60),
            },
            scoring: ScoringConfig::default(),
            llm: LlmConfig {
                api_key: None,
                base_url: LlmConfig::DEFAULT_BASE_URL.to_string(),
                model: LlmConfig::DEFAULT_MODEL.to_string(),
                timeout: Duration::from_secs(5),
                temperature: 0.7,
                max_tokens: 1000,
            },
        }
    }

    #[test]
    fn data_dir_override_replaces_sheet_urls() {
        let mut config = config();
        override_data_dir(&mut config, Some(PathBuf::from("fixtures")));
        assert_eq!(
            config.data.source,
            DataSourceConfig::Directory(PathBuf::from("fixtures"))
        );

        override_data_dir(&mut config, None);
        assert_eq!(
            config.data.source,
            DataSourceConfig::Directory(PathBuf::from("fixtures"))
        );
    }

    #[test]
    fn service_builds_without_model_key() {
        let service = build_radar_service(&config()).expect("service");
        assert_eq!(service.orchestrator().model_name(), "disabled");
    }
}
