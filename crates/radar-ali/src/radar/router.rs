use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::CompanyId;
use super::registry::SolutionSubmission;
use super::service::{RadarService, RadarServiceError};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RegionalQuery {
    #[serde(default)]
    regional: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CurationQuery {
    #[serde(default)]
    regional: Option<String>,
    #[serde(default)]
    suggest: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecommendationRequest {
    company_id: String,
}

/// HTTP endpoints over the radar service.
pub fn radar_router(service: Arc<RadarService>) -> Router {
    Router::new()
        .route("/api/v1/dashboard", get(dashboard_handler))
        .route("/api/v1/companies", get(companies_handler))
        .route(
            "/api/v1/solutions",
            get(catalog_handler).post(register_handler),
        )
        .route("/api/v1/recommendations", post(recommend_handler))
        .route("/api/v1/curation", get(curation_handler))
        .route("/api/v1/data/refresh", post(refresh_handler))
        .with_state(service)
}

fn error_response(error: RadarServiceError) -> Response {
    let status = error.status_code();
    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}

pub(crate) async fn dashboard_handler(
    State(service): State<Arc<RadarService>>,
    Query(query): Query<RegionalQuery>,
) -> Response {
    match service.dashboard(query.regional.as_deref()).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn companies_handler(
    State(service): State<Arc<RadarService>>,
    Query(query): Query<RegionalQuery>,
) -> Response {
    match service.companies(query.regional.as_deref()).await {
        Ok(companies) => {
            let payload = json!({
                "total": companies.len(),
                "companies": companies,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn catalog_handler(State(service): State<Arc<RadarService>>) -> Response {
    match service.catalog().await {
        Ok(solutions) => {
            let payload = json!({
                "total": solutions.len(),
                "solutions": solutions,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn register_handler(
    State(service): State<Arc<RadarService>>,
    Json(submission): Json<SolutionSubmission>,
) -> Response {
    match service.register(submission).await {
        Ok(report) => (StatusCode::CREATED, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn recommend_handler(
    State(service): State<Arc<RadarService>>,
    Json(request): Json<RecommendationRequest>,
) -> Response {
    let company_id = CompanyId::from_raw(&request.company_id);
    match service.recommend(&company_id).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn curation_handler(
    State(service): State<Arc<RadarService>>,
    Query(query): Query<CurationQuery>,
) -> Response {
    match service
        .curation(query.regional.as_deref(), query.suggest)
        .await
    {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn refresh_handler(State(service): State<Arc<RadarService>>) -> Response {
    match service.refresh().await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use crate::radar::cache::SnapshotCache;
    use crate::radar::registry::{RegistryError, SolutionRegistry};
    use crate::radar::source::DirectorySource;
    use crate::radar::RadarTable;
    use crate::recommendation::{DisabledModel, RecommendationOrchestrator, ScoringEngine};
    use std::time::Duration;

    fn service_over(dir: &std::path::Path) -> Arc<RadarService> {
        let cache = Arc::new(SnapshotCache::new(
            Arc::new(DirectorySource::new(dir)),
            Duration::from_secs(60),
        ));
        let orchestrator = Arc::new(RecommendationOrchestrator::new(
            ScoringEngine::new(ScoringConfig::default()),
            Arc::new(DisabledModel),
            Duration::from_secs(1),
        ));
        Arc::new(RadarService::new(
            cache,
            Arc::new(SolutionRegistry::new()),
            orchestrator,
        ))
    }

    #[tokio::test]
    async fn missing_data_maps_to_service_unavailable() {
        let dir = std::env::temp_dir().join(format!("radar-ali-router-empty-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("scratch dir");
        let service = service_over(&dir);

        let response =
            dashboard_handler(State(service), Query(RegionalQuery::default())).await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn registry_errors_map_to_client_statuses() {
        let duplicate = error_response(RadarServiceError::Registration(RegistryError::Duplicate(
            crate::radar::SolutionId("curso".to_string()),
        )));
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);

        let empty = error_response(RadarServiceError::Registration(RegistryError::EmptyTitle));
        assert_eq!(empty.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let missing = error_response(RadarServiceError::CompanyNotFound(CompanyId(
            "nada".to_string(),
        )));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let unavailable = error_response(RadarServiceError::DataUnavailable(
            crate::radar::LoaderError::MissingTable {
                table: RadarTable::Companies,
            },
        ));
        assert_eq!(unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
