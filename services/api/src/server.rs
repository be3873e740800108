use crate::cli::ServeArgs;
use crate::infra::{build_radar_service, AppState};
use crate::routes::with_radar_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use radar_ali::config::AppConfig;
use radar_ali::error::AppError;
use radar_ali::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = build_radar_service(&config)?;

    // A cold start serves requests anyway; the cache retries on the next call.
    match service.refresh().await {
        Ok(report) => info!(
            companies = report.companies,
            solutions = report.solutions,
            "radar data preloaded"
        ),
        Err(err) => warn!(error = %err, "radar data unavailable at startup"),
    }

    let app = with_radar_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "radar recommendation service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
