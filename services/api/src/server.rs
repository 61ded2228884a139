use crate::cli::ServeArgs;
use crate::infra::{load_pricing_config, AppState, InMemoryApprovalQueue, InMemoryEstimateRepository};
use crate::routes::with_estimate_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use cleanops::config::AppConfig;
use cleanops::error::AppError;
use cleanops::pricing::EstimateService;
use cleanops::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));

    let pricing_config = load_pricing_config(&config)?;
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        pricing: Arc::new(pricing_config.clone()),
    };

    let repository = Arc::new(InMemoryEstimateRepository::default());
    let approvals = Arc::new(InMemoryApprovalQueue::default());
    let estimate_service = Arc::new(EstimateService::new(repository, approvals, pricing_config)?);

    let app = with_estimate_routes(estimate_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "pricing and estimate service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
