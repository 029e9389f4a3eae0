use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryEmployeeDirectory};
use crate::routes::with_bonus_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use staff_bonus::config::AppConfig;
use staff_bonus::error::AppError;
use staff_bonus::telemetry;
use staff_bonus::workflows::eligibility::BonusService;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let directory = Arc::new(InMemoryEmployeeDirectory::default());
    let service = Arc::new(BonusService::from_config(directory, &config.bonus));

    let app = with_bonus_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        seeded_rules = config.bonus.seed_default_rules,
        "staff bonus service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
