use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use jobboard::config::AppConfig;
use jobboard::error::AppError;
use jobboard::telemetry;
use jobboard::workflows::posting::{PostingWizardService, SimulatedPublisher};
use tracing::info;

use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryTemplateRepository};
use crate::routes::with_wizard_routes;

pub(crate) async fn run(args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let templates = Arc::new(InMemoryTemplateRepository::seeded());
    let publisher = Arc::new(SimulatedPublisher::default());
    let service = Arc::new(PostingWizardService::new(
        templates,
        publisher,
        config.wizard,
    ));

    let app = with_wizard_routes(service)
        .layer(Extension(state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        submit_delay_ms = config.wizard.submit_delay.as_millis() as u64,
        session_idle_secs = config.wizard.session_idle_timeout.as_secs(),
        "job board api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
