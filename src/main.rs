// Main entry point - Dependency injection and server setup
use anyhow::Context;
use std::sync::Arc;

use waterjet_monitor::application::current_readings::CurrentReadings;
use waterjet_monitor::application::dashboard_service::DashboardService;
use waterjet_monitor::application::fault_model::FaultModel;
use waterjet_monitor::application::telemetry_repository::TelemetryRepository;
use waterjet_monitor::application::waterjet_service::WaterjetService;
use waterjet_monitor::infrastructure::config::load_server_config;
use waterjet_monitor::infrastructure::influx_repository::InfluxRepository;
use waterjet_monitor::infrastructure::logging::init_tracing;
use waterjet_monitor::presentation::app_state::AppState;
use waterjet_monitor::presentation::handlers::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_server_config()?;
    let offset = config.display.offset()?;

    // Create repository (infrastructure layer)
    let repository: Arc<dyn TelemetryRepository> =
        Arc::new(InfluxRepository::new(config.influx.clone()));

    // Create services (application layer)
    let waterjet_service = WaterjetService::new(repository.clone(), config.dates.recent_days, offset);
    let model = FaultModel::new(&config.fault_model, offset);
    let dashboard_service =
        DashboardService::new(repository.clone(), waterjet_service.clone(), model, offset);

    let current_readings = CurrentReadings::new();
    let refresher = current_readings.spawn_refresher(
        repository.clone(),
        config.refresh.window_hours,
        config.refresh.interval(),
    );

    let state = Arc::new(AppState {
        waterjet_service,
        dashboard_service,
        current_readings,
    });

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    tracing::info!("Starting waterjet-monitor on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    refresher.abort();
    tracing::info!("waterjet-monitor stopped");
    Ok(())
}
