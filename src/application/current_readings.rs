// Current readings - Periodically refreshed snapshot of recent temperatures
use crate::application::telemetry_repository::{TelemetryRepository, TimeWindow};
use crate::domain::telemetry::TemperatureReading;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

#[derive(Clone, Default)]
pub struct CurrentReadings {
    snapshot: Arc<RwLock<Vec<TemperatureReading>>>,
}

impl CurrentReadings {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Vec<TemperatureReading> {
        self.snapshot.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.snapshot.read().await.len()
    }

    /// Replace the snapshot with the last `window_hours` of readings from every waterjet.
    /// On failure the previous snapshot is kept.
    pub async fn refresh(
        &self,
        repository: &dyn TelemetryRepository,
        window_hours: u32,
    ) -> anyhow::Result<usize> {
        let readings = repository
            .query_temperatures(&TimeWindow::LastHours(window_hours), None)
            .await?;
        let count = readings.len();
        *self.snapshot.write().await = readings;
        Ok(count)
    }

    /// Refresh now and then every `interval` until the returned task is aborted.
    pub fn spawn_refresher(
        &self,
        repository: Arc<dyn TelemetryRepository>,
        window_hours: u32,
        interval: Duration,
    ) -> JoinHandle<()> {
        let readings = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match readings.refresh(repository.as_ref(), window_hours).await {
                    Ok(count) => tracing::info!("Refreshed current readings: {} points", count),
                    Err(e) => tracing::error!("Failed to refresh current readings: {:#}", e),
                }
            }
        })
    }
}
