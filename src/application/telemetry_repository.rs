// Repository trait for telemetry data access
use crate::domain::telemetry::TemperatureReading;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Time window for a temperature query
#[derive(Debug, Clone, PartialEq)]
pub enum TimeWindow {
    /// Everything newer than `now() - hours`
    LastHours(u32),
    /// Inclusive absolute bounds
    Between {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// List all known waterjet IDs
    async fn list_waterjet_ids(&self) -> anyhow::Result<Vec<String>>;

    /// Temperature readings in the window, oldest first.
    /// With `waterjet_id = None` readings from every waterjet are returned.
    async fn query_temperatures(
        &self,
        window: &TimeWindow,
        waterjet_id: Option<&str>,
    ) -> anyhow::Result<Vec<TemperatureReading>>;
}
