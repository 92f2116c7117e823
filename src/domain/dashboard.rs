// Dashboard payload domain model
use super::telemetry::{LatestReading, TimeSeriesPoint};
use serde::{Deserialize, Serialize};

/// Everything the dashboard shows for one (waterjet, date) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardPayload {
    #[serde(rename = "timeSeries")]
    pub series: Vec<TimeSeriesPoint>,
    #[serde(rename = "latestData")]
    pub latest: LatestReading,
    #[serde(rename = "availableWaterJets", default)]
    pub devices: Vec<String>,
    #[serde(rename = "availableDates", default)]
    pub dates: Vec<String>,
}

impl DashboardPayload {
    pub fn new(
        series: Vec<TimeSeriesPoint>,
        latest: LatestReading,
        devices: Vec<String>,
        dates: Vec<String>,
    ) -> Self {
        Self {
            series,
            latest,
            devices,
            dates,
        }
    }
}
