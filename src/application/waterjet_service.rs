// Waterjet service - Use cases for listing waterjets and their dates
use crate::application::telemetry_repository::TelemetryRepository;
use chrono::{DateTime, Days, FixedOffset, Utc};
use std::sync::Arc;

#[derive(Clone)]
pub struct WaterjetService {
    repository: Arc<dyn TelemetryRepository>,
    recent_days: u32,
    offset: FixedOffset,
}

impl WaterjetService {
    pub fn new(repository: Arc<dyn TelemetryRepository>, recent_days: u32, offset: FixedOffset) -> Self {
        Self {
            repository,
            recent_days,
            offset,
        }
    }

    /// Waterjet IDs in repository order; the dashboard relies on this order for its default selection
    pub async fn list_waterjet_ids(&self) -> anyhow::Result<Vec<String>> {
        self.repository.list_waterjet_ids().await
    }

    /// The most recent calendar dates as `YYYY-MM-DD`, newest first
    pub fn available_dates(&self, now: DateTime<Utc>) -> Vec<String> {
        let today = now.with_timezone(&self.offset).date_naive();
        (0..self.recent_days)
            .filter_map(|i| today.checked_sub_days(Days::new(u64::from(i))))
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::telemetry_repository::TimeWindow;
    use crate::domain::telemetry::TemperatureReading;
    use async_trait::async_trait;
    use chrono::TimeZone;

    struct FixedRepository;

    #[async_trait]
    impl TelemetryRepository for FixedRepository {
        async fn list_waterjet_ids(&self) -> anyhow::Result<Vec<String>> {
            Ok(vec!["WaterJet_02".to_string(), "WaterJet_01".to_string()])
        }

        async fn query_temperatures(
            &self,
            _window: &TimeWindow,
            _waterjet_id: Option<&str>,
        ) -> anyhow::Result<Vec<TemperatureReading>> {
            Ok(Vec::new())
        }
    }

    fn service(offset_hours: i32) -> WaterjetService {
        WaterjetService::new(
            Arc::new(FixedRepository),
            3,
            FixedOffset::east_opt(offset_hours * 3600).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_list_keeps_repository_order() {
        let ids = service(0).list_waterjet_ids().await.unwrap();
        assert_eq!(ids, vec!["WaterJet_02", "WaterJet_01"]);
    }

    #[test]
    fn test_available_dates_newest_first() {
        let now = Utc.with_ymd_and_hms(2025, 5, 15, 12, 0, 0).unwrap();
        assert_eq!(
            service(0).available_dates(now),
            vec!["2025-05-15", "2025-05-14", "2025-05-13"]
        );
    }

    #[test]
    fn test_available_dates_follow_offset() {
        // 23:00 UTC is already the 16th at +02:00
        let now = Utc.with_ymd_and_hms(2025, 5, 15, 23, 0, 0).unwrap();
        assert_eq!(service(2).available_dates(now)[0], "2025-05-16");
    }
}
