// Dashboard service - Use cases for building dashboard payloads
use crate::application::fault_model::FaultModel;
use crate::application::telemetry_repository::{TelemetryRepository, TimeWindow};
use crate::application::waterjet_service::WaterjetService;
use crate::domain::dashboard::DashboardPayload;
use crate::domain::telemetry::TemperatureReading;
use anyhow::Context;
use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
use std::sync::Arc;

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn TelemetryRepository>,
    waterjets: WaterjetService,
    model: FaultModel,
    offset: FixedOffset,
}

impl DashboardService {
    pub fn new(
        repository: Arc<dyn TelemetryRepository>,
        waterjets: WaterjetService,
        model: FaultModel,
        offset: FixedOffset,
    ) -> Self {
        Self {
            repository,
            waterjets,
            model,
            offset,
        }
    }

    /// Payload for readings between `start_date` 00:00:00 and `end_date` 23:59:59 (display offset).
    pub async fn get_history(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        waterjet_id: Option<&str>,
    ) -> anyhow::Result<DashboardPayload> {
        let window = self.day_window(start_date, end_date)?;
        tracing::info!(
            "Building history dashboard for {:?} from {} to {}",
            waterjet_id,
            start_date,
            end_date
        );

        let (devices, readings) = futures::try_join!(
            self.waterjets.list_waterjet_ids(),
            self.repository.query_temperatures(&window, waterjet_id),
        )?;

        let now = Utc::now();
        Ok(self.model.build_payload(
            readings,
            start_date,
            devices,
            self.waterjets.available_dates(now),
            now,
        ))
    }

    /// Payload for an already fetched snapshot of recent readings, charted on today's date.
    pub async fn get_current(&self, readings: Vec<TemperatureReading>) -> anyhow::Result<DashboardPayload> {
        let devices = self.waterjets.list_waterjet_ids().await?;
        let now = Utc::now();

        Ok(self.model.build_payload(
            readings,
            self.today(),
            devices,
            self.waterjets.available_dates(now),
            now,
        ))
    }

    /// Current calendar date in the display offset
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }

    fn day_window(&self, start_date: NaiveDate, end_date: NaiveDate) -> anyhow::Result<TimeWindow> {
        let start = start_date
            .and_hms_opt(0, 0, 0)
            .and_then(|t| self.offset.from_local_datetime(&t).single())
            .context("Invalid start of day")?;
        let end = end_date
            .and_hms_opt(23, 59, 59)
            .and_then(|t| self.offset.from_local_datetime(&t).single())
            .context("Invalid end of day")?;

        Ok(TimeWindow::Between {
            start: start.with_timezone(&Utc),
            end: end.with_timezone(&Utc),
        })
    }
}
