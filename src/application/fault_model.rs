// Fault model - Maps waterjet temperatures to fault probabilities
use crate::domain::dashboard::DashboardPayload;
use crate::domain::telemetry::{LatestReading, TemperatureReading, TimeSeriesPoint};
use crate::infrastructure::config::FaultModelSettings;
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};

/// Hours of the day the chart is sampled at (02:00 through 22:00)
const TARGET_HOURS: [u32; 11] = [2, 4, 6, 8, 10, 12, 14, 16, 18, 20, 22];

#[derive(Debug, Clone)]
pub struct FaultModel {
    min_temp: f64,
    max_temp: f64,
    offset: FixedOffset,
}

impl FaultModel {
    pub fn new(settings: &FaultModelSettings, offset: FixedOffset) -> Self {
        Self {
            min_temp: settings.min_temp,
            max_temp: settings.max_temp,
            offset,
        }
    }

    /// Linear map of `[min_temp, max_temp]` onto `[0, 1]`, saturating outside.
    pub fn temperature_to_probability(&self, temperature: f64) -> f64 {
        if temperature <= self.min_temp {
            0.0
        } else if temperature >= self.max_temp {
            1.0
        } else {
            round_to((temperature - self.min_temp) / (self.max_temp - self.min_temp), 3)
        }
    }

    /// Build the dashboard payload for `day` from raw readings.
    pub fn build_payload(
        &self,
        mut readings: Vec<TemperatureReading>,
        day: NaiveDate,
        devices: Vec<String>,
        dates: Vec<String>,
        now: DateTime<Utc>,
    ) -> DashboardPayload {
        let targets = self.target_timestamps(day);

        readings.retain(|r| r.temperature.is_finite());
        readings.sort_by_key(|r| r.time_ms);

        let Some(last) = readings.last() else {
            tracing::warn!("No temperature readings for {}, returning empty dashboard", day);
            return self.empty_payload(targets, devices, dates, now);
        };

        let latest_probability = self.temperature_to_probability(last.temperature);
        let latest = LatestReading::new(
            last.temperature,
            round_to(latest_probability * 100.0, 1),
            last.time.clone(),
        );

        let samples: Vec<(f64, f64)> = readings
            .iter()
            .map(|r| (r.time_ms as f64, self.temperature_to_probability(r.temperature)))
            .collect();

        let series = targets
            .into_iter()
            .map(|(label, timestamp)| {
                let probability = if samples.len() >= 2 {
                    interpolate(&samples, timestamp as f64).clamp(0.0, 1.0)
                } else {
                    samples[0].1
                };
                TimeSeriesPoint::new(label, round_to(probability, 3), timestamp)
            })
            .collect();

        tracing::debug!("Built series from {} readings for {}", readings.len(), day);
        DashboardPayload::new(series, latest, devices, dates)
    }

    fn empty_payload(
        &self,
        targets: Vec<(String, i64)>,
        devices: Vec<String>,
        dates: Vec<String>,
        now: DateTime<Utc>,
    ) -> DashboardPayload {
        let series = targets
            .into_iter()
            .map(|(label, timestamp)| TimeSeriesPoint::new(label, 0.0, timestamp))
            .collect();
        let latest = LatestReading::new(
            self.min_temp,
            0.0,
            now.with_timezone(&self.offset).to_rfc3339(),
        );
        DashboardPayload::new(series, latest, devices, dates)
    }

    /// `(label, epoch millis)` for every target hour of `day` in the display offset
    fn target_timestamps(&self, day: NaiveDate) -> Vec<(String, i64)> {
        TARGET_HOURS
            .iter()
            .filter_map(|&hour| {
                let local = day.and_hms_opt(hour, 0, 0)?;
                let instant = self.offset.from_local_datetime(&local).single()?;
                Some((hour_label(hour), instant.timestamp_millis()))
            })
            .collect()
    }
}

/// "02am", "12pm", "10pm", ...
fn hour_label(hour: u32) -> String {
    let suffix = if hour < 12 { "am" } else { "pm" };
    let twelve = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{:02}{}", twelve, suffix)
}

/// Piecewise-linear interpolation over samples sorted by x, extrapolating from the edge segments.
fn interpolate(samples: &[(f64, f64)], x: f64) -> f64 {
    let last = samples.len() - 1;
    let (lo, hi) = if x <= samples[0].0 {
        (0, 1)
    } else if x >= samples[last].0 {
        (last - 1, last)
    } else {
        let i = samples.partition_point(|(sx, _)| *sx <= x);
        (i - 1, i)
    };

    let (x0, y0) = samples[lo];
    let (x1, y1) = samples[hi];
    if x1 == x0 {
        return y1;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}
