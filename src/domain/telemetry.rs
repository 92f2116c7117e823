// Telemetry data domain models
use chrono::{DateTime, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};

/// One point of the fault-probability chart.
///
/// `probability` is a fraction in [0, 1]; `timestamp` is epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub time: String,
    pub probability: f64,
    pub timestamp: i64,
}

impl TimeSeriesPoint {
    pub fn new(time: impl Into<String>, probability: f64, timestamp: i64) -> Self {
        Self {
            time: time.into(),
            probability,
            timestamp,
        }
    }

    /// Minute of the day (`hour * 60 + minute`) of this point's timestamp in `offset`.
    ///
    /// The calendar date is discarded. Timestamps outside chrono's range yield `None`.
    pub fn minute_of_day(&self, offset: FixedOffset) -> Option<u16> {
        let instant = DateTime::from_timestamp_millis(self.timestamp)?.with_timezone(&offset);
        Some((instant.hour() * 60 + instant.minute()) as u16)
    }
}

/// Most recent reading of a waterjet.
///
/// `fault_probability` is a percentage (0-100), unlike the fractional series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestReading {
    pub temperature: f64,
    pub fault_probability: f64,
    pub timestamp: String,
}

impl LatestReading {
    pub fn new(temperature: f64, fault_probability: f64, timestamp: impl Into<String>) -> Self {
        Self {
            temperature,
            fault_probability,
            timestamp: timestamp.into(),
        }
    }
}

/// Raw temperature sample as stored in the time-series database.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureReading {
    pub time_ms: i64,
    pub time: String,
    pub temperature: f64,
}

impl TemperatureReading {
    pub fn new(time_ms: i64, time: String, temperature: f64) -> Self {
        Self {
            time_ms,
            time,
            temperature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn millis(y: i32, m: u32, d: u32, h: u32, min: u32) -> i64 {
        Utc.from_utc_datetime(
            &NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, 0)
                .unwrap(),
        )
        .timestamp_millis()
    }

    #[test]
    fn test_minute_of_day_ignores_date() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let a = TimeSeriesPoint::new("10:30", 0.2, millis(2025, 5, 14, 10, 30));
        let b = TimeSeriesPoint::new("10:30", 0.2, millis(2025, 5, 15, 10, 30));

        assert_eq!(a.minute_of_day(utc), Some(630));
        assert_eq!(b.minute_of_day(utc), Some(630));
    }

    #[test]
    fn test_minute_of_day_uses_offset() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let point = TimeSeriesPoint::new("23:15", 0.2, millis(2025, 5, 14, 23, 15));

        // 23:15 UTC is 01:15 the next day at +02:00
        assert_eq!(point.minute_of_day(plus_two), Some(75));
    }

    #[test]
    fn test_latest_reading_wire_names() {
        let latest = LatestReading::new(32.1, 28.6, "2025-05-15T10:00:00+00:00");
        let json = serde_json::to_value(&latest).unwrap();

        assert_eq!(json["faultProbability"], 28.6);
        assert_eq!(json["temperature"], 32.1);
    }
}
