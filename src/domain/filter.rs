// Time-range filter over a fetched series
use super::selection::MinuteRange;
use super::telemetry::TimeSeriesPoint;
use chrono::FixedOffset;

/// Keep the points whose minute-of-day lies in `[start, end]`, inclusive, in their original order.
///
/// No clamping or validation happens here: `start > end` simply matches nothing.
pub fn filter_series(
    series: &[TimeSeriesPoint],
    start: u16,
    end: u16,
    offset: FixedOffset,
) -> Vec<TimeSeriesPoint> {
    retain_minutes(series, offset, |minute| start <= minute && minute <= end)
}

pub fn filter_by_range(
    series: &[TimeSeriesPoint],
    range: MinuteRange,
    offset: FixedOffset,
) -> Vec<TimeSeriesPoint> {
    retain_minutes(series, offset, |minute| range.contains(minute))
}

fn retain_minutes(
    series: &[TimeSeriesPoint],
    offset: FixedOffset,
    keep: impl Fn(u16) -> bool,
) -> Vec<TimeSeriesPoint> {
    series
        .iter()
        .filter(|point| point.minute_of_day(offset).is_some_and(&keep))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn at(day: u32, hour: u32, minute: u32) -> i64 {
        Utc.from_utc_datetime(
            &NaiveDate::from_ymd_opt(2025, 5, day)
                .unwrap()
                .and_hms_opt(hour, minute, 0)
                .unwrap(),
        )
        .timestamp_millis()
    }

    fn day_series() -> Vec<TimeSeriesPoint> {
        vec![
            TimeSeriesPoint::new("00:00", 0.1, at(15, 0, 0)),
            TimeSeriesPoint::new("12:00", 0.5, at(15, 12, 0)),
        ]
    }

    fn mixed_series() -> Vec<TimeSeriesPoint> {
        vec![
            TimeSeriesPoint::new("22:00", 0.9, at(14, 22, 0)),
            TimeSeriesPoint::new("02:00", 0.2, at(15, 2, 0)),
            TimeSeriesPoint::new("10:00", 0.4, at(15, 10, 0)),
            TimeSeriesPoint::new("10:15", 0.45, at(15, 10, 15)),
            TimeSeriesPoint::new("23:55", 0.7, at(15, 23, 55)),
        ]
    }

    #[test]
    fn test_full_day_is_identity() {
        for series in [day_series(), mixed_series(), Vec::new()] {
            assert_eq!(filter_by_range(&series, MinuteRange::full_day(), utc()), series);
        }
    }

    #[test]
    fn test_morning_range_drops_noon() {
        let range = MinuteRange::new(0, 600).unwrap();
        let filtered = filter_by_range(&day_series(), range, utc());

        assert_eq!(filtered, vec![day_series()[0].clone()]);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let range = MinuteRange::new(600, 1335).unwrap();
        let times: Vec<_> = filter_by_range(&mixed_series(), range, utc())
            .into_iter()
            .map(|p| p.time)
            .collect();

        assert_eq!(times, vec!["22:00", "10:00", "10:15"]);
    }

    #[test]
    fn test_single_minute_range() {
        let range = MinuteRange::new(600, 600).unwrap();
        let filtered = filter_by_range(&mixed_series(), range, utc());

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].time, "10:00");
    }

    #[test]
    fn test_inverted_bounds_match_nothing() {
        assert!(filter_series(&mixed_series(), 900, 300, utc()).is_empty());
        assert!(filter_series(&day_series(), 1, 0, utc()).is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        for (start, end) in [(0, 600), (120, 1320), (615, 615), (0, 1435)] {
            let once = filter_series(&mixed_series(), start, end, utc());
            let twice = filter_series(&once, start, end, utc());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_range_and_raw_bounds_agree() {
        for (start, end) in [(0, 600), (600, 1335), (615, 615), (0, 1435)] {
            let range = MinuteRange::new(start, end).unwrap();
            assert_eq!(
                filter_by_range(&mixed_series(), range, utc()),
                filter_series(&mixed_series(), start, end, utc())
            );
        }
    }

    #[test]
    fn test_empty_series() {
        let range = MinuteRange::new(0, 600).unwrap();
        assert!(filter_by_range(&[], range, utc()).is_empty());
    }

    #[test]
    fn test_offset_shifts_minute_of_day() {
        // 00:00 UTC is 22:00 the previous evening at -02:00
        let minus_two = FixedOffset::west_opt(2 * 3600).unwrap();
        let range = MinuteRange::new(1320, 1320).unwrap();

        let filtered = filter_by_range(&day_series(), range, minus_two);
        assert_eq!(filtered, vec![day_series()[0].clone()]);
    }
}
