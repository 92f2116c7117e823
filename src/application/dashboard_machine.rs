//! Selection cascade of the dashboard as a pure state-transition function.
//!
//! [`update`] applies an [`Event`] to the [`DashboardState`] and returns the
//! fetches to issue as [`Effect`] values. Nothing here performs I/O.
//!
//! Every fetch carries the generation of the state slot it will fill (device
//! list, date list or payload). Selecting something new bumps the slot's
//! generation, so a completion issued for an older selection no longer
//! matches and is dropped instead of overwriting fresher state.

use crate::domain::dashboard::DashboardPayload;
use crate::domain::filter::filter_by_range;
use crate::domain::selection::{MinuteRange, Selection};
use crate::domain::telemetry::TimeSeriesPoint;
use chrono::FixedOffset;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The dashboard was mounted
    Activated,
    DeviceSelected(String),
    DateSelected(String),
    RangeChanged(MinuteRange),
    DevicesLoaded {
        generation: u64,
        result: Result<Vec<String>, String>,
    },
    DatesLoaded {
        generation: u64,
        device: String,
        result: Result<Vec<String>, String>,
    },
    PayloadLoaded {
        generation: u64,
        result: Result<DashboardPayload, String>,
    },
}

impl Event {
    /// Whether this event reports the outcome of an [`Effect`]
    pub fn is_completion(&self) -> bool {
        matches!(
            self,
            Event::DevicesLoaded { .. } | Event::DatesLoaded { .. } | Event::PayloadLoaded { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchDevices {
        generation: u64,
    },
    FetchDates {
        generation: u64,
        device: String,
    },
    FetchPayload {
        generation: u64,
        device: String,
        date: String,
    },
}

#[derive(Debug, Clone, Copy, Default)]
struct Generations {
    devices: u64,
    dates: u64,
    payload: u64,
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    /// `None` until the device list has resolved, successfully or not
    pub devices: Option<Vec<String>>,
    pub dates: Vec<String>,
    pub selection: Selection,
    pub payload: Option<DashboardPayload>,
    /// The payload series restricted to the selected range
    pub filtered: Vec<TimeSeriesPoint>,
    pub dates_loading: bool,
    pub is_loading: bool,
    pub device_error: Option<String>,
    pub date_error: Option<String>,
    pub payload_error: Option<String>,
    generations: Generations,
    offset: FixedOffset,
}

impl DashboardState {
    /// Fresh state; minute-of-day is evaluated in `offset`.
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            devices: None,
            dates: Vec::new(),
            selection: Selection::default(),
            payload: None,
            filtered: Vec::new(),
            dates_loading: false,
            is_loading: false,
            device_error: None,
            date_error: None,
            payload_error: None,
            generations: Generations::default(),
            offset,
        }
    }

    fn refilter(&mut self) {
        self.filtered = match &self.payload {
            Some(payload) => filter_by_range(&payload.series, self.selection.range, self.offset),
            None => Vec::new(),
        };
    }

    fn select_device(&mut self, device: String) -> Vec<Effect> {
        if device == self.selection.device {
            return Vec::new();
        }
        tracing::info!("Selected device {}", device);

        self.selection.device = device.clone();
        self.selection.date.clear();
        self.dates.clear();
        self.date_error = None;
        self.dates_loading = true;
        self.generations.dates += 1;

        // Whatever payload is shown or in flight belongs to the previous device
        self.generations.payload += 1;
        self.payload = None;
        self.payload_error = None;
        self.is_loading = false;
        self.refilter();

        vec![Effect::FetchDates {
            generation: self.generations.dates,
            device,
        }]
    }

    fn select_date(&mut self, date: String) -> Vec<Effect> {
        if self.selection.device.is_empty() || date == self.selection.date {
            return Vec::new();
        }
        tracing::info!("Selected date {} for {}", date, self.selection.device);
        self.selection.date = date;
        self.start_payload_fetch()
    }

    fn start_payload_fetch(&mut self) -> Vec<Effect> {
        if !self.selection.is_complete() {
            return Vec::new();
        }
        self.generations.payload += 1;
        self.payload_error = None;
        self.is_loading = true;

        vec![Effect::FetchPayload {
            generation: self.generations.payload,
            device: self.selection.device.clone(),
            date: self.selection.date.clone(),
        }]
    }
}

/// Apply `event` to `state` and return the fetches the runtime must perform.
pub fn update(state: &mut DashboardState, event: Event) -> Vec<Effect> {
    match event {
        Event::Activated => {
            state.generations.devices += 1;
            state.devices = None;
            state.device_error = None;
            vec![Effect::FetchDevices {
                generation: state.generations.devices,
            }]
        }

        Event::DeviceSelected(device) => {
            let known = state
                .devices
                .as_ref()
                .is_some_and(|devices| devices.contains(&device));
            if !known {
                tracing::warn!("Ignoring selection of unknown device {}", device);
                return Vec::new();
            }
            state.select_device(device)
        }

        Event::DateSelected(date) => {
            if state.selection.device.is_empty() {
                tracing::debug!("Ignoring date {} with no device selected", date);
                return Vec::new();
            }
            if !state.dates.contains(&date) {
                tracing::warn!(
                    "Ignoring date {} not offered for {}",
                    date,
                    state.selection.device
                );
                return Vec::new();
            }
            state.select_date(date)
        }

        Event::RangeChanged(range) => {
            state.selection.range = range;
            state.refilter();
            Vec::new()
        }

        Event::DevicesLoaded { generation, result } => {
            if generation != state.generations.devices {
                tracing::debug!("Discarding stale device list (generation {})", generation);
                return Vec::new();
            }
            match result {
                Ok(devices) => {
                    let first = devices.first().cloned();
                    state.devices = Some(devices);
                    match first {
                        Some(device) => state.select_device(device),
                        None => Vec::new(),
                    }
                }
                Err(message) => {
                    tracing::warn!("Failed to load devices: {}", message);
                    state.devices = Some(Vec::new());
                    state.device_error = Some(message);
                    Vec::new()
                }
            }
        }

        Event::DatesLoaded {
            generation,
            device,
            result,
        } => {
            if generation != state.generations.dates {
                tracing::debug!(
                    "Discarding stale date list for {} (generation {})",
                    device,
                    generation
                );
                return Vec::new();
            }
            state.dates_loading = false;
            match result {
                Ok(dates) => {
                    let first = dates.first().cloned();
                    state.dates = dates;
                    match first {
                        Some(date) => state.select_date(date),
                        None => Vec::new(),
                    }
                }
                Err(message) => {
                    tracing::warn!("Failed to load dates for {}: {}", device, message);
                    state.date_error = Some(message);
                    Vec::new()
                }
            }
        }

        Event::PayloadLoaded { generation, result } => {
            if generation != state.generations.payload {
                tracing::debug!("Discarding stale payload (generation {})", generation);
                return Vec::new();
            }
            state.is_loading = false;
            match result {
                Ok(payload) => {
                    state.payload = Some(payload);
                }
                Err(message) => {
                    tracing::warn!(
                        "Failed to load dashboard for {} on {}: {}",
                        state.selection.device,
                        state.selection.date,
                        message
                    );
                    state.payload_error = Some(message);
                    state.payload = None;
                }
            }
            state.refilter();
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::LatestReading;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn payload() -> DashboardPayload {
        let midnight = Utc
            .from_utc_datetime(
                &NaiveDate::from_ymd_opt(2025, 5, 15)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
            )
            .timestamp_millis();
        DashboardPayload::new(
            vec![
                TimeSeriesPoint::new("00:00", 0.1, midnight),
                TimeSeriesPoint::new("12:00", 0.5, midnight + 12 * 3_600_000),
            ],
            LatestReading::new(32.1, 28.6, "2025-05-15T12:00:00+00:00"),
            strings(&["WJ-001", "WJ-002"]),
            strings(&["2025-05-15", "2025-05-14"]),
        )
    }

    /// Run the cascade up to a loaded payload for WJ-001 / 2025-05-15.
    fn loaded_state() -> DashboardState {
        let mut state = DashboardState::new(utc());
        update(&mut state, Event::Activated);
        update(
            &mut state,
            Event::DevicesLoaded {
                generation: 1,
                result: Ok(strings(&["WJ-001", "WJ-002"])),
            },
        );
        update(
            &mut state,
            Event::DatesLoaded {
                generation: 1,
                device: "WJ-001".to_string(),
                result: Ok(strings(&["2025-05-15", "2025-05-14"])),
            },
        );
        let generation = state.generations.payload;
        update(
            &mut state,
            Event::PayloadLoaded {
                generation,
                result: Ok(payload()),
            },
        );
        state
    }

    #[test]
    fn test_activation_fetches_devices() {
        let mut state = DashboardState::new(utc());
        let effects = update(&mut state, Event::Activated);

        assert_eq!(effects, vec![Effect::FetchDevices { generation: 1 }]);
        assert!(state.devices.is_none());
    }

    #[test]
    fn test_cascade_selects_first_device_and_date() {
        let mut state = DashboardState::new(utc());
        update(&mut state, Event::Activated);

        let effects = update(
            &mut state,
            Event::DevicesLoaded {
                generation: 1,
                result: Ok(strings(&["WJ-001", "WJ-002"])),
            },
        );
        assert_eq!(state.selection.device, "WJ-001");
        assert_eq!(
            effects,
            vec![Effect::FetchDates {
                generation: 1,
                device: "WJ-001".to_string()
            }]
        );

        let effects = update(
            &mut state,
            Event::DatesLoaded {
                generation: 1,
                device: "WJ-001".to_string(),
                result: Ok(strings(&["2025-05-15", "2025-05-14"])),
            },
        );
        assert_eq!(state.selection.date, "2025-05-15");
        assert!(state.is_loading);
        assert_eq!(
            effects,
            vec![Effect::FetchPayload {
                generation: 2,
                device: "WJ-001".to_string(),
                date: "2025-05-15".to_string()
            }]
        );
    }

    #[test]
    fn test_full_range_shows_whole_series() {
        let state = loaded_state();

        assert!(!state.is_loading);
        assert_eq!(state.filtered, payload().series);
    }

    #[test]
    fn test_range_change_refilters_without_fetching() {
        let mut state = loaded_state();

        let effects = update(
            &mut state,
            Event::RangeChanged(MinuteRange::new(0, 600).unwrap()),
        );

        assert!(effects.is_empty());
        assert_eq!(state.filtered, vec![payload().series[0].clone()]);
        assert_eq!(state.payload, Some(payload()));
    }

    #[test]
    fn test_payload_failure_discards_previous_payload() {
        let mut state = loaded_state();
        let effects = update(&mut state, Event::DateSelected("2025-05-14".to_string()));
        let generation = match &effects[..] {
            [Effect::FetchPayload { generation, .. }] => *generation,
            other => panic!("unexpected effects {:?}", other),
        };
        assert!(state.payload_error.is_none());

        update(
            &mut state,
            Event::PayloadLoaded {
                generation,
                result: Err("HTTP 500 Internal Server Error".to_string()),
            },
        );

        assert!(!state.is_loading);
        assert!(state.payload.is_none());
        assert!(state.filtered.is_empty());
        assert_eq!(
            state.payload_error.as_deref(),
            Some("HTTP 500 Internal Server Error")
        );
    }

    #[test]
    fn test_empty_device_list_stops_cascade() {
        let mut state = DashboardState::new(utc());
        update(&mut state, Event::Activated);

        let effects = update(
            &mut state,
            Event::DevicesLoaded {
                generation: 1,
                result: Ok(Vec::new()),
            },
        );

        assert!(effects.is_empty());
        assert_eq!(state.devices, Some(Vec::new()));
        assert!(state.selection.device.is_empty());
        assert!(update(&mut state, Event::DateSelected("2025-05-15".to_string())).is_empty());
    }

    #[test]
    fn test_device_list_failure() {
        let mut state = DashboardState::new(utc());
        update(&mut state, Event::Activated);
        update(
            &mut state,
            Event::DevicesLoaded {
                generation: 1,
                result: Err("connection refused".to_string()),
            },
        );

        assert_eq!(state.device_error.as_deref(), Some("connection refused"));
        assert!(state.selection.device.is_empty());
    }

    #[test]
    fn test_date_list_failure_keeps_device() {
        let mut state = DashboardState::new(utc());
        update(&mut state, Event::Activated);
        update(
            &mut state,
            Event::DevicesLoaded {
                generation: 1,
                result: Ok(strings(&["WJ-001"])),
            },
        );
        let effects = update(
            &mut state,
            Event::DatesLoaded {
                generation: 1,
                device: "WJ-001".to_string(),
                result: Err("HTTP 502".to_string()),
            },
        );

        assert!(effects.is_empty());
        assert_eq!(state.selection.device, "WJ-001");
        assert_eq!(state.date_error.as_deref(), Some("HTTP 502"));
        assert!(!state.dates_loading);
    }

    #[test]
    fn test_new_device_issues_one_date_fetch_then_one_payload_fetch() {
        let mut state = loaded_state();

        let effects = update(&mut state, Event::DeviceSelected("WJ-002".to_string()));
        assert_eq!(
            effects,
            vec![Effect::FetchDates {
                generation: 2,
                device: "WJ-002".to_string()
            }]
        );
        assert!(state.selection.date.is_empty());
        assert!(state.payload.is_none());

        let effects = update(
            &mut state,
            Event::DatesLoaded {
                generation: 2,
                device: "WJ-002".to_string(),
                result: Ok(strings(&["2025-05-15"])),
            },
        );
        assert_eq!(effects.len(), 1);
        assert!(matches!(effects[0], Effect::FetchPayload { ref device, .. } if device == "WJ-002"));
    }

    #[test]
    fn test_reselecting_is_a_no_op() {
        let mut state = loaded_state();

        assert!(update(&mut state, Event::DeviceSelected("WJ-001".to_string())).is_empty());
        assert!(update(&mut state, Event::DateSelected("2025-05-15".to_string())).is_empty());
        assert!(state.payload.is_some());
    }

    #[test]
    fn test_unknown_selections_are_ignored() {
        let mut state = loaded_state();

        assert!(update(&mut state, Event::DeviceSelected("WJ-999".to_string())).is_empty());
        assert!(update(&mut state, Event::DateSelected("1999-01-01".to_string())).is_empty());
        assert_eq!(state.selection.device, "WJ-001");
        assert_eq!(state.selection.date, "2025-05-15");
    }

    #[test]
    fn test_stale_completions_are_discarded() {
        let mut state = loaded_state();

        // Switch to WJ-002 while WJ-001's dates and payload are still "in flight"
        update(&mut state, Event::DeviceSelected("WJ-002".to_string()));

        let effects = update(
            &mut state,
            Event::DatesLoaded {
                generation: 1,
                device: "WJ-001".to_string(),
                result: Ok(strings(&["2020-01-01"])),
            },
        );
        assert!(effects.is_empty());
        assert!(state.dates.is_empty());
        assert!(state.dates_loading);

        update(
            &mut state,
            Event::PayloadLoaded {
                generation: 2,
                result: Ok(payload()),
            },
        );
        assert!(state.payload.is_none());

        update(
            &mut state,
            Event::DevicesLoaded {
                generation: 0,
                result: Ok(Vec::new()),
            },
        );
        assert_eq!(state.devices, Some(strings(&["WJ-001", "WJ-002"])));
    }

    #[test]
    fn test_superseded_payload_fetch() {
        let mut state = loaded_state();

        let first = update(&mut state, Event::DateSelected("2025-05-14".to_string()));
        let second = update(&mut state, Event::DateSelected("2025-05-15".to_string()));
        let (old, new) = match (&first[..], &second[..]) {
            ([Effect::FetchPayload { generation: a, .. }], [Effect::FetchPayload { generation: b, .. }]) => {
                (*a, *b)
            }
            other => panic!("unexpected effects {:?}", other),
        };

        update(
            &mut state,
            Event::PayloadLoaded {
                generation: old,
                result: Err("late failure".to_string()),
            },
        );
        assert!(state.is_loading);
        assert!(state.payload_error.is_none());

        update(
            &mut state,
            Event::PayloadLoaded {
                generation: new,
                result: Ok(payload()),
            },
        );
        assert!(!state.is_loading);
        assert_eq!(state.filtered.len(), 2);
    }
}
