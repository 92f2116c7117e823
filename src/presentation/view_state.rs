//! View states derived from the dashboard state.
//!
//! Each panel gets exactly one of `Loading`, `Failed`, `Empty` or
//! `Populated`, so "still loading", "request failed" and "no data" are
//! never conflated.

use crate::application::dashboard_machine::DashboardState;
use crate::domain::dashboard::DashboardPayload;
use crate::domain::selection::MinuteRange;
use crate::domain::telemetry::{LatestReading, TimeSeriesPoint};

#[derive(Debug, Clone, PartialEq)]
pub enum PanelState<T> {
    Loading,
    Failed(String),
    Empty,
    Populated(T),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    pub devices: Vec<String>,
    pub device: String,
    pub device_error: Option<String>,
    pub dates: Vec<String>,
    pub date: String,
    pub dates_loading: bool,
    pub date_error: Option<String>,
    /// The date selector needs a device
    pub date_enabled: bool,
    pub range: MinuteRange,
    /// The range slider needs a device and a date
    pub range_enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardView {
    /// Device list not resolved yet; the whole view is a spinner
    InitialLoading,
    Ready {
        controls: Controls,
        /// Payload error shown above the panels
        banner: Option<String>,
        chart: PanelState<Vec<TimeSeriesPoint>>,
        latest: PanelState<LatestReading>,
    },
}

impl DashboardView {
    pub fn from_state(state: &DashboardState) -> Self {
        let Some(devices) = &state.devices else {
            return DashboardView::InitialLoading;
        };

        let controls = Controls {
            devices: devices.clone(),
            device: state.selection.device.clone(),
            device_error: state.device_error.clone(),
            dates: state.dates.clone(),
            date: state.selection.date.clone(),
            dates_loading: state.dates_loading,
            date_error: state.date_error.clone(),
            date_enabled: !state.selection.device.is_empty(),
            range: state.selection.range,
            range_enabled: state.selection.is_complete(),
        };

        let chart = panel(state, |_| {
            if state.filtered.is_empty() {
                PanelState::Empty
            } else {
                PanelState::Populated(state.filtered.clone())
            }
        });
        let latest = panel(state, |payload| PanelState::Populated(payload.latest.clone()));

        DashboardView::Ready {
            controls,
            banner: state.payload_error.clone(),
            chart,
            latest,
        }
    }
}

fn panel<T>(
    state: &DashboardState,
    populated: impl FnOnce(&DashboardPayload) -> PanelState<T>,
) -> PanelState<T> {
    // The payload fetch starts as soon as the date list resolves with a date
    if state.is_loading || state.dates_loading {
        return PanelState::Loading;
    }
    if let Some(error) = &state.payload_error {
        return PanelState::Failed(error.clone());
    }
    match &state.payload {
        Some(payload) => populated(payload),
        None => PanelState::Empty,
    }
}
