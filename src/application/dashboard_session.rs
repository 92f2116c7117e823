// Dashboard session - Runs the effects of the selection cascade
use crate::application::dashboard_api::{DashboardApi, FetchError};
use crate::application::dashboard_machine::{DashboardState, Effect, Event, update};
use chrono::FixedOffset;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Owns the dashboard state and performs the fetches it asks for.
///
/// Each fetch runs in its own task and reports back through a channel, so
/// completions are applied one at a time in arrival order.
pub struct DashboardSession {
    api: Arc<dyn DashboardApi>,
    state: DashboardState,
    timeout: Duration,
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
    in_flight: usize,
}

impl DashboardSession {
    pub fn new(api: Arc<dyn DashboardApi>, offset: FixedOffset, timeout: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            api,
            state: DashboardState::new(offset),
            timeout,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Number of fetches whose completion has not been applied yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Sender for feeding user input from other tasks
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.tx.clone()
    }

    /// Apply an event immediately and start the fetches it triggers.
    pub fn dispatch(&mut self, event: Event) {
        for effect in update(&mut self.state, event) {
            self.spawn(effect);
        }
    }

    /// Wait for the next queued event and apply it. Returns `false` once the channel is closed.
    pub async fn next(&mut self) -> bool {
        let Some(event) = self.rx.recv().await else {
            return false;
        };
        if event.is_completion() {
            self.in_flight = self.in_flight.saturating_sub(1);
        }
        self.dispatch(event);
        true
    }

    /// Process events until no fetch is outstanding.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            if !self.next().await {
                break;
            }
        }
    }

    fn spawn(&mut self, effect: Effect) {
        self.in_flight += 1;
        let api = self.api.clone();
        let tx = self.tx.clone();
        let timeout = self.timeout;
        tokio::spawn(async move {
            let event = perform(api.as_ref(), effect, timeout).await;
            // The session may already be gone; nothing left to update then
            let _ = tx.send(event);
        });
    }
}

/// Run one effect against the API and describe its outcome as an event.
pub async fn perform(api: &dyn DashboardApi, effect: Effect, timeout: Duration) -> Event {
    match effect {
        Effect::FetchDevices { generation } => {
            let result = with_timeout("device list", timeout, api.list_devices()).await;
            Event::DevicesLoaded {
                generation,
                result: result.map_err(|e| e.to_string()),
            }
        }
        Effect::FetchDates { generation, device } => {
            let result = with_timeout("date list", timeout, api.list_dates(&device)).await;
            Event::DatesLoaded {
                generation,
                device,
                result: result.map_err(|e| e.to_string()),
            }
        }
        Effect::FetchPayload {
            generation,
            device,
            date,
        } => {
            let result = with_timeout("dashboard data", timeout, api.get_payload(&device, &date)).await;
            Event::PayloadLoaded {
                generation,
                result: result.map_err(|e| e.to_string()),
            }
        }
    }
}

async fn with_timeout<T>(
    operation: &'static str,
    timeout: Duration,
    fut: impl Future<Output = Result<T, FetchError>>,
) -> Result<T, FetchError> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout { operation, timeout }),
    }
}
