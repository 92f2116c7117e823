// Application state for HTTP handlers
use crate::application::current_readings::CurrentReadings;
use crate::application::dashboard_service::DashboardService;
use crate::application::waterjet_service::WaterjetService;

#[derive(Clone)]
pub struct AppState {
    pub waterjet_service: WaterjetService,
    pub dashboard_service: DashboardService,
    pub current_readings: CurrentReadings,
}
