// Application layer - Use cases and the dashboard state machine
pub mod current_readings;
pub mod dashboard_api;
pub mod dashboard_machine;
pub mod dashboard_service;
pub mod dashboard_session;
pub mod fault_model;
pub mod telemetry_repository;
pub mod waterjet_service;
