// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod dashboard_client;
pub mod http_response;
pub mod influx_repository;
pub mod logging;
