// Waterjet fault-probability monitoring: backend service and dashboard client
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
