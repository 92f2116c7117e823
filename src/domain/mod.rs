// Domain layer - Pure data types and derivations
pub mod dashboard;
pub mod filter;
pub mod selection;
pub mod telemetry;
