// Presentation layer - HTTP handlers and the console dashboard
pub mod app_state;
pub mod console;
pub mod handlers;
pub mod view_state;
