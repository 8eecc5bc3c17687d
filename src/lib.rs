//! Library exports for reuse in integration tests.
/// REST client for the unbiasing backend.
pub mod api;
/// Application directory helpers.
pub mod app_dirs;
/// Persisted settings.
pub mod config;
/// Staged dataset handling and CSV validation.
pub mod dataset;
/// Shared egui UI modules.
pub mod egui_app;
/// Shared HTTP agent configuration.
pub mod http_client;
/// Logging setup.
pub mod logging;
