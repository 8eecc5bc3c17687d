//! Construction helpers for controller tests.

use crate::config::AppConfig;

use super::DashboardController;

/// Controller pointed at a dead address so nothing in a test can reach a
/// real backend.
pub(crate) fn controller() -> DashboardController {
    let settings = AppConfig {
        api_base_url: "http://127.0.0.1:9/api".into(),
        health_check_on_startup: false,
        ..AppConfig::default()
    };
    DashboardController::new(settings)
}
