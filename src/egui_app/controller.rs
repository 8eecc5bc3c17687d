//! Maintains app state and bridges the job lifecycle to the egui UI.

use std::collections::BTreeMap;
use std::sync::mpsc::TryRecvError;
use std::time::{Duration, Instant};

use egui::Color32;
use tracing::{info, warn};

use crate::api::{ApiClient, ClusterEmbeddings, EmbeddingsData, HealthResponse};
use crate::config::{self, AppConfig};
use crate::egui_app::state::*;
use crate::egui_app::view_model::FilteredClusterCache;

mod downloads;
mod jobs;
mod polling;
mod refresh;
#[cfg(test)]
pub(crate) mod test_support;
mod upload;

pub use downloads::write_artifact;

use jobs::{ControllerJobs, JobMessage};

/// Cadence of the synthetic upload progress ramp.
pub(crate) const PROGRESS_TICK: Duration = Duration::from_millis(300);
/// Ramp increment per tick.
pub(crate) const PROGRESS_STEP: f32 = 5.0;
/// The ramp never claims completion before the server answers.
pub(crate) const PROGRESS_CEILING: f32 = 90.0;
/// Delay before a completed job is cleared back to idle.
pub(crate) const COMPLETE_CLEAR_DELAY: Duration = Duration::from_secs(2);

/// Maintains app state and orchestrates the upload → poll → fetch cycle.
pub struct DashboardController {
    /// Render-friendly state read by the egui renderer.
    pub ui: UiState,
    pub(crate) settings: AppConfig,
    pub(crate) api: ApiClient,
    pub(crate) jobs: ControllerJobs,
    pub(crate) clusters: Option<BTreeMap<String, ClusterEmbeddings>>,
    pub(crate) analyses: BTreeMap<String, String>,
    pub(crate) unbiased: Option<EmbeddingsData>,
    pub(crate) removed: Option<EmbeddingsData>,
    pub(crate) unbiased_rows: Option<u64>,
    pub(crate) removed_rows: Option<u64>,
    /// Bumped whenever the cluster map is replaced; keys the filter cache.
    pub(crate) data_version: u64,
    pub(crate) filtered: FilteredClusterCache,
    /// Next synthetic ramp advance, set only while uploading.
    pub(crate) next_progress_tick: Option<Instant>,
    /// Next status poll, set only while a job is active.
    pub(crate) next_poll_at: Option<Instant>,
    /// When to clear a completed job back to idle.
    pub(crate) clear_job_at: Option<Instant>,
}

impl DashboardController {
    /// Build a controller from settings.
    pub fn new(settings: AppConfig) -> Self {
        let api = ApiClient::new(settings.api_base_url.clone());
        let mut ui = UiState::default();
        ui.upload.cluster_count = config::clamp_cluster_count(settings.default_cluster_count);
        ui.clusters.cluster_count = ui.upload.cluster_count;
        Self {
            ui,
            settings,
            api,
            jobs: ControllerJobs::new(),
            clusters: None,
            analyses: BTreeMap::new(),
            unbiased: None,
            removed: None,
            unbiased_rows: None,
            removed_rows: None,
            data_version: 0,
            filtered: FilteredClusterCache::default(),
            next_progress_tick: None,
            next_poll_at: None,
            clear_job_at: None,
        }
    }

    /// Load persisted config and start the optional health check.
    pub fn from_disk() -> Result<Self, config::ConfigError> {
        let settings = config::load_or_default()?;
        let mut controller = Self::new(settings);
        if controller.settings.health_check_on_startup {
            controller.jobs.begin_health_check(controller.api.clone());
        }
        // Any results from a previous run are worth showing immediately.
        controller.jobs.begin_refresh(controller.api.clone());
        Ok(controller)
    }

    /// Drive time-based work: the progress ramp, poll scheduling, and the
    /// post-completion clear. Called once per frame.
    pub fn tick(&mut self, now: Instant) {
        self.pump_messages(now);
        self.advance_progress(now);
        self.maybe_poll(now);
        self.maybe_clear_completed(now);
    }

    /// Interval between status polls, from settings.
    pub(crate) fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.settings.poll_interval_ms.max(100))
    }

    fn pump_messages(&mut self, now: Instant) {
        loop {
            match self.jobs.try_recv_message() {
                Ok(message) => self.apply_message(now, message),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn apply_message(&mut self, now: Instant, message: JobMessage) {
        match message {
            JobMessage::HealthChecked(result) => {
                self.jobs.clear_health_check();
                self.apply_health_result(result);
            }
            JobMessage::UploadFinished(result) => {
                self.jobs.clear_upload();
                self.apply_upload_result(now, result);
            }
            JobMessage::StatusPolled { job_id, result } => {
                self.jobs.clear_status_poll();
                self.apply_job_status(now, &job_id, result);
            }
            JobMessage::RefreshFinished(outcome) => {
                let rerun = self.jobs.clear_refresh();
                self.apply_refresh_outcome(*outcome);
                if rerun {
                    self.jobs.begin_refresh(self.api.clone());
                }
            }
            JobMessage::ClusterDetailLoaded(detail) => {
                self.jobs.clear_cluster_detail();
                self.apply_cluster_detail(detail);
            }
            JobMessage::DownloadFinished { artifact, result } => {
                self.jobs.clear_download();
                self.apply_download_result(artifact, result);
            }
        }
    }

    fn apply_health_result(&mut self, result: Result<HealthResponse, String>) {
        match result {
            Ok(health) if health.status == "healthy" => {
                self.ui.health = HealthState::Healthy;
                info!("Backend healthy at {}", self.api.base_url());
            }
            Ok(health) => {
                self.ui.health = HealthState::Unreachable;
                warn!("Backend reported status {:?}", health.status);
            }
            Err(err) => {
                self.ui.health = HealthState::Unreachable;
                warn!("Health check failed: {err}");
                self.set_status(
                    format!("Backend unreachable at {}", self.api.base_url()),
                    StatusTone::Warning,
                );
            }
        }
    }

    /// Rebuild the filtered cluster rows from the cache.
    pub(crate) fn refresh_cluster_rows(&mut self) {
        let rows = self
            .filtered
            .get(
                self.data_version,
                self.clusters.as_ref(),
                self.ui.clusters.cluster_count,
            )
            .map(<[_]>::to_vec)
            .unwrap_or_default();
        if self
            .ui
            .clusters
            .selected
            .is_some_and(|index| index >= rows.len())
        {
            self.ui.clusters.selected = None;
            self.ui.clusters.analysis = None;
            self.ui.clusters.records_preview.clear();
        }
        self.ui.clusters.rows = rows;
    }

    /// Change how many clusters the scene keeps.
    pub fn set_cluster_count(&mut self, count: u32) {
        let count = config::clamp_cluster_count(count);
        if self.ui.clusters.cluster_count == count {
            return;
        }
        self.ui.clusters.cluster_count = count;
        self.refresh_cluster_rows();
    }

    /// Select a filtered cluster row and load its analysis/preview.
    pub fn select_cluster(&mut self, index: usize) {
        let Some(row) = self.ui.clusters.rows.get(index).cloned() else {
            return;
        };
        self.ui.clusters.selected = Some(index);
        self.ui.clusters.analysis = self.analyses.get(&row.id).cloned();
        self.ui.clusters.records_preview.clear();
        // The detail fetch also fills in an analysis the bulk fetch missed.
        if let Some(cluster_id) = row.numeric_id {
            self.jobs.begin_cluster_detail(self.api.clone(), cluster_id);
        }
    }

    /// Embeddings for one cluster, for the scene renderer.
    pub fn cluster_embeddings(&self, id: &str) -> Option<&ClusterEmbeddings> {
        self.clusters.as_ref()?.get(id)
    }

    /// The kept embedding set, when loaded.
    pub fn unbiased_embeddings(&self) -> Option<&EmbeddingsData> {
        self.unbiased.as_ref()
    }

    /// The removed embedding set, when loaded.
    pub fn removed_embeddings(&self) -> Option<&EmbeddingsData> {
        self.removed.as_ref()
    }

    /// Row counts for the kept/removed datasets, when known.
    pub fn dataset_rows(&self) -> (Option<u64>, Option<u64>) {
        (self.unbiased_rows, self.removed_rows)
    }

    pub(crate) fn set_status(&mut self, text: impl Into<String>, tone: StatusTone) {
        let (label, color) = status_badge(tone);
        self.ui.status.text = text.into();
        self.ui.status.badge_label = label;
        self.ui.status.badge_color = color;
    }
}

/// Tone of the footer status badge.
#[derive(Clone, Copy, Debug)]
pub enum StatusTone {
    /// Nothing happening.
    Idle,
    /// Work in flight.
    Busy,
    /// Neutral confirmation.
    Info,
    /// Recoverable problem.
    Warning,
    /// Failure requiring attention.
    Error,
}

fn status_badge(tone: StatusTone) -> (String, Color32) {
    match tone {
        StatusTone::Idle => ("Idle".into(), Color32::from_rgb(42, 42, 42)),
        StatusTone::Busy => ("Working".into(), Color32::from_rgb(31, 139, 255)),
        StatusTone::Info => ("Info".into(), Color32::from_rgb(64, 140, 112)),
        StatusTone::Warning => ("Warning".into(), Color32::from_rgb(192, 138, 43)),
        StatusTone::Error => ("Error".into(), Color32::from_rgb(192, 57, 43)),
    }
}
