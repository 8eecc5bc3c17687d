//! Upload dialog flow: staging a CSV, the synthetic progress ramp, and the
//! upload result.

use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use crate::api::UploadResponse;
use crate::config;
use crate::dataset::{StageError, StagedDataset};
use crate::egui_app::state::{JobUiState, UploadStatus};

use super::{DashboardController, PROGRESS_CEILING, PROGRESS_STEP, PROGRESS_TICK, StatusTone};

impl DashboardController {
    /// Open the upload dialog.
    pub fn open_upload_modal(&mut self) {
        self.ui.upload.modal_open = true;
    }

    /// Close the upload dialog. In-flight work keeps running.
    pub fn close_upload_modal(&mut self) {
        self.ui.upload.modal_open = false;
        self.ui.upload.drag_over = false;
    }

    /// Open a file picker and stage the chosen CSV.
    pub fn stage_file_via_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV files", &["csv"])
            .pick_file()
        else {
            return;
        };
        self.stage_picked_file(&path);
    }

    /// Stage a CSV from an on-disk path.
    pub fn stage_picked_file(&mut self, path: &Path) {
        self.apply_staging(StagedDataset::from_path(path));
    }

    /// Stage a file dropped onto the window.
    pub fn stage_dropped_file(&mut self, name: &str, mime: Option<&str>, contents: Vec<u8>) {
        self.ui.upload.drag_over = false;
        self.apply_staging(StagedDataset::from_dropped(name, mime, contents));
    }

    /// Stage the bundled example dataset.
    pub fn use_example_dataset(&mut self) {
        self.apply_staging(Ok(StagedDataset::example()));
    }

    fn apply_staging(&mut self, staged: Result<StagedDataset, StageError>) {
        match staged {
            Ok(staged) => {
                info!("Staged {} ({} bytes)", staged.file_name, staged.contents.len());
                self.set_status(format!("Staged {}", staged.file_name), StatusTone::Info);
                self.ui.upload.last_error = None;
                self.ui.upload.staged = Some(staged);
                self.ui.upload.modal_open = true;
            }
            Err(err) => {
                warn!("Staging rejected: {err}");
                self.set_status(err.to_string(), StatusTone::Warning);
                self.ui.upload.last_error = Some(err.to_string());
            }
        }
    }

    /// Set the cluster count sent with the next upload.
    pub fn set_upload_cluster_count(&mut self, count: u32) {
        self.ui.upload.cluster_count = config::clamp_cluster_count(count);
    }

    /// Start the upload. No-op when nothing is staged or a POST is already
    /// on the wire.
    pub fn process_upload(&mut self, now: Instant) {
        if self.jobs.upload_in_progress() {
            return;
        }
        let Some(staged) = self.ui.upload.staged.clone() else {
            return;
        };
        let cluster_count = config::clamp_cluster_count(self.ui.upload.cluster_count);
        self.ui.upload.cluster_count = cluster_count;
        self.ui.upload.status = UploadStatus::Uploading;
        self.ui.upload.progress = 0.0;
        self.ui.upload.last_error = None;
        self.ui.upload.notice_visible = false;
        self.ui.upload.is_loading = true;
        // A second upload takes over: the old job is no longer tracked.
        self.ui.job = JobUiState::default();
        self.next_poll_at = None;
        self.clear_job_at = None;
        self.next_progress_tick = Some(now + PROGRESS_TICK);
        self.set_status(format!("Uploading {}", staged.file_name), StatusTone::Busy);
        self.jobs.begin_upload(self.api.clone(), staged, cluster_count);
    }

    /// Advance the synthetic ramp while the POST is on the wire.
    pub(super) fn advance_progress(&mut self, now: Instant) {
        if self.ui.upload.status != UploadStatus::Uploading {
            self.next_progress_tick = None;
            return;
        }
        if self.next_progress_tick.is_some_and(|at| now >= at) {
            self.ui.upload.progress =
                (self.ui.upload.progress + PROGRESS_STEP).min(PROGRESS_CEILING);
            self.next_progress_tick = Some(now + PROGRESS_TICK);
        }
    }

    pub(super) fn apply_upload_result(
        &mut self,
        now: Instant,
        result: Result<UploadResponse, String>,
    ) {
        self.next_progress_tick = None;
        match result {
            Ok(response) => {
                info!(
                    "Upload accepted: job {} ({:?} rows)",
                    response.job_id, response.rows_count
                );
                self.ui.upload.progress = 100.0;
                self.ui.upload.status = UploadStatus::Processing;
                self.ui.job = JobUiState {
                    job_id: Some(response.job_id),
                    stage: Some(crate::api::JobStage::parse(&response.status)),
                    log: String::new(),
                    rows_count: response.rows_count,
                };
                if let Some(count) = response.cluster_count {
                    self.ui.upload.cluster_count = config::clamp_cluster_count(count);
                    self.ui.clusters.cluster_count = self.ui.upload.cluster_count;
                }
                self.next_poll_at = Some(now + self.poll_interval());
                self.set_status("Processing dataset", StatusTone::Busy);
            }
            Err(err) => {
                warn!("Upload failed: {err}");
                self.ui.upload.status = UploadStatus::Error;
                self.ui.upload.last_error = Some(err.clone());
                self.ui.upload.is_loading = false;
                self.set_status(format!("Upload failed: {err}"), StatusTone::Error);
            }
        }
    }

    /// Dismiss the error panel. Only an explicit dismissal leaves the error
    /// state.
    pub fn dismiss_error(&mut self) {
        self.ui.upload.last_error = None;
        if self.ui.upload.status == UploadStatus::Error {
            self.ui.upload.status = UploadStatus::Idle;
            self.ui.upload.progress = 0.0;
            self.set_status("Upload a dataset to get started", StatusTone::Idle);
        }
    }
}
