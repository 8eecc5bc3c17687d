//! Status polling and the completion refresh.

use std::time::Instant;

use tracing::{info, warn};

use crate::api::JobStatusResponse;
use crate::egui_app::state::{JobUiState, StatusBarState, UploadStatus};

use super::jobs::ClusterDetailResult;
use super::refresh::{self, RefreshOutcome};
use super::{COMPLETE_CLEAR_DELAY, DashboardController, StatusTone};

impl DashboardController {
    /// Whether a status poll should fire now: only while a job is active,
    /// only when the interval has elapsed, and never while a previous poll
    /// is still on the wire.
    pub(crate) fn should_poll(&self, now: Instant) -> bool {
        self.ui.job.is_active()
            && self.next_poll_at.is_some_and(|at| now >= at)
            && !self.jobs.status_poll_in_progress()
    }

    pub(super) fn maybe_poll(&mut self, now: Instant) {
        if !self.should_poll(now) {
            return;
        }
        let Some(job_id) = self.ui.job.job_id.clone() else {
            return;
        };
        self.next_poll_at = Some(now + self.poll_interval());
        self.jobs.begin_status_poll(self.api.clone(), job_id);
    }

    pub(super) fn apply_job_status(
        &mut self,
        now: Instant,
        polled_job_id: &str,
        result: Result<JobStatusResponse, String>,
    ) {
        // An answer for a job we no longer track (a second upload took
        // over) is stale whether it succeeded or failed; drop it before
        // touching any state.
        if self.ui.job.job_id.as_deref() != Some(polled_job_id) {
            return;
        }
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                warn!("Status poll failed: {err}");
                self.ui.upload.status = UploadStatus::Error;
                self.ui.upload.last_error = Some(err.clone());
                self.ui.upload.is_loading = false;
                self.ui.job.stage = None;
                self.next_poll_at = None;
                self.set_status(format!("Status check failed: {err}"), StatusTone::Error);
                return;
            }
        };
        let stage = response.stage();
        self.ui.job.stage = Some(stage);
        self.ui.job.log = response.log;
        if stage.is_active() {
            self.next_poll_at = Some(now + self.poll_interval());
            return;
        }
        self.next_poll_at = None;
        if stage == crate::api::JobStage::Completed {
            info!("Job {} completed", response.job_id);
            self.ui.upload.status = UploadStatus::Complete;
            self.ui.upload.notice_visible = true;
            self.ui.upload.is_loading = false;
            self.clear_job_at = Some(now + COMPLETE_CLEAR_DELAY);
            self.set_status("Processing complete", StatusTone::Info);
            self.jobs.begin_refresh(self.api.clone());
        } else {
            warn!("Job {} failed", response.job_id);
            self.ui.upload.status = UploadStatus::Error;
            self.ui.upload.is_loading = false;
            let detail = last_log_line(&self.ui.job.log)
                .unwrap_or("Processing failed")
                .to_string();
            self.ui.upload.last_error = Some(detail.clone());
            self.set_status(format!("Processing failed: {detail}"), StatusTone::Error);
        }
    }

    /// Clear a completed job back to idle once the notice delay elapses.
    pub(super) fn maybe_clear_completed(&mut self, now: Instant) {
        if !self.clear_job_at.is_some_and(|at| now >= at) {
            return;
        }
        self.clear_job_at = None;
        self.ui.job = JobUiState::default();
        self.ui.upload.status = UploadStatus::Idle;
        self.ui.upload.progress = 0.0;
        self.ui.upload.staged = None;
        self.ui.upload.notice_visible = false;
        self.ui.status = StatusBarState::default();
    }

    pub(super) fn apply_refresh_outcome(&mut self, outcome: RefreshOutcome) {
        if let Some(clusters) = outcome.clusters {
            self.clusters = Some(clusters);
            self.data_version = self.data_version.wrapping_add(1);
            self.filtered.invalidate();
        }
        if let Some(analyses) = outcome.analyses {
            refresh::merge_analyses(&mut self.analyses, analyses);
        }
        if outcome.summary.is_some() {
            self.ui.summary = outcome.summary;
        }
        if outcome.unbiased.is_some() {
            self.unbiased = outcome.unbiased;
        }
        if outcome.removed.is_some() {
            self.removed = outcome.removed;
        }
        if outcome.unbiased_rows.is_some() {
            self.unbiased_rows = outcome.unbiased_rows;
        }
        if outcome.removed_rows.is_some() {
            self.removed_rows = outcome.removed_rows;
        }
        self.refresh_cluster_rows();
        if !outcome.errors.is_empty() {
            self.set_status(
                format!("Some results could not be loaded ({})", outcome.errors.len()),
                StatusTone::Warning,
            );
        }
    }

    pub(super) fn apply_cluster_detail(&mut self, detail: ClusterDetailResult) {
        if let Some(analysis) = &detail.analysis {
            self.analyses
                .insert(format!("cluster_{}", detail.cluster_id), analysis.clone());
        }
        // Apply only if the user still has that cluster selected.
        let selected_id = self
            .ui
            .clusters
            .selected
            .and_then(|index| self.ui.clusters.rows.get(index))
            .and_then(|row| row.numeric_id);
        if selected_id != Some(detail.cluster_id) {
            return;
        }
        if detail.analysis.is_some() {
            self.ui.clusters.analysis = detail.analysis;
        }
        self.ui.clusters.records_preview = detail.records_preview;
    }
}

fn last_log_line(log: &str) -> Option<&str> {
    log.lines().rev().map(str::trim).find(|line| !line.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_log_line_skips_trailing_blanks() {
        assert_eq!(
            last_log_line("step 1\nstep 2 failed\n\n"),
            Some("step 2 failed")
        );
        assert_eq!(last_log_line(""), None);
    }
}
