//! Background job plumbing.
//!
//! Network calls run on worker threads and report back exactly one message
//! over an mpsc channel that the controller pumps once per frame. Each job
//! kind has an in-flight flag; `begin_*` is a no-op while its flag is set,
//! which is what keeps status polls from overlapping when the backend is
//! slow.

use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::thread;

use crate::api::{ApiClient, ArtifactKind, HealthResponse, JobStatusResponse, UploadResponse};
use crate::dataset::StagedDataset;

use super::refresh::{self, RefreshOutcome};

pub(crate) enum JobMessage {
    HealthChecked(Result<HealthResponse, String>),
    UploadFinished(Result<UploadResponse, String>),
    StatusPolled {
        job_id: String,
        result: Result<JobStatusResponse, String>,
    },
    RefreshFinished(Box<RefreshOutcome>),
    ClusterDetailLoaded(ClusterDetailResult),
    DownloadFinished {
        artifact: ArtifactKind,
        result: Result<Vec<u8>, String>,
    },
}

/// Analysis text and preview records fetched for one selected cluster.
pub(crate) struct ClusterDetailResult {
    pub(crate) cluster_id: u32,
    pub(crate) analysis: Option<String>,
    pub(crate) records_preview: Vec<String>,
}

pub(crate) struct ControllerJobs {
    message_tx: Sender<JobMessage>,
    message_rx: Receiver<JobMessage>,
    health_in_progress: bool,
    upload_in_progress: bool,
    status_poll_in_progress: bool,
    refresh_in_progress: bool,
    refresh_queued: bool,
    cluster_detail_in_progress: bool,
    download_in_progress: bool,
}

impl ControllerJobs {
    pub(super) fn new() -> Self {
        let (message_tx, message_rx) = std::sync::mpsc::channel::<JobMessage>();
        Self {
            message_tx,
            message_rx,
            health_in_progress: false,
            upload_in_progress: false,
            status_poll_in_progress: false,
            refresh_in_progress: false,
            refresh_queued: false,
            cluster_detail_in_progress: false,
            download_in_progress: false,
        }
    }

    pub(super) fn try_recv_message(&self) -> Result<JobMessage, TryRecvError> {
        self.message_rx.try_recv()
    }

    pub(super) fn begin_health_check(&mut self, api: ApiClient) {
        if self.health_in_progress {
            return;
        }
        self.health_in_progress = true;
        let tx = self.message_tx.clone();
        thread::spawn(move || {
            let result = api.health().map_err(|err| err.to_string());
            let _ = tx.send(JobMessage::HealthChecked(result));
        });
    }

    pub(super) fn clear_health_check(&mut self) {
        self.health_in_progress = false;
    }

    pub(super) fn begin_upload(&mut self, api: ApiClient, staged: StagedDataset, cluster_count: u32) {
        if self.upload_in_progress {
            return;
        }
        self.upload_in_progress = true;
        let tx = self.message_tx.clone();
        thread::spawn(move || {
            let result = api
                .upload_dataset(&staged.file_name, &staged.contents, cluster_count)
                .map_err(|err| err.to_string());
            let _ = tx.send(JobMessage::UploadFinished(result));
        });
    }

    pub(super) fn upload_in_progress(&self) -> bool {
        self.upload_in_progress
    }

    pub(super) fn clear_upload(&mut self) {
        self.upload_in_progress = false;
    }

    pub(super) fn begin_status_poll(&mut self, api: ApiClient, job_id: String) {
        if self.status_poll_in_progress {
            return;
        }
        self.status_poll_in_progress = true;
        let tx = self.message_tx.clone();
        thread::spawn(move || {
            let result = api.job_status(&job_id).map_err(|err| err.to_string());
            let _ = tx.send(JobMessage::StatusPolled { job_id, result });
        });
    }

    pub(super) fn status_poll_in_progress(&self) -> bool {
        self.status_poll_in_progress
    }

    pub(super) fn clear_status_poll(&mut self) {
        self.status_poll_in_progress = false;
    }

    /// A request that arrives while a refresh is running is queued so a job
    /// completing mid-refresh never loses its refetch.
    pub(super) fn begin_refresh(&mut self, api: ApiClient) {
        if self.refresh_in_progress {
            self.refresh_queued = true;
            return;
        }
        self.refresh_in_progress = true;
        let tx = self.message_tx.clone();
        thread::spawn(move || {
            let outcome = refresh::run_refresh(&api);
            let _ = tx.send(JobMessage::RefreshFinished(Box::new(outcome)));
        });
    }

    /// Clear the in-flight flag; returns true when a queued request should
    /// start another refresh.
    pub(super) fn clear_refresh(&mut self) -> bool {
        self.refresh_in_progress = false;
        std::mem::take(&mut self.refresh_queued)
    }

    pub(super) fn begin_cluster_detail(&mut self, api: ApiClient, cluster_id: u32) {
        if self.cluster_detail_in_progress {
            return;
        }
        self.cluster_detail_in_progress = true;
        let tx = self.message_tx.clone();
        thread::spawn(move || {
            let detail = refresh::run_cluster_detail(&api, cluster_id);
            let _ = tx.send(JobMessage::ClusterDetailLoaded(detail));
        });
    }

    pub(super) fn clear_cluster_detail(&mut self) {
        self.cluster_detail_in_progress = false;
    }

    #[cfg(test)]
    pub(super) fn cluster_detail_in_progress(&self) -> bool {
        self.cluster_detail_in_progress
    }

    pub(super) fn begin_download(&mut self, api: ApiClient, artifact: ArtifactKind) {
        if self.download_in_progress {
            return;
        }
        self.download_in_progress = true;
        let tx = self.message_tx.clone();
        thread::spawn(move || {
            let result = api.download(artifact).map_err(|err| err.to_string());
            let _ = tx.send(JobMessage::DownloadFinished { artifact, result });
        });
    }

    pub(super) fn download_in_progress(&self) -> bool {
        self.download_in_progress
    }

    pub(super) fn clear_download(&mut self) {
        self.download_in_progress = false;
    }
}
