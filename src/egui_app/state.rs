//! Shared state types for the egui UI.
//!
//! The controller mutates these; the renderer only reads them (cloning rows
//! where it needs to hold them across a dispatch).

use egui::{Color32, Vec2};

use crate::api::JobStage;
use crate::dataset::StagedDataset;
use crate::egui_app::view_model::ClusterSummary;

/// Top-level UI model consumed by the egui renderer.
#[derive(Clone, Debug, Default)]
pub struct UiState {
    /// Footer badge + message.
    pub status: StatusBarState,
    /// Upload dialog state machine.
    pub upload: UploadUiState,
    /// Currently tracked backend job.
    pub job: JobUiState,
    /// Point cloud camera and toggles.
    pub cloud: CloudUiState,
    /// Filtered cluster rows and selection.
    pub clusters: ClusterPanelState,
    /// Unbiasing summary text.
    pub summary: Option<String>,
    /// Backend reachability, from the startup health check.
    pub health: HealthState,
    /// Artifact download bookkeeping.
    pub downloads: DownloadUiState,
}

/// Status badge + text shown in the footer.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusBarState {
    pub text: String,
    pub badge_label: String,
    pub badge_color: Color32,
}

impl Default for StatusBarState {
    fn default() -> Self {
        Self {
            text: "Upload a dataset to get started".into(),
            badge_label: "Idle".into(),
            badge_color: Color32::from_rgb(42, 42, 42),
        }
    }
}

/// Upload lifecycle states, in the order the happy path visits them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UploadStatus {
    /// Nothing in flight.
    #[default]
    Idle,
    /// The POST is on the wire; progress is a synthetic ramp.
    Uploading,
    /// The backend accepted the upload and is running the pipeline.
    Processing,
    /// The pipeline finished; derived data is being refreshed.
    Complete,
    /// Upload or pipeline failed; waits for explicit dismissal.
    Error,
}

/// State behind the upload dialog.
#[derive(Clone, Debug, Default)]
pub struct UploadUiState {
    /// Whether the dialog window is shown.
    pub modal_open: bool,
    /// Lifecycle state machine.
    pub status: UploadStatus,
    /// 0-100; synthetic while uploading, exactly 100 once accepted.
    pub progress: f32,
    /// The staged CSV, if any.
    pub staged: Option<StagedDataset>,
    /// Cluster count sent with the upload.
    pub cluster_count: u32,
    /// A drag hovers over the window.
    pub drag_over: bool,
    /// Success notice shown after completion, until the clear delay fires.
    pub notice_visible: bool,
    /// Last error shown in the dialog's error panel.
    pub last_error: Option<String>,
    /// Spinner flag mirroring an in-flight poll cycle.
    pub is_loading: bool,
}

/// The tracked backend job. At most one at a time; a second upload
/// overwrites it.
#[derive(Clone, Debug, Default)]
pub struct JobUiState {
    /// Backend job id, `None` when no job is tracked.
    pub job_id: Option<String>,
    /// Last stage reported by the status endpoint.
    pub stage: Option<JobStage>,
    /// Pipeline log captured so far.
    pub log: String,
    /// Row count reported by the upload response.
    pub rows_count: Option<u64>,
}

impl JobUiState {
    /// Whether the poller should keep watching this job.
    pub fn is_active(&self) -> bool {
        self.job_id.is_some() && self.stage.is_some_and(JobStage::is_active)
    }
}

/// Camera and toggles for the point cloud view.
#[derive(Clone, Debug)]
pub struct CloudUiState {
    /// Rotation around the vertical axis, radians.
    pub yaw: f32,
    /// Rotation around the horizontal axis, radians.
    pub pitch: f32,
    /// Zoom factor, 1.0 = fit bounds.
    pub zoom: f32,
    /// Also draw the removed subset in gray.
    pub show_removed: bool,
    /// Slowly spin when the user is not dragging.
    pub auto_rotate: bool,
}

impl Default for CloudUiState {
    fn default() -> Self {
        Self {
            yaw: 0.6,
            pitch: 0.3,
            zoom: 1.0,
            show_removed: false,
            auto_rotate: true,
        }
    }
}

/// Filtered cluster rows plus the selected cluster's detail.
#[derive(Clone, Debug, Default)]
pub struct ClusterPanelState {
    /// Rows after the size-ranked truncation.
    pub rows: Vec<ClusterSummary>,
    /// Index into `rows`.
    pub selected: Option<usize>,
    /// Analysis text for the selected cluster.
    pub analysis: Option<String>,
    /// Preview records for the selected cluster.
    pub records_preview: Vec<String>,
    /// Number of clusters kept by the filter; user-tunable.
    pub cluster_count: u32,
}

/// Backend reachability as reported by the health endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HealthState {
    /// Not checked yet.
    #[default]
    Unknown,
    /// Health endpoint answered.
    Healthy,
    /// Health endpoint unreachable or unhealthy.
    Unreachable,
}

/// Download bookkeeping for the artifacts menu.
#[derive(Clone, Debug, Default)]
pub struct DownloadUiState {
    /// A download worker is running.
    pub in_progress: bool,
    /// Last saved path, shown in the status bar.
    pub last_saved: Option<String>,
}

/// Minimum window size the layout is designed for.
pub const MIN_VIEWPORT_VEC: Vec2 = Vec2::new(960.0, 600.0);
