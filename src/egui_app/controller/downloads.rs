//! Artifact downloads: fetch on a worker, then prompt for a save location.

use std::io;
use std::path::Path;

use tracing::{info, warn};

use crate::api::ArtifactKind;

use super::{DashboardController, StatusTone};

impl DashboardController {
    /// Fetch an artifact from the backend. The save prompt happens when the
    /// bytes arrive.
    pub fn request_download(&mut self, artifact: ArtifactKind) {
        if self.ui.downloads.in_progress {
            return;
        }
        self.ui.downloads.in_progress = true;
        self.set_status(
            format!("Downloading {}", artifact.label().to_lowercase()),
            StatusTone::Busy,
        );
        self.jobs.begin_download(self.api.clone(), artifact);
    }

    pub(super) fn apply_download_result(
        &mut self,
        artifact: ArtifactKind,
        result: Result<Vec<u8>, String>,
    ) {
        self.ui.downloads.in_progress = false;
        let bytes = match result {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("Download of {} failed: {err}", artifact.slug());
                self.set_status(format!("Download failed: {err}"), StatusTone::Error);
                return;
            }
        };
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(artifact.suggested_file_name())
            .save_file()
        else {
            self.set_status("Download canceled", StatusTone::Idle);
            return;
        };
        match write_artifact(Some(&bytes), &path) {
            Ok(true) => {
                info!("Saved {} to {}", artifact.slug(), path.display());
                self.ui.downloads.last_saved = Some(path.display().to_string());
                self.set_status(format!("Saved {}", path.display()), StatusTone::Info);
            }
            Ok(false) => {}
            Err(err) => {
                warn!("Saving {} failed: {err}", path.display());
                self.set_status(format!("Could not save file: {err}"), StatusTone::Error);
            }
        }
    }
}

/// Write downloaded bytes to `path`. With no bytes nothing is written and
/// `Ok(false)` is returned; with bytes exactly one file is created.
pub fn write_artifact(bytes: Option<&[u8]>, path: &Path) -> io::Result<bool> {
    let Some(bytes) = bytes else {
        return Ok(false);
    };
    std::fs::write(path, bytes)?;
    Ok(true)
}
