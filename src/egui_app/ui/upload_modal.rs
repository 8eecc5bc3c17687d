//! Upload dialog: staging, cluster count, progress, and error display.

use std::time::Instant;

use eframe::egui::{self, Align2, Color32, Context, RichText};

use crate::config::CLUSTER_COUNT_RANGE;
use crate::egui_app::controller::DashboardController;
use crate::egui_app::state::UploadStatus;

pub(super) fn show(ctx: &Context, controller: &mut DashboardController) {
    if !controller.ui.upload.modal_open {
        return;
    }
    let mut open = true;
    egui::Window::new("Upload dataset")
        .anchor(Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .collapsible(false)
        .resizable(false)
        .default_width(420.0)
        .open(&mut open)
        .show(ctx, |ui| {
            staging_section(ui, controller);
            ui.separator();
            settings_section(ui, controller);
            progress_section(ui, controller);
            notice_section(ui, controller);
            error_section(ui, controller);
        });
    if !open {
        controller.close_upload_modal();
    }
}

fn staging_section(ui: &mut egui::Ui, controller: &mut DashboardController) {
    let drop_hint = if controller.ui.upload.drag_over {
        RichText::new("Release to stage the file")
            .color(Color32::from_rgb(31, 139, 255))
            .strong()
    } else {
        RichText::new("Drop a CSV anywhere in the window, or browse").weak()
    };
    ui.label(drop_hint);

    match &controller.ui.upload.staged {
        Some(staged) => {
            ui.label(format!(
                "{} ({} KiB)",
                staged.file_name,
                staged.contents.len().div_ceil(1024)
            ));
        }
        None => {
            ui.label(RichText::new("No file staged").weak());
        }
    }

    ui.horizontal(|ui| {
        if ui.button("Browse…").clicked() {
            controller.stage_file_via_dialog();
        }
        if ui.button("Use example dataset").clicked() {
            controller.use_example_dataset();
        }
    });
}

fn settings_section(ui: &mut egui::Ui, controller: &mut DashboardController) {
    let mut count = controller.ui.upload.cluster_count;
    ui.add(egui::Slider::new(&mut count, CLUSTER_COUNT_RANGE).text("clusters"));
    controller.set_upload_cluster_count(count);

    let ready = controller.ui.upload.staged.is_some()
        && controller.ui.upload.status == UploadStatus::Idle;
    ui.add_enabled_ui(ready, |ui| {
        if ui.button("Upload and process").clicked() {
            controller.process_upload(Instant::now());
        }
    });
}

fn progress_section(ui: &mut egui::Ui, controller: &DashboardController) {
    let upload = &controller.ui.upload;
    if !matches!(
        upload.status,
        UploadStatus::Uploading | UploadStatus::Processing | UploadStatus::Complete
    ) {
        return;
    }
    ui.separator();
    ui.add(egui::ProgressBar::new(upload.progress / 100.0).show_percentage());
    match upload.status {
        UploadStatus::Uploading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Uploading (progress is an estimate)");
            });
        }
        UploadStatus::Processing => {
            ui.horizontal(|ui| {
                ui.spinner();
                let stage = controller
                    .ui
                    .job
                    .stage
                    .map(|stage| format!("{stage:?}").to_lowercase())
                    .unwrap_or_else(|| "processing".to_string());
                ui.label(format!("Backend is {stage} the dataset"));
            });
            if let Some(rows) = controller.ui.job.rows_count {
                ui.label(RichText::new(format!("{rows} rows accepted")).weak());
            }
            if !controller.ui.job.log.is_empty() {
                egui::ScrollArea::vertical()
                    .id_salt("job_log")
                    .max_height(120.0)
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        ui.label(RichText::new(&controller.ui.job.log).monospace().small());
                    });
            }
        }
        _ => {}
    }
}

fn notice_section(ui: &mut egui::Ui, controller: &DashboardController) {
    if !controller.ui.upload.notice_visible {
        return;
    }
    ui.separator();
    ui.label(
        RichText::new("Processing complete — results are loading")
            .color(Color32::from_rgb(64, 140, 112))
            .strong(),
    );
}

fn error_section(ui: &mut egui::Ui, controller: &mut DashboardController) {
    let Some(error) = controller.ui.upload.last_error.clone() else {
        return;
    };
    ui.separator();
    egui::Frame::group(ui.style())
        .fill(Color32::from_rgb(58, 28, 28))
        .show(ui, |ui| {
            ui.label(RichText::new(error).color(Color32::from_rgb(240, 180, 180)));
            if ui.button("Dismiss").clicked() {
                controller.dismiss_error();
            }
        });
}
