//! egui renderer. Reads the controller's state tree and forwards intents
//! back to it; no state of its own beyond transient widget locals.

mod cloud_math;
mod cloud_view;
mod clusters_panel;
mod upload_modal;

use std::time::{Duration, Instant};

use eframe::egui::{self, Color32, Context, RichText, Vec2};

use crate::api::ArtifactKind;
use crate::egui_app::controller::DashboardController;
use crate::egui_app::state::{HealthState, MIN_VIEWPORT_VEC};

/// Minimum window size the layout is designed for.
pub const MIN_VIEWPORT_SIZE: Vec2 = MIN_VIEWPORT_VEC;

/// Repaint cadence while the controller may have pending deadlines. Keeps
/// the progress ramp and poll scheduling moving without animation frames.
const REPAINT_INTERVAL: Duration = Duration::from_millis(100);

/// The eframe application. Owns the controller and renders its state.
pub struct DashboardApp {
    controller: DashboardController,
}

impl DashboardApp {
    /// Load config and build the app.
    pub fn new() -> Result<Self, String> {
        let controller = DashboardController::from_disk().map_err(|err| err.to_string())?;
        Ok(Self { controller })
    }

    fn handle_file_drops(&mut self, ctx: &Context) {
        let hovering = ctx.input(|input| !input.raw.hovered_files.is_empty());
        self.controller.ui.upload.drag_over = hovering;

        let dropped = ctx.input(|input| input.raw.dropped_files.clone());
        for file in dropped {
            if let Some(path) = file.path {
                self.controller.stage_picked_file(&path);
            } else if let Some(bytes) = file.bytes {
                let mime = (!file.mime.is_empty()).then_some(file.mime.as_str());
                self.controller
                    .stage_dropped_file(&file.name, mime, bytes.to_vec());
            }
        }
    }

    fn top_bar(&mut self, ctx: &Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Unbias Studio");
                ui.separator();
                if ui.button("Upload dataset").clicked() {
                    self.controller.open_upload_modal();
                }
                ui.add_enabled_ui(!self.controller.ui.downloads.in_progress, |ui| {
                    ui.menu_button("Download", |ui| {
                        for artifact in ArtifactKind::ALL {
                            if ui.button(artifact.label()).clicked() {
                                self.controller.request_download(artifact);
                                ui.close();
                            }
                        }
                    });
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let (dot, tooltip) = match self.controller.ui.health {
                        HealthState::Healthy => (Color32::from_rgb(64, 140, 112), "Backend online"),
                        HealthState::Unreachable => {
                            (Color32::from_rgb(192, 57, 43), "Backend unreachable")
                        }
                        HealthState::Unknown => (Color32::GRAY, "Backend not checked"),
                    };
                    ui.label(RichText::new("●").color(dot)).on_hover_text(tooltip);
                });
            });
        });
    }

    fn status_bar(&mut self, ctx: &Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let status = &self.controller.ui.status;
                let badge = RichText::new(&status.badge_label)
                    .color(Color32::WHITE)
                    .background_color(status.badge_color)
                    .small();
                ui.label(badge);
                ui.label(&status.text);
                if let Some(saved) = &self.controller.ui.downloads.last_saved {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(RichText::new(format!("Last saved: {saved}")).weak());
                    });
                }
            });
        });
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.controller.tick(Instant::now());
        self.handle_file_drops(ctx);
        self.top_bar(ctx);
        self.status_bar(ctx);
        clusters_panel::show(ctx, &mut self.controller);
        cloud_view::show(ctx, &mut self.controller);
        upload_modal::show(ctx, &mut self.controller);
        ctx.request_repaint_after(REPAINT_INTERVAL);
    }
}
