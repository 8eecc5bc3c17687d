//! Right-hand panel: filtered cluster list, selection detail, and the
//! unbiasing summary.

use eframe::egui::{self, Context, RichText};

use crate::config::CLUSTER_COUNT_RANGE;
use crate::egui_app::controller::DashboardController;

pub(super) fn show(ctx: &Context, controller: &mut DashboardController) {
    egui::SidePanel::right("clusters_panel")
        .default_width(320.0)
        .show(ctx, |ui| {
            ui.heading("Clusters");

            let mut count = controller.ui.clusters.cluster_count;
            ui.add(
                egui::Slider::new(&mut count, CLUSTER_COUNT_RANGE)
                    .text("shown"),
            );
            controller.set_cluster_count(count);
            ui.separator();

            if controller.ui.clusters.rows.is_empty() {
                ui.label(RichText::new("No cluster data yet").weak());
            } else {
                let mut clicked = None;
                for (index, row) in controller.ui.clusters.rows.iter().enumerate() {
                    let selected = controller.ui.clusters.selected == Some(index);
                    let text = format!("{} — {} records, {}d", row.id, row.size, row.dimensions);
                    if ui.selectable_label(selected, text).clicked() {
                        clicked = Some(index);
                    }
                }
                if let Some(index) = clicked {
                    controller.select_cluster(index);
                }
            }

            selection_detail(ui, controller);
            summary_section(ui, controller);
        });
}

fn selection_detail(ui: &mut egui::Ui, controller: &DashboardController) {
    let Some(row) = controller
        .ui
        .clusters
        .selected
        .and_then(|index| controller.ui.clusters.rows.get(index))
    else {
        return;
    };
    ui.separator();
    ui.label(RichText::new("Analysis").strong());
    match &controller.ui.clusters.analysis {
        Some(analysis) => {
            egui::ScrollArea::vertical()
                .id_salt("cluster_analysis")
                .max_height(160.0)
                .show(ui, |ui| {
                    ui.label(analysis);
                });
        }
        // A fetch is only pending for keys that carry a numeric id.
        None if row.numeric_id.is_some() => {
            ui.label(RichText::new("Loading analysis…").weak());
        }
        None => {
            ui.label(RichText::new("No analysis available for this cluster").weak());
        }
    }
    if !controller.ui.clusters.records_preview.is_empty() {
        ui.separator();
        ui.label(RichText::new("Sample records").strong());
        for record in &controller.ui.clusters.records_preview {
            ui.label(RichText::new(record).small());
        }
    }
}

fn summary_section(ui: &mut egui::Ui, controller: &DashboardController) {
    let Some(summary) = &controller.ui.summary else {
        return;
    };
    ui.separator();
    ui.label(RichText::new("Unbiasing summary").strong());
    egui::ScrollArea::vertical()
        .id_salt("unbiasing_summary")
        .max_height(200.0)
        .show(ui, |ui| {
            ui.label(summary);
        });
}
