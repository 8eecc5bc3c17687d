//! Central 3D point cloud of cluster embeddings.

use eframe::egui::{self, Color32, Context, Rect, Sense, Stroke};

use crate::egui_app::controller::DashboardController;

use super::cloud_math::{self, Bounds};

/// Per-cluster palette, cycled when there are more clusters than entries.
const CLUSTER_COLORS: [Color32; 10] = [
    Color32::from_rgb(86, 156, 214),
    Color32::from_rgb(220, 122, 95),
    Color32::from_rgb(107, 190, 123),
    Color32::from_rgb(197, 134, 192),
    Color32::from_rgb(215, 186, 125),
    Color32::from_rgb(78, 201, 176),
    Color32::from_rgb(224, 108, 117),
    Color32::from_rgb(152, 195, 121),
    Color32::from_rgb(97, 175, 239),
    Color32::from_rgb(229, 192, 123),
];

const REMOVED_COLOR: Color32 = Color32::from_rgb(110, 110, 110);
const UNBIASED_COLOR: Color32 = Color32::from_rgb(130, 165, 205);
const AUTO_ROTATE_SPEED: f32 = 0.25;
const DRAG_SENSITIVITY: f32 = 0.008;
const ZOOM_STEP: f32 = 0.0015;

pub(super) fn show(ctx: &Context, controller: &mut DashboardController) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.checkbox(&mut controller.ui.cloud.auto_rotate, "Auto-rotate");
            ui.checkbox(&mut controller.ui.cloud.show_removed, "Show removed");
            let (kept, removed) = controller.dataset_rows();
            if let Some(kept) = kept {
                ui.label(format!("{kept} kept"));
            }
            if let Some(removed) = removed {
                ui.label(format!("{removed} removed"));
            }
        });

        let desired = ui.available_size();
        let (rect, response) = ui.allocate_exact_size(desired, Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 4.0, Color32::from_rgb(16, 16, 20));

        apply_camera_input(ctx, controller, &response, rect);
        paint_cloud(controller, &painter, rect);
    });
}

fn apply_camera_input(
    ctx: &Context,
    controller: &mut DashboardController,
    response: &egui::Response,
    rect: Rect,
) {
    let cloud = &mut controller.ui.cloud;
    if response.dragged() {
        let delta = response.drag_delta();
        cloud.yaw += delta.x * DRAG_SENSITIVITY;
        cloud.pitch = (cloud.pitch + delta.y * DRAG_SENSITIVITY)
            .clamp(-std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2);
    } else if cloud.auto_rotate {
        cloud.yaw += ctx.input(|input| input.stable_dt) * AUTO_ROTATE_SPEED;
    }
    let hovering = response.hovered()
        || ctx
            .pointer_hover_pos()
            .is_some_and(|pos| rect.contains(pos));
    if hovering {
        let scroll = ctx.input(|input| input.raw_scroll_delta.y);
        if scroll != 0.0 {
            cloud.zoom = (cloud.zoom * (1.0 + scroll * ZOOM_STEP)).clamp(0.2, 8.0);
        }
    }
}

/// Point sets to draw, in paint order. Per-cluster sets when cluster data
/// is loaded; otherwise the kept (unbiased) set backs the cloud on its own.
/// The removed overlay comes last so it paints on top.
fn cloud_layers(controller: &DashboardController) -> Vec<(&[Vec<f32>], Color32)> {
    let mut layers: Vec<(&[Vec<f32>], Color32)> = Vec::new();
    for (index, row) in controller.ui.clusters.rows.iter().enumerate() {
        if let Some(embeddings) = controller.cluster_embeddings(&row.id) {
            let color = CLUSTER_COLORS[index % CLUSTER_COLORS.len()];
            layers.push((&embeddings.embeddings, color));
        }
    }
    if layers.is_empty() {
        if let Some(unbiased) = controller.unbiased_embeddings() {
            layers.push((&unbiased.embeddings, UNBIASED_COLOR));
        }
    }
    if controller.ui.cloud.show_removed {
        if let Some(removed) = controller.removed_embeddings() {
            layers.push((&removed.embeddings, REMOVED_COLOR));
        }
    }
    layers
}

fn paint_cloud(controller: &DashboardController, painter: &egui::Painter, rect: Rect) {
    let cloud = &controller.ui.cloud;
    let layers = cloud_layers(controller);

    let Some(bounds) = Bounds::from_points(
        layers
            .iter()
            .flat_map(|(points, _)| points.iter().map(Vec::as_slice)),
    ) else {
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            "No cluster data yet. Upload a dataset to see the point cloud.",
            egui::FontId::proportional(14.0),
            Color32::GRAY,
        );
        return;
    };

    for (points, color) in layers {
        for point in points {
            let Some((pos, depth)) =
                cloud_math::project(point, bounds, cloud.yaw, cloud.pitch, cloud.zoom, rect)
            else {
                continue;
            };
            if !rect.contains(pos) {
                continue;
            }
            let radius = 1.2 + depth * 1.4;
            let alpha = (140.0 + depth * 70.0).clamp(0.0, 255.0) as u8;
            let faded = Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha);
            painter.circle(pos, radius, faded, Stroke::NONE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::api::{ClusterEmbeddings, EmbeddingsData};
    use crate::egui_app::controller::test_support;
    use crate::egui_app::view_model::ClusterSummary;

    fn vectors(count: usize) -> Vec<Vec<f32>> {
        vec![vec![0.0; 6]; count]
    }

    fn embeddings(count: usize) -> EmbeddingsData {
        EmbeddingsData {
            dimensions: 6,
            count,
            embeddings: vectors(count),
        }
    }

    #[test]
    fn unbiased_set_backs_the_cloud_until_clusters_load() {
        let mut controller = test_support::controller();
        controller.unbiased = Some(embeddings(4));
        let layers = cloud_layers(&controller);
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].1, UNBIASED_COLOR);
        assert_eq!(layers[0].0.len(), 4);
    }

    #[test]
    fn cluster_layers_replace_the_unbiased_fallback() {
        let mut controller = test_support::controller();
        controller.unbiased = Some(embeddings(4));
        controller.clusters = Some(BTreeMap::from([(
            "cluster_1".to_string(),
            ClusterEmbeddings {
                count: 2,
                dimensions: 6,
                embeddings: vectors(2),
            },
        )]));
        controller.ui.clusters.rows = vec![ClusterSummary {
            id: "cluster_1".into(),
            numeric_id: Some(1),
            size: 2,
            dimensions: 6,
        }];
        let layers = cloud_layers(&controller);
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].1, CLUSTER_COLORS[0]);
    }

    #[test]
    fn removed_overlay_paints_last_when_enabled() {
        let mut controller = test_support::controller();
        controller.unbiased = Some(embeddings(4));
        controller.removed = Some(embeddings(1));
        controller.ui.cloud.show_removed = true;
        let layers = cloud_layers(&controller);
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[1].1, REMOVED_COLOR);
    }
}
