//! Pure camera math for the point cloud view.

use eframe::egui::{Pos2, Rect};

/// Axis-aligned bounds of the visible points, used to center and scale the
/// projection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Bounds {
    pub(super) center: [f32; 3],
    pub(super) radius: f32,
}

impl Bounds {
    /// Compute bounds over the first three components of each point.
    /// Returns `None` for an empty set.
    pub(super) fn from_points<'a>(points: impl Iterator<Item = &'a [f32]>) -> Option<Self> {
        let mut min = [f32::INFINITY; 3];
        let mut max = [f32::NEG_INFINITY; 3];
        let mut any = false;
        for point in points {
            any = true;
            for axis in 0..3 {
                let value = point.get(axis).copied().unwrap_or(0.0);
                min[axis] = min[axis].min(value);
                max[axis] = max[axis].max(value);
            }
        }
        if !any {
            return None;
        }
        let center = [
            (min[0] + max[0]) / 2.0,
            (min[1] + max[1]) / 2.0,
            (min[2] + max[2]) / 2.0,
        ];
        let radius = (0..3)
            .map(|axis| (max[axis] - min[axis]) / 2.0)
            .fold(0.0f32, f32::max)
            .max(f32::EPSILON);
        Some(Self { center, radius })
    }
}

/// Rotate a centered point by yaw (around Y) then pitch (around X).
pub(super) fn rotate(point: [f32; 3], yaw: f32, pitch: f32) -> [f32; 3] {
    let (sin_yaw, cos_yaw) = yaw.sin_cos();
    let (sin_pitch, cos_pitch) = pitch.sin_cos();
    let x = point[0] * cos_yaw + point[2] * sin_yaw;
    let z = -point[0] * sin_yaw + point[2] * cos_yaw;
    let y = point[1] * cos_pitch - z * sin_pitch;
    let z = point[1] * sin_pitch + z * cos_pitch;
    [x, y, z]
}

/// Distance of the virtual camera from the cloud center, in radii.
const CAMERA_DISTANCE: f32 = 3.0;

/// Project a point into `rect` with a simple perspective divide.
///
/// Returns the screen position and a depth factor in roughly `0.5..1.5`
/// used for size and fade; `None` when the point lands behind the camera.
pub(super) fn project(
    point: &[f32],
    bounds: Bounds,
    yaw: f32,
    pitch: f32,
    zoom: f32,
    rect: Rect,
) -> Option<(Pos2, f32)> {
    let centered = [
        (point.first().copied().unwrap_or(0.0) - bounds.center[0]) / bounds.radius,
        (point.get(1).copied().unwrap_or(0.0) - bounds.center[1]) / bounds.radius,
        (point.get(2).copied().unwrap_or(0.0) - bounds.center[2]) / bounds.radius,
    ];
    let rotated = rotate(centered, yaw, pitch);
    let depth = CAMERA_DISTANCE - rotated[2];
    if depth <= 0.1 {
        return None;
    }
    let scale = rect.width().min(rect.height()) * 0.5 * zoom;
    let perspective = CAMERA_DISTANCE / depth;
    let x = rect.center().x + rotated[0] * scale * perspective / 2.0;
    let y = rect.center().y - rotated[1] * scale * perspective / 2.0;
    Some((Pos2::new(x, y), perspective))
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    #[test]
    fn bounds_cover_the_extremes() {
        let points: Vec<Vec<f32>> = vec![vec![-1.0, 0.0, 2.0], vec![3.0, 4.0, -2.0]];
        let bounds = Bounds::from_points(points.iter().map(Vec::as_slice)).unwrap();
        assert_eq!(bounds.center, [1.0, 2.0, 0.0]);
        assert_eq!(bounds.radius, 2.0);
    }

    #[test]
    fn bounds_of_nothing_is_none() {
        assert!(Bounds::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn zero_rotation_is_identity() {
        let point = [0.5, -0.25, 0.75];
        let rotated = rotate(point, 0.0, 0.0);
        for axis in 0..3 {
            assert!((rotated[axis] - point[axis]).abs() < 1e-6);
        }
    }

    #[test]
    fn quarter_yaw_swaps_x_and_z() {
        let rotated = rotate([1.0, 0.0, 0.0], std::f32::consts::FRAC_PI_2, 0.0);
        assert!(rotated[0].abs() < 1e-6);
        assert!((rotated[2] - -1.0).abs() < 1e-6);
    }

    #[test]
    fn the_center_projects_to_the_rect_center() {
        let bounds = Bounds {
            center: [1.0, 2.0, 3.0],
            radius: 4.0,
        };
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(200.0, 100.0));
        let (pos, _) = project(&[1.0, 2.0, 3.0], bounds, 0.7, 0.2, 1.0, rect).unwrap();
        assert!((pos.x - 100.0).abs() < 1e-4);
        assert!((pos.y - 50.0).abs() < 1e-4);
    }

    #[test]
    fn points_behind_the_camera_are_culled() {
        let bounds = Bounds {
            center: [0.0; 3],
            radius: 1.0,
        };
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
        // z = 10 radii puts the point past the camera plane at zero rotation.
        assert!(project(&[0.0, 0.0, 10.0], bounds, 0.0, 0.0, 1.0, rect).is_none());
    }

    #[test]
    fn short_vectors_are_padded_with_zeros() {
        let points: Vec<Vec<f32>> = vec![vec![2.0], vec![-2.0]];
        let bounds = Bounds::from_points(points.iter().map(Vec::as_slice)).unwrap();
        assert_eq!(bounds.center, [0.0, 0.0, 0.0]);
        assert_eq!(bounds.radius, 2.0);
    }
}
