//! Marker rays expressed as solid-fill draws.
//!
//! The stage walks local `-Z` one unit per vertex index, so a marker transform
//! rotates `-Z` onto the marker direction, scales by the spacing and moves the
//! result to the origin.

use glam::{Mat4, Quat, Vec3};
use raymark_engine::render::solid_fill::{SolidFillConstants, SolidFillDraw};

use crate::config::{CameraSection, MarkerConfig};

/// Local-to-world transform of a marker ray.
pub fn marker_transform(marker: &MarkerConfig) -> Mat4 {
    let dir = Vec3::from(marker.direction).normalize();
    let rotation = Quat::from_rotation_arc(Vec3::NEG_Z, dir);
    Mat4::from_scale_rotation_translation(
        Vec3::splat(marker.spacing),
        rotation,
        Vec3::from(marker.origin),
    )
}

/// World-to-clip transform, with the eye orbited around `target` by `angle` radians.
pub fn view_projection(camera: &CameraSection, aspect: f32, angle: f32) -> Mat4 {
    let target = Vec3::from(camera.target);
    let eye = target + Quat::from_rotation_y(angle) * (Vec3::from(camera.eye) - target);
    let view = Mat4::look_at_rh(eye, target, Vec3::Y);
    let proj = Mat4::perspective_rh(camera.fov_y_deg.to_radians(), aspect, camera.near, camera.far);
    proj * view
}

/// One draw per marker, in config order.
pub fn build_draws(markers: &[MarkerConfig], view_proj: Mat4) -> Vec<SolidFillDraw> {
    markers
        .iter()
        .map(|m| {
            let constants = SolidFillConstants::new(view_proj * marker_transform(m), m.color.0);
            SolidFillDraw::new(constants, m.count)
        })
        .collect()
}
