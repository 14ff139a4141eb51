//! CPU reference of the solid-fill shader pair.
//!
//! Both functions are pure; they mirror `vs_main` and `fs_main` exactly and are
//! what the reference rasterizer and the tests run against.

use glam::Vec4;

use super::SolidFillConstants;

/// Synthetic local position for vertex `index`: `(0, 0, -index, 1)`.
#[inline]
pub fn local_position(index: u32) -> Vec4 {
    Vec4::new(0.0, 0.0, -(index as f32), 1.0)
}

/// Clip-space position of vertex `index`.
#[inline]
pub fn vertex(index: u32, constants: &SolidFillConstants) -> Vec4 {
    constants.transform * local_position(index)
}

/// Color written for every covered pixel.
#[inline]
pub fn fragment(constants: &SolidFillConstants) -> Vec4 {
    constants.color.unpack()
}
