use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::color::PackedColor;

/// Per-draw constant block bound through wgpu immediates.
///
/// Layout is part of the pipeline interface:
/// - `transform`: column-major 4x4 `f32`, offset 0
/// - `color`: packed RGBA8, offset 64
/// - 12 trailing bytes of zero padding (WGSL rounds the struct to 16-byte alignment)
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SolidFillConstants {
    pub transform: Mat4,
    pub color: PackedColor,
    _pad: [u32; 3],
}

const _: () = assert!(offset_of!(SolidFillConstants, transform) == SolidFillConstants::TRANSFORM_OFFSET);
const _: () = assert!(offset_of!(SolidFillConstants, color) == SolidFillConstants::COLOR_OFFSET);
const _: () = assert!(size_of::<SolidFillConstants>() == SolidFillConstants::SIZE as usize);

impl SolidFillConstants {
    pub const TRANSFORM_OFFSET: usize = 0;
    pub const COLOR_OFFSET: usize = 64;

    /// Byte size declared as `immediate_size` by the pipeline layout.
    pub const SIZE: u32 = 80;

    #[inline]
    pub const fn new(transform: Mat4, color: PackedColor) -> Self {
        Self {
            transform,
            color,
            _pad: [0; 3],
        }
    }

    /// Bytes handed to `set_immediates`.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl Default for SolidFillConstants {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, PackedColor::WHITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_is_eighty_bytes() {
        let c = SolidFillConstants::default();
        assert_eq!(c.as_bytes().len(), 80);
        assert_eq!(SolidFillConstants::SIZE % 4, 0);
    }

    #[test]
    fn transform_bytes_are_column_major() {
        let m = Mat4::from_cols_array(&[
            1.0, 2.0, 3.0, 4.0, //
            5.0, 6.0, 7.0, 8.0, //
            9.0, 10.0, 11.0, 12.0, //
            13.0, 14.0, 15.0, 16.0,
        ]);
        let c = SolidFillConstants::new(m, PackedColor::BLACK);
        let floats: &[f32] = bytemuck::cast_slice(&c.as_bytes()[..64]);
        assert_eq!(floats[0], 1.0);
        assert_eq!(floats[4], 5.0);
        assert_eq!(floats[12], 13.0);
        assert_eq!(floats[15], 16.0);
    }

    #[test]
    fn color_follows_transform_little_endian() {
        let c = SolidFillConstants::new(Mat4::ZERO, PackedColor(0x4433_2211));
        let bytes = c.as_bytes();
        assert_eq!(&bytes[64..68], &[0x11, 0x22, 0x33, 0x44]);
    }

    #[test]
    fn padding_is_zeroed() {
        let c = SolidFillConstants::new(Mat4::IDENTITY, PackedColor(u32::MAX));
        assert!(c.as_bytes()[68..].iter().all(|&b| b == 0));
    }
}
