//! Host-side checks run before the stage is bound.
//!
//! The stage itself has no failure modes. Everything that can go wrong is a
//! configuration problem on the host side, reported here.

use std::fmt;

use super::{SolidFillConstants, SolidFillDraw};

/// Configuration error detected before a solid-fill draw is issued.
#[derive(Debug, Clone, PartialEq)]
pub enum SolidFillError {
    /// The device was created without `Features::IMMEDIATES`.
    MissingImmediates,
    /// The device immediate-data limit is smaller than the constant block.
    ImmediateLimit { required: u32, available: u32 },
    /// The color attachment cannot receive a float RGBA output.
    UnsupportedAttachment(wgpu::TextureFormat),
    /// The draw transform contains NaN or infinity.
    NonFiniteTransform,
}

impl fmt::Display for SolidFillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingImmediates => {
                write!(f, "device was created without immediate data support")
            }
            Self::ImmediateLimit { required, available } => write!(
                f,
                "constant block needs {required} bytes of immediate data, device allows {available}"
            ),
            Self::UnsupportedAttachment(format) => {
                write!(f, "attachment format {format:?} cannot receive a float color output")
            }
            Self::NonFiniteTransform => write!(f, "draw transform contains non-finite values"),
        }
    }
}

impl std::error::Error for SolidFillError {}

/// Checks that a device can bind [`SolidFillConstants`].
pub fn check_device(features: wgpu::Features, limits: &wgpu::Limits) -> Result<(), SolidFillError> {
    if !features.contains(wgpu::Features::IMMEDIATES) {
        return Err(SolidFillError::MissingImmediates);
    }
    if limits.max_immediate_size < SolidFillConstants::SIZE {
        return Err(SolidFillError::ImmediateLimit {
            required: SolidFillConstants::SIZE,
            available: limits.max_immediate_size,
        });
    }
    Ok(())
}

/// Checks that `format` can be the single color attachment.
pub fn check_attachment(format: wgpu::TextureFormat) -> Result<(), SolidFillError> {
    if format.is_depth_stencil_format() {
        return Err(SolidFillError::UnsupportedAttachment(format));
    }
    match format.sample_type(None, None) {
        Some(wgpu::TextureSampleType::Float { .. }) => Ok(()),
        _ => Err(SolidFillError::UnsupportedAttachment(format)),
    }
}

/// Checks the per-draw constants.
pub fn check_draw(draw: &SolidFillDraw) -> Result<(), SolidFillError> {
    if !draw.constants.transform.is_finite() {
        return Err(SolidFillError::NonFiniteTransform);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use glam::Mat4;

    use super::*;
    use crate::color::PackedColor;

    fn limits(max_immediate_size: u32) -> wgpu::Limits {
        wgpu::Limits {
            max_immediate_size,
            ..wgpu::Limits::default()
        }
    }

    #[test]
    fn device_without_feature_is_rejected() {
        assert_eq!(
            check_device(wgpu::Features::empty(), &limits(128)),
            Err(SolidFillError::MissingImmediates)
        );
    }

    #[test]
    fn device_with_small_limit_is_rejected() {
        assert_eq!(
            check_device(wgpu::Features::IMMEDIATES, &limits(64)),
            Err(SolidFillError::ImmediateLimit { required: 80, available: 64 })
        );
    }

    #[test]
    fn device_with_exact_limit_is_accepted() {
        assert!(check_device(wgpu::Features::IMMEDIATES, &limits(80)).is_ok());
    }

    #[test]
    fn color_formats_are_accepted() {
        for f in [
            wgpu::TextureFormat::Rgba8Unorm,
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba16Float,
        ] {
            assert!(check_attachment(f).is_ok(), "{f:?}");
        }
    }

    #[test]
    fn depth_and_integer_formats_are_rejected() {
        for f in [
            wgpu::TextureFormat::Depth32Float,
            wgpu::TextureFormat::Depth24PlusStencil8,
            wgpu::TextureFormat::Rgba8Uint,
            wgpu::TextureFormat::R32Sint,
        ] {
            assert_eq!(check_attachment(f), Err(SolidFillError::UnsupportedAttachment(f)));
        }
    }

    #[test]
    fn non_finite_transform_is_rejected() {
        let mut m = Mat4::IDENTITY;
        m.w_axis.z = f32::NAN;
        let draw = SolidFillDraw::new(SolidFillConstants::new(m, PackedColor::RED), 4);
        assert_eq!(check_draw(&draw), Err(SolidFillError::NonFiniteTransform));
    }

    #[test]
    fn finite_transform_is_accepted() {
        let draw = SolidFillDraw::new(SolidFillConstants::default(), 4);
        assert!(check_draw(&draw).is_ok());
    }

    #[test]
    fn errors_render_readable_messages() {
        let e = SolidFillError::ImmediateLimit { required: 80, available: 0 };
        assert_eq!(
            e.to_string(),
            "constant block needs 80 bytes of immediate data, device allows 0"
        );
    }
}
