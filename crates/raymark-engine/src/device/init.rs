use crate::render::solid_fill::SolidFillConstants;

/// Initialization parameters for the GPU layer.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior).
    ///
    /// FIFO is broadly supported and fine for overlay workloads.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Required wgpu features. Checked against the adapter before device creation.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface (a hint).
    pub desired_maximum_frame_latency: u32,
}

impl GpuInit {
    /// Defaults plus what the solid-fill stage needs: immediate data large
    /// enough for [`SolidFillConstants`], and a linear surface so unpacked
    /// color bytes reach the swapchain without sRGB encoding.
    pub fn solid_fill() -> Self {
        let mut init = Self {
            prefer_srgb: false,
            ..Self::default()
        };
        init.required_features |= wgpu::Features::IMMEDIATES;
        init.required_limits.max_immediate_size = init
            .required_limits
            .max_immediate_size
            .max(SolidFillConstants::SIZE);
        init
    }
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::surface::choose_surface_format;
    use crate::render::solid_fill::check_device;

    #[test]
    fn default_requests_nothing_special() {
        let init = GpuInit::default();
        assert!(init.required_features.is_empty());
        assert_eq!(init.present_mode, wgpu::PresentMode::Fifo);
    }

    #[test]
    fn solid_fill_init_passes_device_check() {
        let init = GpuInit::solid_fill();
        assert!(check_device(init.required_features, &init.required_limits).is_ok());
    }

    #[test]
    fn solid_fill_init_prefers_linear_surface() {
        let init = GpuInit::solid_fill();
        assert!(!init.prefer_srgb);
        let caps = wgpu::SurfaceCapabilities {
            formats: vec![
                wgpu::TextureFormat::Bgra8UnormSrgb,
                wgpu::TextureFormat::Bgra8Unorm,
            ],
            ..Default::default()
        };
        let format = choose_surface_format(&caps, init.prefer_srgb);
        assert_eq!(format, Some(wgpu::TextureFormat::Bgra8Unorm));
        assert!(!format.is_some_and(|f| f.is_srgb()));
    }
}
