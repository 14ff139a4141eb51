use crate::render::{RenderCtx, RenderTarget};

use super::validate::{check_attachment, check_device, check_draw, SolidFillError};
use super::{SolidFillConstants, SHADER_SOURCE};

/// One draw call: a constant block and the number of points to emit.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SolidFillDraw {
    pub constants: SolidFillConstants,
    pub vertex_count: u32,
}

impl SolidFillDraw {
    #[inline]
    pub const fn new(constants: SolidFillConstants, vertex_count: u32) -> Self {
        Self {
            constants,
            vertex_count,
        }
    }
}

/// Solid-fill point renderer.
///
/// Owns a single pipeline, rebuilt when the target format changes. Every draw
/// binds its constant block through immediates and emits `vertex_count`
/// points; there are no vertex buffers, bind groups or blending.
#[derive(Default)]
pub struct SolidFillRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    warned_non_finite: bool,
}

impl SolidFillRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `draws` into `target` in submission order.
    ///
    /// Device and attachment problems are returned before anything is recorded.
    /// Draws with non-finite transforms are skipped (one-time warning) and
    /// zero-vertex draws are ignored.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        draws: &[SolidFillDraw],
    ) -> Result<(), SolidFillError> {
        check_device(ctx.device.features(), &ctx.device.limits())?;
        check_attachment(ctx.target_format)?;

        let accepted = self.accepted(draws);
        if accepted.is_empty() {
            return Ok(());
        }

        self.ensure_pipeline(ctx);
        let Some(pipeline) = self.pipeline.as_ref() else { return Ok(()) };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("raymark solid fill pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        for draw in accepted {
            rpass.set_immediates(0, draw.constants.as_bytes());
            rpass.draw(0..draw.vertex_count, 0..1);
        }

        Ok(())
    }

    /// Draws that will be issued, in submission order.
    ///
    /// Zero-vertex draws are dropped silently; draws failing [`check_draw`]
    /// are dropped with a warning logged once per renderer.
    fn accepted<'d>(&mut self, draws: &'d [SolidFillDraw]) -> Vec<&'d SolidFillDraw> {
        let mut accepted = Vec::with_capacity(draws.len());
        for draw in draws {
            if draw.vertex_count == 0 {
                continue;
            }
            match check_draw(draw) {
                Ok(()) => accepted.push(draw),
                Err(e) => {
                    if !self.warned_non_finite {
                        log::warn!("SolidFillRenderer: {e}; draw skipped");
                        self.warned_non_finite = true;
                    }
                }
            }
        }
        accepted
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.target_format) && self.pipeline.is_some() {
            return;
        }

        log::debug!("building solid fill pipeline for {:?}", ctx.target_format);

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("raymark solid fill shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_SOURCE.into()),
        });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("raymark solid fill pipeline layout"),
                bind_group_layouts: &[],
                immediate_size: SolidFillConstants::SIZE,
            });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("raymark solid fill pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.target_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::PointList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.target_format);
        self.pipeline = Some(pipeline);
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};

    use super::*;
    use crate::color::PackedColor;

    fn draw(color: PackedColor, vertex_count: u32) -> SolidFillDraw {
        SolidFillDraw::new(SolidFillConstants::new(Mat4::IDENTITY, color), vertex_count)
    }

    fn non_finite(vertex_count: u32) -> SolidFillDraw {
        let t = Mat4::from_translation(Vec3::new(f32::INFINITY, 0.0, 0.0));
        SolidFillDraw::new(SolidFillConstants::new(t, PackedColor::WHITE), vertex_count)
    }

    #[test]
    fn accepted_keeps_submission_order() {
        let draws = [
            draw(PackedColor::RED, 1),
            draw(PackedColor::GREEN, 2),
            draw(PackedColor::BLUE, 3),
        ];
        let mut r = SolidFillRenderer::new();
        let colors: Vec<PackedColor> =
            r.accepted(&draws).iter().map(|d| d.constants.color).collect();
        assert_eq!(colors, vec![PackedColor::RED, PackedColor::GREEN, PackedColor::BLUE]);
    }

    #[test]
    fn accepted_skips_zero_vertex_draws_without_warning() {
        let draws = [draw(PackedColor::RED, 0), draw(PackedColor::BLUE, 4)];
        let mut r = SolidFillRenderer::new();
        let accepted = r.accepted(&draws);
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].vertex_count, 4);
        assert!(!r.warned_non_finite);
    }

    #[test]
    fn accepted_skips_non_finite_transforms() {
        let draws = [non_finite(2), draw(PackedColor::GREEN, 1), non_finite(5)];
        let mut r = SolidFillRenderer::new();
        let accepted = r.accepted(&draws);
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].constants.color, PackedColor::GREEN);
    }

    #[test]
    fn non_finite_warning_is_latched_across_calls() {
        let mut r = SolidFillRenderer::new();
        assert!(r.accepted(&[non_finite(1)]).is_empty());
        assert!(r.warned_non_finite);
        assert!(r.accepted(&[non_finite(1)]).is_empty());
        assert!(r.warned_non_finite);
    }

    #[test]
    fn empty_batch_accepts_nothing() {
        let mut r = SolidFillRenderer::new();
        assert!(r.accepted(&[]).is_empty());
    }
}
