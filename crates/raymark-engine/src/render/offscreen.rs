//! Offscreen color target with CPU readback.
//!
//! Used to capture what the solid-fill stage actually wrote on a real device
//! and compare it pixel by pixel with [`raster::Canvas`](super::raster::Canvas).

use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};

/// Format of every offscreen target.
pub const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

const BYTES_PER_PIXEL: u32 = 4;
const MAP_TIMEOUT: Duration = Duration::from_secs(10);

/// `Rgba8Unorm` texture usable as a render attachment and copy source.
pub struct OffscreenTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl OffscreenTarget {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("raymark offscreen target"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OFFSCREEN_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            width: width.max(1),
            height: height.max(1),
        }
    }

    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    #[inline]
    pub fn format(&self) -> wgpu::TextureFormat {
        OFFSCREEN_FORMAT
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Records a clear of the whole target.
    pub fn clear(&self, encoder: &mut wgpu::CommandEncoder, color: wgpu::Color) {
        let _rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("raymark offscreen clear"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
    }

    /// Copies the target back to the CPU, rows top to bottom.
    ///
    /// Blocks until the copy is mapped. Work already submitted to `queue`
    /// completes before the copy.
    pub fn read_rgba8(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Vec<[u8; 4]>> {
        let unpadded = self.width * BYTES_PER_PIXEL;
        let padded = padded_bytes_per_row(self.width);

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("raymark offscreen readback"),
            size: padded as u64 * self.height as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("raymark offscreen readback encoder"),
        });

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );

        queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            tx.send(res).ok();
        });

        let deadline = Instant::now() + MAP_TIMEOUT;
        let mapped = loop {
            device
                .poll(wgpu::PollType::Poll)
                .context("device poll failed during readback")?;
            match rx.try_recv() {
                Ok(res) => break res,
                Err(mpsc::TryRecvError::Empty) if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(1));
                }
                Err(mpsc::TryRecvError::Empty) => {
                    return Err(anyhow!("timed out waiting for readback buffer"));
                }
                Err(mpsc::TryRecvError::Disconnected) => {
                    return Err(anyhow!("readback map callback dropped"));
                }
            }
        };
        mapped.context("failed to map readback buffer")?;

        let data = slice.get_mapped_range();
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize);
        for row in 0..self.height as usize {
            let start = row * padded as usize;
            let bytes = &data[start..start + unpadded as usize];
            out.extend(bytes.chunks_exact(4).map(|p| [p[0], p[1], p[2], p[3]]));
        }
        drop(data);
        staging.unmap();

        Ok(out)
    }
}

/// Row pitch for a texture-to-buffer copy of `width` RGBA8 pixels.
pub(crate) fn padded_bytes_per_row(width: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    (width * BYTES_PER_PIXEL).div_ceil(align) * align
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3, Vec4};

    use super::*;
    use crate::color::PackedColor;
    use crate::device::HeadlessGpu;
    use crate::render::raster::Canvas;
    use crate::render::solid_fill::{SolidFillConstants, SolidFillDraw, SolidFillRenderer};
    use crate::render::{RenderCtx, RenderTarget};

    #[test]
    fn row_pitch_is_aligned() {
        assert_eq!(padded_bytes_per_row(1), 256);
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
    }

    // Needs an adapter with immediate data support:
    // `cargo test -p raymark-engine -- --ignored gpu_output`
    #[test]
    #[ignore = "requires a GPU adapter with immediate data support"]
    fn gpu_output_matches_reference_rasterizer() {
        let gpu = pollster::block_on(HeadlessGpu::new(crate::device::GpuInit::solid_fill()))
            .expect("no adapter with immediate data support");

        let draws = [
            // Lands on a whole-pixel corner: covers the upper-left neighbour.
            SolidFillDraw::new(
                SolidFillConstants::new(
                    Mat4::from_translation(Vec3::new(-0.5, 0.5, 0.0)),
                    PackedColor::RED,
                ),
                1,
            ),
            // Right framebuffer edge, still inside the clip volume.
            SolidFillDraw::new(
                SolidFillConstants::new(
                    Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)),
                    PackedColor::BLUE,
                ),
                1,
            ),
            SolidFillDraw::new(
                SolidFillConstants::new(
                    Mat4::from_cols(
                        Vec4::ZERO,
                        Vec4::ZERO,
                        Vec4::new(-0.25, 0.0, 0.0, 0.0),
                        Vec4::new(-0.875, -0.375, 0.5, 1.0),
                    ),
                    PackedColor::from_rgba8(0, 255, 0, 128),
                ),
                8,
            ),
        ];

        let target = OffscreenTarget::new(gpu.device(), 8, 8);
        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        target.clear(&mut encoder, wgpu::Color::TRANSPARENT);

        let ctx = RenderCtx::new(gpu.device(), gpu.queue(), target.format());
        let mut renderer = SolidFillRenderer::new();
        {
            let mut rt = RenderTarget::new(&mut encoder, target.view());
            renderer.render(&ctx, &mut rt, &draws).unwrap();
        }
        gpu.queue().submit(std::iter::once(encoder.finish()));

        let captured = target.read_rgba8(gpu.device(), gpu.queue()).unwrap();

        let mut reference = Canvas::new(8, 8);
        for d in &draws {
            reference.draw(d);
        }
        assert_eq!(captured, reference.to_rgba8());
    }
}
