//! CPU reference rasterizer for the solid-fill stage.
//!
//! Runs [`stage::vertex`] and [`stage::fragment`] for every point of a draw and
//! writes covered pixels into a float canvas, so output can be checked by
//! sampling pixels without a GPU.

use glam::{Vec3, Vec4};

use crate::color::PackedColor;
use crate::render::solid_fill::{stage, SolidFillDraw};

/// Float RGBA canvas with a top-left origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Vec4>,
}

impl Canvas {
    /// Creates a canvas cleared to transparent black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec4::ZERO; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self, color: Vec4) {
        self.pixels.fill(color);
    }

    /// Returns the pixel at `(x, y)`, or `None` outside the canvas.
    pub fn sample(&self, x: u32, y: u32) -> Option<Vec4> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Rasterizes every point of `draw`; returns how many pixels were written.
    ///
    /// Later points overwrite earlier ones. Points outside the clip volume or
    /// the canvas are dropped.
    pub fn draw(&mut self, draw: &SolidFillDraw) -> usize {
        let color = stage::fragment(&draw.constants);
        let mut written = 0;

        for i in 0..draw.vertex_count {
            let clip = stage::vertex(i, &draw.constants);
            let Some(ndc) = clip_to_ndc(clip) else { continue };
            let Some((x, y)) = self.ndc_to_pixel(ndc) else { continue };
            if let Some(idx) = self.index(x, y) {
                self.pixels[idx] = color;
                written += 1;
            }
        }

        written
    }

    /// Pixel covered by a 1px point with the given NDC.
    ///
    /// The point square `[f - 0.5, f + 0.5)` covers the pixel whose center
    /// `p + 0.5` it contains, i.e. `p = ceil(f) - 1`. A point exactly on the
    /// left or top framebuffer edge covers nothing.
    pub fn ndc_to_pixel(&self, ndc: Vec3) -> Option<(u32, u32)> {
        let fx = (ndc.x + 1.0) * 0.5 * self.width as f32;
        let fy = (1.0 - ndc.y) * 0.5 * self.height as f32;
        let x = covered_pixel(fx, self.width)?;
        let y = covered_pixel(fy, self.height)?;
        Some((x, y))
    }

    /// Quantizes the canvas to RGBA8, rows top to bottom.
    pub fn to_rgba8(&self) -> Vec<[u8; 4]> {
        self.pixels
            .iter()
            .map(|&c| PackedColor::from_unorm(c).to_rgba8())
            .collect()
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }
}

fn covered_pixel(f: f32, extent: u32) -> Option<u32> {
    if !(f > 0.0) {
        return None;
    }
    let p = f.ceil() as u32 - 1;
    (p < extent).then_some(p)
}

/// Clips against the wgpu view volume and performs the perspective divide.
///
/// Accepts `w > 0`, `-w <= x, y <= w` and `0 <= z <= w`.
pub fn clip_to_ndc(clip: Vec4) -> Option<Vec3> {
    let w = clip.w;
    if !(w > 0.0) {
        return None;
    }
    let inside = clip.x.abs() <= w && clip.y.abs() <= w && clip.z >= 0.0 && clip.z <= w;
    inside.then(|| clip.truncate() / w)
}
