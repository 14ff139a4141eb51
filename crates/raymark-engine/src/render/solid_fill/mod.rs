//! Push-constant-driven solid-fill primitive stage.
//!
//! One draw call with `N` vertices places `N` points along the ray
//! `transform * (0, 0, -i, 1)` and fills every covered pixel with the unpacked
//! color. The WGSL source in `shaders/solid_fill.wgsl` and the CPU functions in
//! [`stage`] implement the same math.

mod constants;
mod renderer;
pub mod stage;
mod validate;

pub use constants::SolidFillConstants;
pub use renderer::{SolidFillDraw, SolidFillRenderer};
pub use validate::{check_attachment, check_device, check_draw, SolidFillError};

/// WGSL source for the vertex/fragment pair.
pub const SHADER_SOURCE: &str = include_str!("shaders/solid_fill.wgsl");
