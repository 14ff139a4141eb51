//! GPU rendering subsystem.
//!
//! The solid-fill stage is the only draw stage. It is driven entirely by a
//! per-draw constant block; no vertex buffers or bind groups are involved.
//!
//! Convention:
//! - transforms are column-major and map local space straight to clip space
//! - clip space follows wgpu (depth `0..=w`, +Y up in NDC)
//! - framebuffer pixels use a top-left origin

mod ctx;
pub mod offscreen;
pub mod raster;
pub mod solid_fill;

pub use ctx::{RenderCtx, RenderTarget};
