//! Raymark engine crate.
//!
//! Owns the push-constant-driven solid-fill stage, its wgpu host, a CPU
//! reference rasterizer, and the platform + GPU runtime used by the studio.

pub mod device;
pub mod window;
pub mod core;

pub mod logging;
pub mod color;
pub mod render;
