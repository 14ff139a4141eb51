//! Color representation shared by the stage, its host and the reference rasterizer.
//!
//! The stage consumes one packed 32-bit color per draw. Unpacking follows the
//! unorm4x8 convention: byte `i` (bits `8i..8i+7`) becomes channel `i` as
//! `byte / 255`, with channel order R, G, B, A.

mod packed;

pub use packed::{ColorParseError, PackedColor};
