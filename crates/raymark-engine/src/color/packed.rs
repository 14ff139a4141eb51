use std::fmt;

use bytemuck::{Pod, Zeroable};
use glam::Vec4;

/// Four unsigned-normalized 8-bit channels packed into one `u32`.
///
/// Channel layout (least significant byte first): R, G, B, A.
/// `0x000000FF` is therefore pure red with zero alpha: `(1, 0, 0, 0)`.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct PackedColor(pub u32);

impl PackedColor {
    pub const TRANSPARENT: Self = Self::from_rgba8(0, 0, 0, 0);
    pub const BLACK: Self = Self::from_rgba8(0, 0, 0, 255);
    pub const WHITE: Self = Self::from_rgba8(255, 255, 255, 255);
    pub const RED: Self = Self::from_rgba8(255, 0, 0, 255);
    pub const GREEN: Self = Self::from_rgba8(0, 255, 0, 255);
    pub const BLUE: Self = Self::from_rgba8(0, 0, 255, 255);

    #[inline]
    pub const fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(u32::from_le_bytes([r, g, b, a]))
    }

    /// Returns `[r, g, b, a]` bytes.
    #[inline]
    pub const fn to_rgba8(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    /// Unpacks to normalized channels in `[0, 1]`.
    ///
    /// `0` maps to exactly `0.0` and `255` to exactly `1.0`; no clamping is involved.
    #[inline]
    pub fn unpack(self) -> Vec4 {
        let [r, g, b, a] = self.to_rgba8();
        Vec4::new(unorm8(r), unorm8(g), unorm8(b), unorm8(a))
    }

    /// Packs normalized channels, rounding to the nearest byte.
    ///
    /// Channels are clamped to `[0, 1]`; NaN packs to `0`.
    #[inline]
    pub fn from_unorm(c: Vec4) -> Self {
        Self::from_rgba8(to_unorm8(c.x), to_unorm8(c.y), to_unorm8(c.z), to_unorm8(c.w))
    }

    /// Parses `#RRGGBB` or `#RRGGBBAA` (the leading `#` is optional).
    ///
    /// Alpha defaults to `FF` when omitted.
    pub fn from_hex(s: &str) -> Result<Self, ColorParseError> {
        let digits = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if digits.len() != 6 && digits.len() != 8 {
            return Err(ColorParseError::Length(digits.len()));
        }

        // from_str_radix tolerates a leading '+', so check digits up front.
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorParseError::Digit(digits.to_string()));
        }

        let mut bytes = [0xFFu8; 4];
        for (i, byte) in bytes.iter_mut().enumerate().take(digits.len() / 2) {
            let pair = &digits[i * 2..i * 2 + 2];
            *byte = u8::from_str_radix(pair, 16)
                .map_err(|_| ColorParseError::Digit(pair.to_string()))?;
        }

        let [r, g, b, a] = bytes;
        Ok(Self::from_rgba8(r, g, b, a))
    }
}

impl From<u32> for PackedColor {
    #[inline]
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl From<PackedColor> for u32 {
    #[inline]
    fn from(c: PackedColor) -> Self {
        c.0
    }
}

impl fmt::Display for PackedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba8();
        write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}

#[inline]
fn unorm8(v: u8) -> f32 {
    v as f32 / 255.0
}

#[inline]
fn to_unorm8(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Error returned by [`PackedColor::from_hex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    /// Digit count is neither 6 nor 8.
    Length(usize),
    /// A byte pair is not valid hexadecimal.
    Digit(String),
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length(n) => write!(f, "hex color needs 6 or 8 digits, got {n}"),
            Self::Digit(s) => write!(f, "invalid hex digits `{s}`"),
        }
    }
}

impl std::error::Error for ColorParseError {}
