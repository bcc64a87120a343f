use crate::foundation::error::{CollageError, CollageResult};

pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Construct a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque black.
    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    /// Opaque white.
    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(s: &str) -> CollageResult<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if (hex.len() != 6 && hex.len() != 8) || !hex.is_ascii() {
            return Err(CollageError::invalid_argument(format!(
                "color '{s}' must be #rrggbb or #rrggbbaa"
            )));
        }
        let channel = |i: usize| -> CollageResult<u8> {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| {
                CollageError::invalid_argument(format!("color '{s}' is not valid hex: {e}"))
            })
        };
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, a))
    }

    /// Premultiplied RGBA8 bytes for this color.
    pub fn premultiplied(self) -> [u8; 4] {
        use crate::foundation::math::mul_div255_u8;

        let a = u16::from(self.a);
        [
            mul_div255_u8(u16::from(self.r), a),
            mul_div255_u8(u16::from(self.g), a),
            mul_div255_u8(u16::from(self.b), a),
            self.a,
        ]
    }
}

impl Default for Rgba8 {
    fn default() -> Self {
        Self::black()
    }
}

/// Return `true` when both coordinates of `p` are finite.
pub fn is_finite_point(p: Point) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
