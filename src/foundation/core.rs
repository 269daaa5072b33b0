pub use kurbo::{Affine, BezPath, Cap, Join, Point, Rect, Size, Vec2};

/// Straight-alpha RGBA color with channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build a color from a Lottie color vector (`[r, g, b]` or `[r, g, b, a]`, unit range).
    ///
    /// Missing channels default to `0`, a missing alpha defaults to `1`.
    pub fn from_components(c: &[f32]) -> Self {
        let at = |i: usize, d: f32| c.get(i).copied().unwrap_or(d).clamp(0.0, 1.0);
        Self::rgba(at(0, 0.0), at(1, 0.0), at(2, 0.0), at(3, 1.0))
    }

    /// Parse `#rrggbb` / `#rgb` (the `#` is optional), as used by solid layers.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        let channel = |v: u32| v as f32 / 255.0;
        match hex.len() {
            6 => {
                let v = u32::from_str_radix(hex, 16).ok()?;
                Some(Self::rgba(
                    channel((v >> 16) & 0xff),
                    channel((v >> 8) & 0xff),
                    channel(v & 0xff),
                    1.0,
                ))
            }
            3 => {
                let v = u32::from_str_radix(hex, 16).ok()?;
                let expand = |n: u32| channel(n * 0x11);
                Some(Self::rgba(
                    expand((v >> 8) & 0xf),
                    expand((v >> 4) & 0xf),
                    expand(v & 0xf),
                    1.0,
                ))
            }
            _ => None,
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
