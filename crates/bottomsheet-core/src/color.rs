#![forbid(unsafe_code)]

//! Backdrop colors.

/// Straight (non-premultiplied) RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Scale alpha by `opacity`, clamped to `[0.0, 1.0]`.
    #[must_use]
    pub fn with_opacity(self, opacity: f64) -> Self {
        let opacity = if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
        let a = (f64::from(self.a) * opacity).round() as u8;
        Self { a, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opacity_scales_alpha() {
        assert_eq!(Rgba::BLACK.with_opacity(0.5).a, 128);
        assert_eq!(Rgba::BLACK.with_opacity(0.0).a, 0);
        assert_eq!(Rgba::rgba(1, 2, 3, 100).with_opacity(1.0).a, 100);
    }

    #[test]
    fn opacity_is_clamped() {
        assert_eq!(Rgba::BLACK.with_opacity(3.0).a, 255);
        assert_eq!(Rgba::BLACK.with_opacity(-1.0).a, 0);
        assert_eq!(Rgba::BLACK.with_opacity(f64::NAN).a, 0);
    }
}
