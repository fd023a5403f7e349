//! Colour encoding and the heatmap palette.

use rtw_math::Interval;

use crate::Color;

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGB.
///
/// Components are gamma encoded and mapped with `256 * clamp(c, 0, 0.999)`,
/// so every byte value covers an equal slice of `[0, 1)`.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    let intensity = Interval::new(0.0, 0.999);
    let encode = |c: f32| (256.0 * intensity.clamp(linear_to_gamma(c))) as u8;
    [encode(color.x), encode(color.y), encode(color.z)]
}

/// Polynomial fit of matplotlib's "inferno" colour map, `t` in `[0, 1]`.
pub fn inferno(t: f32) -> Color {
    const C0: Color = Color::new(0.000_218_940_37, 0.001_651_004_6, -0.019_480_898);
    const C1: Color = Color::new(0.106_513_42, 0.563_956_45, 3.932_712_4);
    const C2: Color = Color::new(11.602_493, -3.972_854, -15.942_394);
    const C3: Color = Color::new(-41.703_995, 17.436_399, 44.354_145);
    const C4: Color = Color::new(77.162_94, -33.402_36, -81.807_31);
    const C5: Color = Color::new(-71.319_43, 32.626_064, 73.209_52);
    const C6: Color = Color::new(25.131_126, -12.242_669, -23.070_325);

    let t = t.clamp(0.0, 1.0);
    C0 + t * (C1 + t * (C2 + t * (C3 + t * (C4 + t * (C5 + t * C6)))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_color_to_rgb8() {
        assert_eq!(color_to_rgb8(Color::ZERO), [0, 0, 0]);
        assert_eq!(color_to_rgb8(Color::ONE), [255, 255, 255]);
        assert_eq!(color_to_rgb8(Color::splat(4.0)), [255, 255, 255]);
        // sqrt(0.25) = 0.5 -> 128
        assert_eq!(color_to_rgb8(Color::new(0.25, 0.0, -3.0)), [128, 0, 0]);
    }

    #[test]
    fn test_inferno_endpoints() {
        // Dark purple-black at 0, pale yellow at 1
        let low = inferno(0.0);
        assert!(low.length() < 0.05);

        let high = inferno(1.0);
        assert!(high.x > 0.9 && high.y > 0.9 && high.z > 0.5);

        assert_eq!(inferno(2.0), inferno(1.0));
    }
}
