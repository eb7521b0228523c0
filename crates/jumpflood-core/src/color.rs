//! Lossy packing of an RGB triple into one scalar.
//!
//! Each channel is quantized to ten levels and stored as one decimal digit:
//! red in the tenths, green in the hundredths and blue in the thousandths.
//! The packed value is always inside `[0, 1)`.

use crate::math::Vec3;

/// Number of quantization levels per channel.
pub const LEVELS: u32 = 10;

// A few ulps at 10.0, so values on the 0.1 grid land on their digit.
const QUANTIZE_EPSILON: f32 = 1e-5;

// Packed values are multiples of 1/1000; this only absorbs the division error.
const DECODE_EPSILON: f32 = 1e-2;

fn channel_level(c: f32) -> u32 {
    let level = (c * LEVELS as f32 + QUANTIZE_EPSILON).floor();
    level.clamp(0.0, (LEVELS - 1) as f32) as u32
}

/// Packs `color` into a single scalar in `[0, 1)`.
pub fn encode_color(color: Vec3) -> f32 {
    let r = channel_level(color.x);
    let g = channel_level(color.y);
    let b = channel_level(color.z);
    (r * 100 + g * 10 + b) as f32 / 1000.0
}

/// Recovers the quantized RGB triple stored by [`encode_color`].
pub fn decode_color(data: f32) -> Vec3 {
    let packed = (data * 1000.0 + DECODE_EPSILON).floor().clamp(0.0, 999.0) as u32;
    Vec3::new(
        (packed / 100) as f32 / LEVELS as f32,
        (packed / 10 % 10) as f32 / LEVELS as f32,
        (packed % 10) as f32 / LEVELS as f32,
    )
}

/// Converts a linear `[0, 1]` RGB triple to a `0x00RRGGBB` pixel.
pub fn to_rgb_u32(color: Vec3) -> u32 {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
    (channel(color.x) << 16) | (channel(color.y) << 8) | channel(color.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_colors_roundtrip_exactly() {
        for r in 0..LEVELS {
            for g in 0..LEVELS {
                for b in 0..LEVELS {
                    let c = Vec3::new(r as f32 / 10.0, g as f32 / 10.0, b as f32 / 10.0);
                    assert_eq!(decode_color(encode_color(c)), c, "levels {r} {g} {b}");
                }
            }
        }
    }

    #[test]
    fn test_arbitrary_scalar_within_one_thousandth() {
        let mut f = 0.0f32;
        while f < 0.999 {
            let back = encode_color(decode_color(f));
            assert!((back - f).abs() <= 1.0 / 1000.0, "{f} -> {back}");
            f += 0.000_73;
        }
    }

    #[test]
    fn test_encoded_value_stays_below_one() {
        let white = encode_color(Vec3::splat(1.0));
        assert!(white < 1.0);
        assert_eq!(decode_color(white), Vec3::splat(0.9));
        assert_eq!(encode_color(Vec3::splat(-0.5)), 0.0);
    }

    #[test]
    fn test_red_keeps_its_hue() {
        let red = decode_color(encode_color(Vec3::new(1.0, 0.0, 0.0)));
        assert!(red.x > 0.0);
        assert_eq!(red.y, 0.0);
        assert_eq!(red.z, 0.0);
    }

    #[test]
    fn test_values_just_below_a_level_floor() {
        assert_eq!(encode_color(Vec3::new(0.0999, 0.0, 0.0)), 0.0);
        assert_eq!(encode_color(Vec3::new(0.0, 0.5999, 0.0)), 0.05);
        assert_eq!(decode_color(encode_color(Vec3::new(0.19995, 0.0, 0.0))).x, 0.1);
    }

    #[test]
    fn test_to_rgb_u32() {
        assert_eq!(to_rgb_u32(Vec3::new(1.0, 0.0, 0.0)), 0x00FF_0000);
        assert_eq!(to_rgb_u32(Vec3::new(0.0, 0.0, 2.0)), 0x0000_00FF);
    }
}
