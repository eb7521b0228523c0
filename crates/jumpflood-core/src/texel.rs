use serde::{Deserialize, Serialize};

use crate::color::decode_color;
use crate::math::{Vec2, Vec3};

/// Raw four-channel storage of a render target texel.
pub type Channels = [f32; 4];

/// Interpretation of a texel during seeding and propagation.
///
/// Channel layout: `x`, `y` hold the nearest seed position in normalized
/// `[0, 1]²` texture space, `z` the encoded seed color and `w` the validity
/// flag (nonzero once a seed has reached the texel).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedTexel {
    pub nearest_seed: Vec2,
    pub encoded_color: f32,
    pub validity: f32,
}

impl SeedTexel {
    /// The unseeded texel.
    pub const EMPTY: SeedTexel = SeedTexel {
        nearest_seed: Vec2::ZERO,
        encoded_color: 0.0,
        validity: 0.0,
    };

    pub fn seed(nearest_seed: Vec2, encoded_color: f32) -> Self {
        Self {
            nearest_seed,
            encoded_color,
            validity: 1.0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validity != 0.0
    }

    pub fn color(&self) -> Vec3 {
        decode_color(self.encoded_color)
    }

    pub fn from_channels(c: Channels) -> Self {
        Self {
            nearest_seed: Vec2::new(c[0], c[1]),
            encoded_color: c[2],
            validity: c[3],
        }
    }

    pub fn to_channels(self) -> Channels {
        [
            self.nearest_seed.x,
            self.nearest_seed.y,
            self.encoded_color,
            self.validity,
        ]
    }
}
