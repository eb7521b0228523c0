//! Distance transform: the terminal pass turning nearest-seed data into a
//! presentable color.

use jumpflood_core::texel::Channels;
use jumpflood_core::SeedTexel;

use crate::target::RenderTarget;
use crate::viewport::Viewport;

/// Brightness at zero distance.
pub const MIN_BRIGHTNESS: f32 = 0.15;

/// `0.15 + 0.85 * sqrt(dist / sqrt(2))` for a distance in texture space.
pub fn brightness(dist: f32) -> f32 {
    MIN_BRIGHTNESS + (1.0 - MIN_BRIGHTNESS) * (dist / std::f32::consts::SQRT_2).sqrt()
}

/// Output for pixel `(x, y)`: RGB in the first three channels, alpha set
/// only where a seed was found.
pub fn finalize_texel(source: &RenderTarget, x: u32, y: u32) -> Channels {
    let seed = SeedTexel::from_channels(source.texel(x, y));
    if !seed.is_valid() {
        return [0.0; 4];
    }
    let texcoord = Viewport::new(source.width(), source.height()).texcoord(x, y);
    let dist = seed.nearest_seed.distance_to(texcoord);
    let color = seed.color() * brightness(dist);
    [color.x, color.y, color.z, 1.0]
}
