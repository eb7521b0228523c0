use jumpflood_core::sequencer::num_steps_for;
use jumpflood_core::Vec2;
use serde::{Deserialize, Serialize};

/// Size of the drawing surface and the coordinate conversions around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn resolution(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Jump flood levels needed to span the longer side.
    pub fn num_steps(&self) -> u32 {
        num_steps_for(self.width, self.height)
    }

    /// Convert a surface pixel position (origin top-left, y down) to
    /// normalized device coordinates (y up).
    pub fn surface_to_ndc(&self, x: f32, y: f32) -> Vec2 {
        let flipped = Vec2::new(x, self.height as f32 - y);
        flipped / self.resolution() * 2.0 - 1.0
    }

    /// Convert NDC to target pixel space (origin bottom-left).
    pub fn ndc_to_pixel(&self, ndc: Vec2) -> Vec2 {
        (ndc * 0.5 + 0.5) * self.resolution()
    }

    /// Normalized texture coordinate of the centre of pixel `(x, y)`.
    pub fn texcoord(&self, x: u32, y: u32) -> Vec2 {
        Vec2::new(x as f32 + 0.5, y as f32 + 0.5) / self.resolution()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_to_ndc_corners() {
        let vp = Viewport::new(200, 100);
        assert_eq!(vp.surface_to_ndc(0.0, 100.0), Vec2::new(-1.0, -1.0));
        assert_eq!(vp.surface_to_ndc(200.0, 0.0), Vec2::new(1.0, 1.0));
        assert_eq!(vp.surface_to_ndc(100.0, 50.0), Vec2::new(0.0, 0.0));
    }

    #[test]
    fn test_ndc_to_pixel_inverts() {
        let vp = Viewport::new(200, 100);
        let p = vp.ndc_to_pixel(vp.surface_to_ndc(50.0, 25.0));
        assert!((p.x - 50.0).abs() < 1e-4);
        assert!((p.y - 75.0).abs() < 1e-4);
    }

    #[test]
    fn test_texcoord_is_pixel_centre() {
        let vp = Viewport::new(4, 4);
        assert_eq!(vp.texcoord(0, 0), Vec2::new(0.125, 0.125));
        assert_eq!(vp.texcoord(3, 3), Vec2::new(0.875, 0.875));
        assert_eq!(vp.num_steps(), 2);
    }
}
