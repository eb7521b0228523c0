//! Seed rasterization: stroke quads filled with a constant encoded color.

use jumpflood_core::color::encode_color;
use jumpflood_core::stroke::{StrokeSegment, StrokeState};
use jumpflood_core::{SeedTexel, Vec2, Vec3};

use crate::error::RenderError;
use crate::program::{KernelProgram, ProgramKind};
use crate::target::RenderTarget;
use crate::viewport::Viewport;

fn edge(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Fills NDC triangles into `target`. Every covered texel becomes a seed at
/// its own texture coordinate carrying `color`. Returns the number of texels
/// written.
pub fn fill_triangles(
    program: &KernelProgram,
    target: &mut RenderTarget,
    triangles: &[[Vec2; 3]],
    color: Vec3,
) -> Result<usize, RenderError> {
    program.expect_kind(ProgramKind::StrokeFill)?;

    let viewport = Viewport::new(target.width(), target.height());
    let encoded = encode_color(color);
    let mut written = 0;

    for tri in triangles {
        let [a, b, c] = (*tri).map(|v| viewport.ndc_to_pixel(v));
        let area = edge(a, b, c);
        if area == 0.0 || !area.is_finite() {
            continue;
        }

        let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as u32;
        let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as u32;
        let max_x = (a.x.max(b.x).max(c.x).ceil() as i64).clamp(0, target.width() as i64) as u32;
        let max_y = (a.y.max(b.y).max(c.y).ceil() as i64).clamp(0, target.height() as i64) as u32;

        for y in min_y..max_y {
            for x in min_x..max_x {
                let centre = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(b, c, centre) * area.signum();
                let w1 = edge(c, a, centre) * area.signum();
                let w2 = edge(a, b, centre) * area.signum();
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    let seed = SeedTexel::seed(viewport.texcoord(x, y), encoded);
                    target.set_texel(x, y, seed.to_channels());
                    written += 1;
                }
            }
        }
    }
    Ok(written)
}

/// Turns pointer drags into seed ribbons.
#[derive(Debug, Clone)]
pub struct SeedRasterizer {
    brush_size_px: f32,
    stroke: StrokeState,
}

impl SeedRasterizer {
    pub fn new(brush_size_px: f32, viewport: Viewport) -> Self {
        Self {
            brush_size_px,
            stroke: StrokeState::new(brush_size_px, viewport.width, viewport.height),
        }
    }

    /// Adapts the brush to a new surface size. Any stroke in progress ends.
    pub fn resize(&mut self, viewport: Viewport) {
        self.stroke
            .resize(self.brush_size_px, viewport.width, viewport.height);
    }

    pub fn begin(&mut self, color: Vec3) {
        self.stroke.begin(color);
    }

    pub fn end(&mut self) {
        self.stroke.end();
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.is_active()
    }

    /// Extends the active stroke to `point` (NDC) and fills the new segment
    /// into `target`.
    pub fn extend(
        &mut self,
        program: &KernelProgram,
        target: &mut RenderTarget,
        point: Vec2,
    ) -> Result<Option<StrokeSegment>, RenderError> {
        let Some(segment) = self.stroke.extend(point) else {
            return Ok(None);
        };
        fill_triangles(program, target, &segment.triangles(), self.stroke.color())?;
        Ok(Some(segment))
    }
}
