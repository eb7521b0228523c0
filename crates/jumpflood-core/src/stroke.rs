//! Ribbon geometry for pointer strokes.
//!
//! A drag is turned into a chain of quads in normalized device coordinates.
//! Consecutive quads share the two vertices at the joint, so the ribbon has
//! no gaps regardless of how fast the pointer moves.

use serde::{Deserialize, Serialize};

use crate::math::{Vec2, Vec3};

/// Movements shorter than this (in NDC units) keep the minimal tangent
/// instead of taking the movement direction.
pub const MIN_BLEND_LENGTH: f32 = 0.01;

/// One piece of a stroke: the quad spanning `p0 ± normal0` to `p1 ± normal1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeSegment {
    pub p0: Vec2,
    pub p1: Vec2,
    pub normal0: Vec2,
    pub normal1: Vec2,
    pub half_thickness: Vec2,
}

impl StrokeSegment {
    /// Two triangles (six vertices) covering the segment.
    pub fn quad(&self) -> [Vec2; 6] {
        let bl = self.p0 - self.normal0;
        let br = self.p0 + self.normal0;
        let tl = self.p1 - self.normal1;
        let tr = self.p1 + self.normal1;
        [bl, tl, br, br, tl, tr]
    }

    /// The two triangles of [`quad`](Self::quad) as vertex triples.
    pub fn triangles(&self) -> [[Vec2; 3]; 2] {
        let q = self.quad();
        [[q[0], q[1], q[2]], [q[3], q[4], q[5]]]
    }
}

/// Geometry state of the stroke currently being drawn.
#[derive(Debug, Clone)]
pub struct StrokeState {
    half_thickness: Vec2,
    color: Vec3,
    active: bool,
    /// Last committed joint: position and normal.
    previous: Option<(Vec2, Vec2)>,
}

impl StrokeState {
    /// `brush_size_px` is the full brush width in surface pixels.
    pub fn new(brush_size_px: f32, width: u32, height: u32) -> Self {
        Self {
            half_thickness: Self::half_thickness_for(brush_size_px, width, height),
            color: Vec3::ZERO,
            active: false,
            previous: None,
        }
    }

    fn half_thickness_for(brush_size_px: f32, width: u32, height: u32) -> Vec2 {
        let resolution = Vec2::new(width.max(1) as f32, height.max(1) as f32);
        Vec2::splat(brush_size_px) / resolution
    }

    /// Recomputes the brush extent for a new surface size and drops any
    /// stroke in progress.
    pub fn resize(&mut self, brush_size_px: f32, width: u32, height: u32) {
        self.half_thickness = Self::half_thickness_for(brush_size_px, width, height);
        self.end();
    }

    pub fn begin(&mut self, color: Vec3) {
        self.color = color;
        self.active = true;
        self.previous = None;
    }

    pub fn end(&mut self) {
        self.active = false;
        self.previous = None;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn half_thickness(&self) -> Vec2 {
        self.half_thickness
    }

    /// Extends the stroke to `p` (NDC) and returns the segment to fill.
    ///
    /// Returns `None` when no stroke is active.
    pub fn extend(&mut self, p: Vec2) -> Option<StrokeSegment> {
        if !self.active {
            return None;
        }

        let b = self.half_thickness;
        let mut p = p;
        let mut t = Vec2::new(b.x, 0.0);
        let mut commit = false;

        let (mut p0, mut n0) = match self.previous {
            Some((prev_p, prev_n)) => {
                let real_t = p - prev_p;
                let len = real_t.length();
                if len > t.length() {
                    t = real_t;
                    commit = true;
                } else if len > MIN_BLEND_LENGTH {
                    t = t * real_t.normalize();
                }
                (prev_p, prev_n)
            }
            None => {
                commit = true;
                (p, Vec2::ZERO)
            }
        };

        let mut n = t.perpendicular().normalize() * b;
        // A vertical short move zeroes the blended tangent.
        if !n.is_finite() {
            n = Vec2::new(0.0, -b.x).normalize() * b;
        }

        if self.previous.is_none() {
            // Starting cap: a short piece centred on the first sample.
            n0 = n;
            p0 = p - t;
            p = p + t;
        }

        if commit {
            self.previous = Some((p, n));
        }

        Some(StrokeSegment {
            p0,
            p1: p,
            normal0: n0,
            normal1: n,
            half_thickness: b,
        })
    }
}
