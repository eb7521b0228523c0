use std::ops::{Add, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A 2D vector used for pointer positions, NDC geometry and seed coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Both components set to `v`.
    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }

    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn distance_to(self, other: Vec2) -> f32 {
        (self - other).length()
    }

    /// Divides by the length. A zero vector yields non-finite components;
    /// callers must guard against that.
    pub fn normalize(self) -> Self {
        self / self.length()
    }

    /// Clockwise perpendicular `(y, -x)`.
    pub fn perpendicular(self) -> Self {
        Self::new(self.y, -self.x)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A 3D vector, used here mainly as an RGB triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalize(self) -> Self {
        self / self.length()
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

// Componentwise and scalar arithmetic for both vector types.
macro_rules! impl_vec_ops {
    ($ty:ident { $($field:ident),+ }) => {
        impl Add for $ty {
            type Output = $ty;
            fn add(self, rhs: $ty) -> $ty {
                $ty { $($field: self.$field + rhs.$field),+ }
            }
        }

        impl Sub for $ty {
            type Output = $ty;
            fn sub(self, rhs: $ty) -> $ty {
                $ty { $($field: self.$field - rhs.$field),+ }
            }
        }

        impl Mul for $ty {
            type Output = $ty;
            fn mul(self, rhs: $ty) -> $ty {
                $ty { $($field: self.$field * rhs.$field),+ }
            }
        }

        impl Div for $ty {
            type Output = $ty;
            fn div(self, rhs: $ty) -> $ty {
                $ty { $($field: self.$field / rhs.$field),+ }
            }
        }

        impl Add<f32> for $ty {
            type Output = $ty;
            fn add(self, rhs: f32) -> $ty {
                $ty { $($field: self.$field + rhs),+ }
            }
        }

        impl Sub<f32> for $ty {
            type Output = $ty;
            fn sub(self, rhs: f32) -> $ty {
                $ty { $($field: self.$field - rhs),+ }
            }
        }

        impl Mul<f32> for $ty {
            type Output = $ty;
            fn mul(self, rhs: f32) -> $ty {
                $ty { $($field: self.$field * rhs),+ }
            }
        }

        impl Div<f32> for $ty {
            type Output = $ty;
            fn div(self, rhs: f32) -> $ty {
                $ty { $($field: self.$field / rhs),+ }
            }
        }

        impl Neg for $ty {
            type Output = $ty;
            fn neg(self) -> $ty {
                $ty { $($field: -self.$field),+ }
            }
        }
    };
}

impl_vec_ops!(Vec2 { x, y });
impl_vec_ops!(Vec3 { x, y, z });
