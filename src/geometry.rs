// Shared shape tests and easing curves.
// Boxes are used by the map resolver and the entity pass, spheres only by the
// entity pass for fast small objects.

use bevy::prelude::*;

/// Axis-aligned box, `min <= max` on every axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min: min.min(max), max: min.max(max) }
    }

    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self { min: center - half, max: center + half }
    }

    /// Touching faces count as overlap.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// Squared distance against the combined radius, no square root.
pub fn spheres_overlap(a: Vec3, radius_a: f32, b: Vec3, radius_b: f32) -> bool {
    let reach = radius_a + radius_b;
    a.distance_squared(b) <= reach * reach
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Smootherstep on `[0, 1]`.
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

pub fn ease_in_out_lerp(a: f32, b: f32, t: f32) -> f32 {
    lerp(a, b, ease_in_out(t))
}

pub fn ease_out(a: f32, b: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let inv = 1.0 - t;
    lerp(a, b, 1.0 - inv * inv * inv)
}

pub fn ease_in(a: f32, b: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    lerp(a, b, t * t * t)
}
