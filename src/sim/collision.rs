//! Collision detection between falling bubbles and the player
//!
//! Bubbles are circles and the player is an axis-aligned square, so the only
//! test the game needs is circle vs rectangle.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A circle in canvas space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Axis-aligned rectangle, `pos` is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Square of side `size` centred on `center`
    pub fn centered(center: Vec2, size: f32) -> Self {
        let half = Vec2::splat(size * 0.5);
        Self {
            pos: center - half,
            size: Vec2::splat(size),
        }
    }

    pub fn max(&self) -> Vec2 {
        self.pos + self.size
    }

    /// Closest point of the rectangle to `p`
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.pos, self.max())
    }
}

/// True if the circle overlaps the rectangle. Touching edges do not count.
pub fn circle_intersects_rect(circle: Circle, rect: Rect) -> bool {
    let d = circle.center - rect.closest_point(circle.center);
    d.length_squared() < circle.radius * circle.radius
}

/// Distance from the circle's edge to the rectangle.
///
/// Zero when touching, negative when overlapping (clamped at `-radius` once
/// the centre is inside the rectangle).
pub fn rect_gap(circle: Circle, rect: Rect) -> f32 {
    let d = circle.center - rect.closest_point(circle.center);
    d.length() - circle.radius
}
