//! Proximity tests and pursuit steps for square sprites

use glam::Vec2;

/// True when `a` and `b` are strictly closer than `radius`
#[inline]
pub fn within(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance(b) < radius
}

/// One discrete pursuit step of length `speed` from `pos` toward `target`
///
/// An entity already on the target stays put.
#[inline]
pub fn pursue(pos: Vec2, target: Vec2, speed: f32) -> Vec2 {
    pos + (target - pos).normalize_or_zero() * speed
}
