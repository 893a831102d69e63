//! Hand-tracking pointer
//!
//! The tracker reports landmarks in camera image coordinates ([0, 1] on
//! each axis, origin top-left, unmirrored). The player sees a mirrored
//! selfie view, so x is flipped before mapping to the [-1, 1] pointer.

use glam::Vec2;

/// Latest-value-wins pointer fed by hand landmarks
#[derive(Debug, Clone, Default)]
pub struct HandTracker {
    pointer: Option<Vec2>,
}

impl HandTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a landmark in image coordinates, replacing any earlier one
    pub fn on_landmark(&mut self, x: f32, y: f32) {
        let pointer = Vec2::new((1.0 - x) * 2.0 - 1.0, -(y * 2.0) + 1.0);
        self.on_pointer(pointer);
    }

    /// Record an already normalized pointer position
    pub fn on_pointer(&mut self, pointer: Vec2) {
        if pointer.is_finite() {
            self.pointer = Some(pointer.clamp(Vec2::NEG_ONE, Vec2::ONE));
        }
    }

    /// Forget the last position (hand left the frame, camera stopped)
    pub fn clear(&mut self) {
        self.pointer = None;
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    /// Pointer projected onto the gameplay plane
    pub fn world_target(&self, bounds: Vec2) -> Option<Vec2> {
        self.pointer.map(|p| p * bounds)
    }

    /// Next sprite position, easing `smoothing` of the way toward the hand
    pub fn follow(&self, current: Vec2, bounds: Vec2, smoothing: f32) -> Option<Vec2> {
        self.world_target(bounds)
            .map(|target| current.lerp(target, smoothing.clamp(0.0, 1.0)))
    }
}
