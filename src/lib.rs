//! Princess Guard - a hand-tracked arcade minigame
//!
//! Core modules:
//! - `sim`: Game session state machine, difficulty curve, enemy pursuit
//! - `leaderboard`: Top-10 best-score-per-name leaderboard
//! - `persistence`: Raw key/value storage backends (LocalStorage on web)
//! - `input`: Hand-tracking pointer mapping and follow smoothing
//! - `tuning`: Data-driven game balance
//! - `platform`: Browser bindings (wasm32 only)

pub mod error;
pub mod input;
pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod sim;
pub mod tuning;

pub use error::{LeaderboardError, SessionError, StorageError};
pub use leaderboard::{Leaderboard, LeaderboardEntry, LeaderboardStore};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Entity edge lengths in world units
    pub const PLAYER_SIZE: f32 = 1.5;
    pub const TARGET_SIZE: f32 = 2.0;
    pub const ENEMY_SIZE: f32 = 1.5;

    /// Collision radius scale relative to the sum of half-sizes (generous hitbox)
    pub const HITBOX_FACTOR: f32 = 0.7;

    /// Points awarded per captured enemy
    pub const CAPTURE_REWARD: u64 = 50;

    /// Resume countdown (3-2-1), one step per second
    pub const COUNTDOWN_SECONDS: u32 = 3;
    pub const COUNTDOWN_STEP_MS: f64 = 1000.0;

    /// Enemies spawn this many enemy sizes outside the visible bounds
    pub const SPAWN_OFFSET_FACTOR: f32 = 1.5;

    /// Perspective camera the presentation layer renders with
    pub const CAMERA_DISTANCE: f32 = 5.0;
    pub const CAMERA_FOV_DEGREES: f32 = 75.0;

    /// Lerp factor the player sprite uses to follow the tracked hand
    pub const FOLLOW_SMOOTHING: f32 = 0.3;
}

/// Distance below which two square sprites of the given sizes collide
#[inline]
pub fn hitbox_radius(size_a: f32, size_b: f32, factor: f32) -> f32 {
    (size_a / 2.0 + size_b / 2.0) * factor
}

/// Visible half-width/half-height of the z = 0 plane for a viewport aspect ratio
pub fn visible_half_extents(aspect: f32) -> Vec2 {
    use consts::{CAMERA_DISTANCE, CAMERA_FOV_DEGREES};
    let half_height = CAMERA_DISTANCE * (CAMERA_FOV_DEGREES.to_radians() / 2.0).tan();
    Vec2::new(half_height * aspect, half_height)
}
