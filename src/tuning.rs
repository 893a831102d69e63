//! Game balance tuning
//!
//! Persisted separately from the leaderboard. Missing fields fall back to
//! the shipped defaults so older saved tunings keep loading.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::persistence::Storage;
use crate::sim::difficulty::DifficultyCurve;

/// Gameplay tuning values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Score -> (speed, spawn interval) curve
    pub difficulty: DifficultyCurve,

    // === Entities ===
    pub player_size: f32,
    pub target_size: f32,
    pub enemy_size: f32,
    /// Scale applied to the sum of half-sizes for collision tests
    pub hitbox_factor: f32,
    /// Spawn distance outside the visible bounds, in enemy sizes
    pub spawn_offset_factor: f32,
    pub player_start: Vec2,
    pub target_start: Vec2,

    // === Scoring ===
    pub capture_reward: u64,

    // === Flow ===
    pub countdown_seconds: u32,
    pub countdown_step_ms: f64,

    // === Presentation ===
    /// Lerp factor for the player sprite following the hand
    pub follow_smoothing: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            difficulty: DifficultyCurve::default(),

            player_size: PLAYER_SIZE,
            target_size: TARGET_SIZE,
            enemy_size: ENEMY_SIZE,
            hitbox_factor: HITBOX_FACTOR,
            spawn_offset_factor: SPAWN_OFFSET_FACTOR,
            player_start: Vec2::new(0.0, -2.0),
            target_start: Vec2::ZERO,

            capture_reward: CAPTURE_REWARD,

            countdown_seconds: COUNTDOWN_SECONDS,
            countdown_step_ms: COUNTDOWN_STEP_MS,

            follow_smoothing: FOLLOW_SMOOTHING,
        }
    }
}

impl Tuning {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "princess_guard_tuning";

    /// Distance at which an enemy reaches the protected target
    pub fn loss_radius(&self) -> f32 {
        crate::hitbox_radius(self.target_size, self.enemy_size, self.hitbox_factor)
    }

    /// Distance at which the player captures an enemy
    pub fn capture_radius(&self) -> f32 {
        crate::hitbox_radius(self.player_size, self.enemy_size, self.hitbox_factor)
    }

    /// Parse from JSON, `None` when malformed
    pub fn from_json(json: &str) -> Option<Self> {
        serde_json::from_str(json).ok()
    }

    /// Load tuning from storage, falling back to defaults
    pub fn load(storage: &impl Storage) -> Self {
        match storage.read_raw(Self::STORAGE_KEY) {
            Ok(Some(json)) => match Self::from_json(&json) {
                Some(tuning) => {
                    log::info!("Loaded tuning from storage");
                    return tuning;
                }
                None => log::warn!("Stored tuning is malformed, ignoring"),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Tuning read failed: {e}"),
        }

        log::info!("Using default tuning");
        Self::default()
    }

    /// Save tuning to storage
    pub fn save(&self, storage: &mut impl Storage) {
        match serde_json::to_string(self) {
            Ok(json) => match storage.write_raw(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("Tuning saved"),
                Err(e) => log::warn!("Tuning save failed: {e}"),
            },
            Err(e) => log::warn!("Tuning encode failed: {e}"),
        }
    }
}
