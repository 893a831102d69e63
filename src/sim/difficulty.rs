//! Score-driven difficulty ramp
//!
//! Enemies get faster every `speed_step` points and spawn more often every
//! `spawn_step` points, both clamped.

use serde::{Deserialize, Serialize};

/// Difficulty tier derived from the current score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Difficulty {
    /// Enemy step length per tick (world units)
    pub speed: f32,
    /// Minimum time between spawns
    pub spawn_interval_ms: f64,
}

/// Difficulty curve parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyCurve {
    pub base_speed: f32,
    pub max_speed: f32,
    pub speed_step: u64,
    pub speed_increment: f32,
    pub base_interval_ms: u64,
    pub min_interval_ms: u64,
    pub spawn_step: u64,
    pub interval_decrement_ms: u64,
}

impl Default for DifficultyCurve {
    fn default() -> Self {
        Self {
            base_speed: 0.03,
            max_speed: 0.15,
            speed_step: 100,
            speed_increment: 0.008,
            base_interval_ms: 2000,
            min_interval_ms: 500,
            spawn_step: 80,
            interval_decrement_ms: 100,
        }
    }
}

impl DifficultyCurve {
    /// Evaluate the curve at `score`
    pub fn at(&self, score: u64) -> Difficulty {
        let speed_tiers = score.checked_div(self.speed_step).unwrap_or(0);
        let speed = (self.base_speed + speed_tiers as f32 * self.speed_increment).min(self.max_speed);

        let spawn_tiers = score.checked_div(self.spawn_step).unwrap_or(0);
        let interval = self
            .base_interval_ms
            .saturating_sub(spawn_tiers.saturating_mul(self.interval_decrement_ms))
            .max(self.min_interval_ms);

        Difficulty {
            speed,
            spawn_interval_ms: interval as f64,
        }
    }

    /// Difficulty of a fresh session
    pub fn base(&self) -> Difficulty {
        self.at(0)
    }
}

/// Difficulty for `score` under the default curve
pub fn difficulty_for(score: u64) -> Difficulty {
    DifficultyCurve::default().at(score)
}
