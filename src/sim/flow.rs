//! Phase transitions driven by player actions and timers
//!
//! ```text
//! Intro --start--> Playing --pause--> Paused --resume--> Countdown --0--> Playing
//! Playing --enemy reaches target--> GameOver
//! any --restart--> Playing            (not Playing) --menu--> Intro
//! Intro --leaderboard--> Leaderboard --back--> Intro
//! ```

use super::scene::Scene;
use super::schedule::{Callback, TaskId, TaskKind};
use super::state::{GameEvent, GamePhase, GameSession};
use crate::error::SessionError;
use crate::input::HandTracker;

/// Outcome of a countdown timer step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    /// Still counting; value to display
    Remaining(u32),
    /// Countdown finished and play resumed
    Resumed,
}

impl GameSession {
    fn reject(&self, action: &'static str) -> SessionError {
        log::debug!("Rejected {action} in phase {:?}", self.phase);
        SessionError::InvalidTransition {
            from: self.phase,
            action,
        }
    }

    /// Start a run from the intro screen.
    ///
    /// `username` is trimmed; blank names play anonymously and skip the
    /// leaderboard.
    pub fn start(
        &mut self,
        username: Option<&str>,
        now_ms: f64,
        scene: &mut impl Scene,
    ) -> Result<(), SessionError> {
        if self.phase != GamePhase::Intro {
            return Err(self.reject("start"));
        }
        self.username = username
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        log::info!(
            "Starting game for {}",
            self.username.as_deref().unwrap_or("anonymous player")
        );
        self.begin_run(now_ms, scene);
        Ok(())
    }

    /// Start over with the same username; valid from any phase
    pub fn restart(&mut self, now_ms: f64, scene: &mut impl Scene) {
        log::info!("Restarting game");
        self.begin_run(now_ms, scene);
    }

    fn begin_run(&mut self, now_ms: f64, scene: &mut impl Scene) {
        self.cancel(TaskKind::Countdown);
        self.clear_enemies(scene);
        self.place_actors(scene);
        self.set_score(0);
        self.last_spawn_ms = now_ms;
        self.started_at_ms = now_ms;
        self.countdown_remaining = 0;
        self.summary = None;
        self.enter_playing();
    }

    fn enter_playing(&mut self) {
        self.set_phase(GamePhase::Playing);
        self.schedule(TaskKind::Frame);
        self.emit(GameEvent::MotionEngaged);
    }

    /// Freeze play
    pub fn pause(&mut self) -> Result<(), SessionError> {
        if self.phase != GamePhase::Playing {
            return Err(self.reject("pause"));
        }
        self.cancel(TaskKind::Frame);
        self.set_phase(GamePhase::Paused);
        self.emit(GameEvent::MotionSuspended);
        Ok(())
    }

    /// Leave the pause overlay through the 3-2-1 countdown
    pub fn resume(&mut self) -> Result<(), SessionError> {
        if self.phase != GamePhase::Paused {
            return Err(self.reject("resume"));
        }
        self.countdown_remaining = self.tuning.countdown_seconds;
        if self.countdown_remaining == 0 {
            self.enter_playing();
            return Ok(());
        }
        self.set_phase(GamePhase::Countdown);
        self.emit(GameEvent::Countdown {
            remaining: self.countdown_remaining,
        });
        self.schedule(TaskKind::Countdown);
        Ok(())
    }

    /// Countdown timer callback
    pub fn on_countdown(&mut self, task: TaskId) -> Callback<CountdownStep> {
        if self.phase != GamePhase::Countdown || !self.tasks.is_current(TaskKind::Countdown, task) {
            log::debug!("Ignoring stale countdown task {}", task.raw());
            return Callback::Stale;
        }

        self.countdown_remaining = self.countdown_remaining.saturating_sub(1);
        if self.countdown_remaining > 0 {
            self.emit(GameEvent::Countdown {
                remaining: self.countdown_remaining,
            });
            return Callback::Ran(CountdownStep::Remaining(self.countdown_remaining));
        }

        self.cancel(TaskKind::Countdown);
        self.enter_playing();
        Callback::Ran(CountdownStep::Resumed)
    }

    /// Return to the intro screen, discarding the run
    pub fn menu(&mut self, scene: &mut impl Scene) -> Result<(), SessionError> {
        if self.phase == GamePhase::Playing {
            return Err(self.reject("return to menu"));
        }
        let was_active = matches!(self.phase, GamePhase::Paused | GamePhase::Countdown);
        self.cancel(TaskKind::Frame);
        self.cancel(TaskKind::Countdown);
        self.clear_enemies(scene);
        self.set_score(0);
        self.username = None;
        self.countdown_remaining = 0;
        self.summary = None;
        self.set_phase(GamePhase::Intro);
        if was_active {
            self.emit(GameEvent::MotionSuspended);
        }
        Ok(())
    }

    /// Open the leaderboard screen
    pub fn show_leaderboard(&mut self) -> Result<(), SessionError> {
        if self.phase != GamePhase::Intro {
            return Err(self.reject("show leaderboard"));
        }
        self.set_phase(GamePhase::Leaderboard);
        Ok(())
    }

    /// Leave the leaderboard screen
    pub fn back(&mut self) -> Result<(), SessionError> {
        if self.phase != GamePhase::Leaderboard {
            return Err(self.reject("go back"));
        }
        self.set_phase(GamePhase::Intro);
        Ok(())
    }

    /// Move the player sprite toward the tracked hand.
    ///
    /// Landmarks only steer while playing. Returns whether the sprite moved.
    pub fn steer_player(&self, tracker: &HandTracker, scene: &mut impl Scene) -> bool {
        if !self.accepts_motion() {
            return false;
        }
        let Some(player) = self.player else {
            return false;
        };
        let current = scene
            .entity_position(player)
            .unwrap_or(self.tuning.player_start);
        let Some(next) = tracker.follow(current, scene.world_bounds(), self.tuning.follow_smoothing)
        else {
            return false;
        };
        scene.set_entity_position(player, next);
        true
    }
}
