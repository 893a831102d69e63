//! Game session state and core types
//!
//! One `GameSession` owns everything that changes during play: phase,
//! score, enemies, timers, and the RNG. There is no global state.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::Difficulty;
use super::feedback::FeedbackTier;
use super::scene::{EntityHandle, EntityKind, Scene};
use super::schedule::{TaskId, TaskKind, Tasks};
use crate::leaderboard::Placement;
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for a start
    Intro,
    /// Active gameplay
    Playing,
    /// Frozen, pause overlay shown
    Paused,
    /// 3-2-1 before play resumes
    Countdown,
    /// Run ended
    GameOver,
    /// Leaderboard screen
    Leaderboard,
}

/// Screen edge an enemy enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnEdge {
    Top,
    Bottom,
    Left,
    Right,
}

impl SpawnEdge {
    pub const ALL: [SpawnEdge; 4] = [
        SpawnEdge::Top,
        SpawnEdge::Bottom,
        SpawnEdge::Left,
        SpawnEdge::Right,
    ];
}

/// An enemy converging on the protected target
#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub handle: EntityHandle,
    pub pos: Vec2,
}

/// Availability of the hand-tracking feed
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MotionStatus {
    /// No landmark received yet
    #[default]
    Waiting,
    /// Landmarks are arriving
    Tracking,
    /// Camera or tracker failed; the player sprite cannot move
    Unavailable { reason: String },
}

/// Everything the game-over screen shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameOverSummary {
    pub score: u64,
    pub username: Option<String>,
    pub feedback: FeedbackTier,
    /// Leaderboard outcome, `None` without a username or when the commit failed
    pub placement: Option<Placement>,
}

impl GameOverSummary {
    /// Rank to congratulate the player with
    pub fn rank(&self) -> Option<usize> {
        self.placement.and_then(|p| p.rank)
    }
}

/// Notifications for the presentation layer, drained once per frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    ScoreChanged { score: u64 },
    EnemySpawned { handle: EntityHandle, edge: SpawnEdge },
    EnemyCaptured { handle: EntityHandle },
    /// Countdown value to display
    Countdown { remaining: u32 },
    /// Host should call `on_frame` with this task every animation frame
    ScheduleFrame { task: TaskId },
    /// Host should call `on_countdown` with this task every `interval_ms`
    ScheduleCountdown { task: TaskId, interval_ms: f64 },
    /// Host should drop the callback registered for this task
    CancelTask { task: TaskId },
    /// Start feeding hand landmarks
    MotionEngaged,
    /// Stop feeding hand landmarks
    MotionSuspended,
    MotionStatusChanged { status: MotionStatus },
    GameOver {
        summary: GameOverSummary,
        rank: Option<usize>,
    },
}

/// A single game session
#[derive(Debug, Clone)]
pub struct GameSession {
    pub(super) tuning: Tuning,
    pub(super) phase: GamePhase,
    pub(super) score: u64,
    pub(super) username: Option<String>,
    pub(super) difficulty: Difficulty,
    pub(super) last_spawn_ms: f64,
    pub(super) started_at_ms: f64,
    /// Live enemies in spawn order
    pub(super) enemies: Vec<Enemy>,
    pub(super) player: Option<EntityHandle>,
    pub(super) target: Option<EntityHandle>,
    pub(super) countdown_remaining: u32,
    pub(super) motion: MotionStatus,
    pub(super) tasks: Tasks,
    pub(super) rng: Pcg32,
    pub(super) events: Vec<GameEvent>,
    pub(super) summary: Option<GameOverSummary>,
}

impl GameSession {
    /// Create a session on the intro screen
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let difficulty = tuning.difficulty.base();
        Self {
            tuning,
            phase: GamePhase::Intro,
            score: 0,
            username: None,
            difficulty,
            last_spawn_ms: 0.0,
            started_at_ms: 0.0,
            enemies: Vec::new(),
            player: None,
            target: None,
            countdown_remaining: 0,
            motion: MotionStatus::default(),
            tasks: Tasks::new(),
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            summary: None,
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn last_spawn_ms(&self) -> f64 {
        self.last_spawn_ms
    }

    /// Milliseconds since the current run started
    pub fn elapsed_ms(&self, now_ms: f64) -> f64 {
        (now_ms - self.started_at_ms).max(0.0)
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn player_handle(&self) -> Option<EntityHandle> {
        self.player
    }

    pub fn target_handle(&self) -> Option<EntityHandle> {
        self.target
    }

    /// Countdown value while in `Countdown`
    pub fn countdown_remaining(&self) -> u32 {
        self.countdown_remaining
    }

    pub fn motion_status(&self) -> &MotionStatus {
        &self.motion
    }

    /// Summary of the last finished run
    pub fn summary(&self) -> Option<&GameOverSummary> {
        self.summary.as_ref()
    }

    pub fn current_task(&self, kind: TaskKind) -> Option<TaskId> {
        self.tasks.current(kind)
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Landmarks only matter while playing
    pub fn accepts_motion(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Record a change of the hand-tracking feed
    pub fn set_motion_status(&mut self, status: MotionStatus) {
        if self.motion == status {
            return;
        }
        match &status {
            MotionStatus::Unavailable { reason } => {
                log::warn!("Motion input unavailable: {reason}");
            }
            other => log::info!("Motion input: {other:?}"),
        }
        self.motion = status.clone();
        self.events.push(GameEvent::MotionStatusChanged { status });
    }

    pub(super) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub(super) fn set_phase(&mut self, to: GamePhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        log::info!("Phase {from:?} -> {to:?}");
        self.phase = to;
        self.emit(GameEvent::PhaseChanged { from, to });
    }

    pub(super) fn schedule(&mut self, kind: TaskKind) -> TaskId {
        let (task, replaced) = self.tasks.schedule(kind);
        if let Some(old) = replaced {
            self.emit(GameEvent::CancelTask { task: old });
        }
        match kind {
            TaskKind::Frame => self.emit(GameEvent::ScheduleFrame { task }),
            TaskKind::Countdown => self.emit(GameEvent::ScheduleCountdown {
                task,
                interval_ms: self.tuning.countdown_step_ms,
            }),
        }
        task
    }

    pub(super) fn cancel(&mut self, kind: TaskKind) {
        if let Some(task) = self.tasks.cancel(kind) {
            self.emit(GameEvent::CancelTask { task });
        }
    }

    /// Remove every enemy from the arena and the scene
    pub(super) fn clear_enemies(&mut self, scene: &mut impl Scene) {
        for enemy in self.enemies.drain(..) {
            scene.remove_entity(enemy.handle);
        }
    }

    /// Create the player and target sprites once, then reset their positions
    pub(super) fn place_actors(&mut self, scene: &mut impl Scene) {
        let player = *self
            .player
            .get_or_insert_with(|| scene.add_entity(EntityKind::Player));
        let target = *self
            .target
            .get_or_insert_with(|| scene.add_entity(EntityKind::Target));
        scene.set_entity_position(player, self.tuning.player_start);
        scene.set_entity_position(target, self.tuning.target_start);
    }

    pub(super) fn set_score(&mut self, score: u64) {
        self.score = score;
        self.difficulty = self.tuning.difficulty.at(score);
        self.emit(GameEvent::ScoreChanged { score });
    }
}
