//! Per-frame simulation step
//!
//! Spawns enemies on a score-dependent interval, moves them toward the
//! protected target, and resolves captures and the loss condition.

use glam::Vec2;
use rand::Rng;

use super::collision::{pursue, within};
use super::feedback::FeedbackTier;
use super::scene::{EntityHandle, EntityKind, Scene};
use super::schedule::{Callback, TaskId, TaskKind};
use super::state::{Enemy, GameEvent, GameOverSummary, GamePhase, GameSession, SpawnEdge};
use crate::leaderboard::LeaderboardStore;
use crate::persistence::Storage;

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing; nothing changed
    Idle,
    /// Play continues
    Running,
    /// An enemy reached the target this tick
    GameOver,
}

/// Advance the session by one frame at wall-clock time `now_ms`
pub fn tick<S: Storage>(
    session: &mut GameSession,
    now_ms: f64,
    scene: &mut impl Scene,
    store: &mut LeaderboardStore<S>,
) -> TickOutcome {
    if session.phase != GamePhase::Playing {
        return TickOutcome::Idle;
    }

    if now_ms - session.last_spawn_ms > session.difficulty.spawn_interval_ms {
        session.spawn_enemy(scene);
        session.last_spawn_ms = now_ms;
    }

    let target_pos = session
        .target
        .and_then(|h| scene.entity_position(h))
        .unwrap_or(session.tuning.target_start);
    let player_pos = session
        .player
        .and_then(|h| scene.entity_position(h))
        .unwrap_or(session.tuning.player_start);
    let loss_radius = session.tuning.loss_radius();
    let capture_radius = session.tuning.capture_radius();
    let speed = session.difficulty.speed;

    // Newest enemies first
    let mut i = session.enemies.len();
    while i > 0 {
        i -= 1;
        let enemy = &mut session.enemies[i];
        enemy.pos = pursue(enemy.pos, target_pos, speed);
        let pos = enemy.pos;
        scene.set_entity_position(enemy.handle, pos);

        if within(pos, target_pos, loss_radius) {
            let breach = session.enemies.remove(i);
            scene.remove_entity(breach.handle);
            session.finish(store);
            return TickOutcome::GameOver;
        }

        if within(player_pos, pos, capture_radius) {
            let captured = session.enemies.remove(i);
            scene.remove_entity(captured.handle);
            let score = session.score + session.tuning.capture_reward;
            log::debug!("Captured enemy {:?}, score {}", captured.handle, score);
            session.emit(GameEvent::EnemyCaptured {
                handle: captured.handle,
            });
            session.set_score(score);
        }
    }

    TickOutcome::Running
}

/// Half extents usable for sampling; a degenerate viewport collapses to the origin
fn spawn_bounds(bounds: Vec2) -> Vec2 {
    if bounds.is_finite() {
        bounds.max(Vec2::ZERO)
    } else {
        log::warn!("Ignoring non-finite world bounds {bounds}");
        Vec2::ZERO
    }
}

impl GameSession {
    /// Animation frame callback; stale frame tasks do nothing
    pub fn on_frame<S: Storage>(
        &mut self,
        task: TaskId,
        now_ms: f64,
        scene: &mut impl Scene,
        store: &mut LeaderboardStore<S>,
    ) -> Callback<TickOutcome> {
        if !self.tasks.is_current(TaskKind::Frame, task) {
            log::debug!("Ignoring stale frame task {}", task.raw());
            return Callback::Stale;
        }
        Callback::Ran(tick(self, now_ms, scene, store))
    }

    /// Spawn an enemy just outside a random screen edge
    pub fn spawn_enemy(&mut self, scene: &mut impl Scene) -> EntityHandle {
        let bounds = spawn_bounds(scene.world_bounds());
        let offset = self.tuning.enemy_size * self.tuning.spawn_offset_factor;
        let edge = SpawnEdge::ALL[self.rng.random_range(0..SpawnEdge::ALL.len())];
        let along_x = self.rng.random_range(-bounds.x..=bounds.x);
        let along_y = self.rng.random_range(-bounds.y..=bounds.y);
        let pos = match edge {
            SpawnEdge::Top => Vec2::new(along_x, bounds.y + offset),
            SpawnEdge::Bottom => Vec2::new(along_x, -bounds.y - offset),
            SpawnEdge::Left => Vec2::new(-bounds.x - offset, along_y),
            SpawnEdge::Right => Vec2::new(bounds.x + offset, along_y),
        };
        let handle = self.spawn_enemy_at(pos, scene);
        self.emit(GameEvent::EnemySpawned { handle, edge });
        handle
    }

    /// Place an enemy at an explicit position
    pub fn spawn_enemy_at(&mut self, pos: Vec2, scene: &mut impl Scene) -> EntityHandle {
        let handle = scene.add_entity(EntityKind::Enemy);
        scene.set_entity_position(handle, pos);
        self.enemies.push(Enemy { handle, pos });
        log::debug!("Spawned enemy {handle:?} at {pos}");
        handle
    }

    /// End the run and commit the score for named players
    fn finish<S: Storage>(&mut self, store: &mut LeaderboardStore<S>) {
        self.cancel(TaskKind::Frame);
        self.cancel(TaskKind::Countdown);
        self.set_phase(GamePhase::GameOver);
        self.emit(GameEvent::MotionSuspended);

        let placement = self.username.as_deref().and_then(|name| {
            let score = i64::try_from(self.score).unwrap_or(i64::MAX);
            match store.upsert(name, score) {
                Ok(placement) => Some(placement),
                Err(e) => {
                    log::warn!("Could not record score for {name}: {e}");
                    None
                }
            }
        });

        let summary = GameOverSummary {
            score: self.score,
            username: self.username.clone(),
            feedback: FeedbackTier::for_score(self.score),
            placement,
        };
        log::info!(
            "Game over: score {} rank {:?} ({:?})",
            summary.score,
            summary.rank(),
            summary.feedback
        );
        self.emit(GameEvent::GameOver {
            rank: summary.rank(),
            summary: summary.clone(),
        });
        self.summary = Some(summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::leaderboard::{LeaderboardEntry, PlacementKind, STORAGE_KEY};
    use crate::persistence::MemoryStorage;
    use crate::sim::scene::HeadlessScene;
    use crate::tuning::Tuning;

    fn setup(username: Option<&str>) -> (GameSession, HeadlessScene, LeaderboardStore<MemoryStorage>) {
        let mut scene = HeadlessScene::new(Vec2::new(6.0, 4.0));
        let mut session = GameSession::new(Tuning::default(), 12345);
        session.start(username, 0.0, &mut scene).unwrap();
        session.drain_events();
        (session, scene, LeaderboardStore::new(MemoryStorage::new()))
    }

    fn player_pos(session: &GameSession, scene: &HeadlessScene) -> Vec2 {
        scene.entity_position(session.player_handle().unwrap()).unwrap()
    }

    #[test]
    fn test_spawn_after_interval() {
        let (mut session, mut scene, mut store) = setup(None);

        assert_eq!(tick(&mut session, 2000.0, &mut scene, &mut store), TickOutcome::Running);
        assert!(session.enemies().is_empty());

        tick(&mut session, 2000.5, &mut scene, &mut store);
        assert_eq!(session.enemies().len(), 1);
        assert_eq!(session.last_spawn_ms(), 2000.5);
        assert_eq!(scene.count(EntityKind::Enemy), 1);

        // Spawned outside the visible bounds (then stepped once toward the target)
        let pos = session.enemies()[0].pos;
        assert!(pos.x.abs() > 6.0 || pos.y.abs() > 4.0);
    }

    #[test]
    fn test_spawn_positions_cover_edges() {
        let mut scene = HeadlessScene::new(Vec2::new(6.0, 4.0));
        let mut session = GameSession::new(Tuning::default(), 99);
        let mut edges = std::collections::HashSet::new();
        for _ in 0..64 {
            session.spawn_enemy(&mut scene);
        }
        for event in session.drain_events() {
            if let GameEvent::EnemySpawned { edge, .. } = event {
                edges.insert(format!("{edge:?}"));
            }
        }
        assert_eq!(edges.len(), 4);

        let offset = 1.5 * 1.5;
        for enemy in session.enemies() {
            let on_horizontal = (enemy.pos.y.abs() - (4.0 + offset)).abs() < 1e-4;
            let on_vertical = (enemy.pos.x.abs() - (6.0 + offset)).abs() < 1e-4;
            assert!(on_horizontal || on_vertical);
        }
    }

    #[test]
    fn test_enemies_pursue_target() {
        let (mut session, mut scene, mut store) = setup(None);
        session.spawn_enemy_at(Vec2::new(8.0, 0.0), &mut scene);
        tick(&mut session, 1.0, &mut scene, &mut store);
        let pos = session.enemies()[0].pos;
        assert!((pos.x - 7.97).abs() < 1e-5);
        assert_eq!(scene.entity_position(session.enemies()[0].handle), Some(pos));
    }

    #[test]
    fn test_capture_scores_and_ramps_difficulty() {
        let (mut session, mut scene, mut store) = setup(None);
        let player = player_pos(&session, &scene);
        let handle = session.spawn_enemy_at(player, &mut scene);

        tick(&mut session, 1.0, &mut scene, &mut store);
        assert_eq!(session.score(), 50);
        assert!(session.enemies().is_empty());
        assert_eq!(scene.entity_position(handle), None);

        let events = session.drain_events();
        assert!(events.contains(&GameEvent::EnemyCaptured { handle }));
        assert!(events.contains(&GameEvent::ScoreChanged { score: 50 }));

        session.spawn_enemy_at(player, &mut scene);
        tick(&mut session, 2.0, &mut scene, &mut store);
        assert_eq!(session.score(), 100);
        assert!((session.difficulty().speed - 0.038).abs() < 1e-6);
        assert_eq!(session.difficulty().spawn_interval_ms, 1900.0);
    }

    #[test]
    fn test_loss_stops_processing() {
        let (mut session, mut scene, mut store) = setup(None);
        // Older enemy sits on the player, newer one on the target
        let player = player_pos(&session, &scene);
        session.spawn_enemy_at(player, &mut scene);
        session.spawn_enemy_at(Vec2::new(0.5, 0.0), &mut scene);

        assert_eq!(tick(&mut session, 1.0, &mut scene, &mut store), TickOutcome::GameOver);
        assert_eq!(session.phase(), GamePhase::GameOver);
        // Older enemy was never reached, so no capture happened
        assert_eq!(session.score(), 0);
        assert_eq!(session.enemies().len(), 1);
        assert_eq!(session.current_task(TaskKind::Frame), None);

        let summary = session.summary().unwrap();
        assert_eq!(summary.feedback, FeedbackTier::Defeated);
        assert_eq!(summary.placement, None);
        // Anonymous runs never touch the leaderboard
        assert!(store.storage().is_empty());
    }

    #[test]
    fn test_tick_outside_playing_is_inert() {
        let (mut session, mut scene, mut store) = setup(None);
        session.spawn_enemy_at(Vec2::new(5.0, 0.0), &mut scene);
        session.pause().unwrap();

        let before_enemies = session.enemies().to_vec();
        let before_spawn = session.last_spawn_ms();
        for t in 0..10 {
            let now = 10_000.0 + t as f64 * 1_000.0;
            assert_eq!(tick(&mut session, now, &mut scene, &mut store), TickOutcome::Idle);
        }
        assert_eq!(session.enemies(), before_enemies.as_slice());
        assert_eq!(session.last_spawn_ms(), before_spawn);
        assert_eq!(session.score(), 0);

        session.resume().unwrap();
        assert_eq!(tick(&mut session, 99_000.0, &mut scene, &mut store), TickOutcome::Idle);
        assert_eq!(session.enemies(), before_enemies.as_slice());
    }

    #[test]
    fn test_stale_frame_task() {
        let (mut session, mut scene, mut store) = setup(None);
        let frame = session.current_task(TaskKind::Frame).unwrap();
        assert_eq!(
            session.on_frame(frame, 1.0, &mut scene, &mut store),
            Callback::Ran(TickOutcome::Running)
        );

        session.pause().unwrap();
        assert!(session.on_frame(frame, 2.0, &mut scene, &mut store).is_stale());
    }

    #[test]
    fn test_bob_scenario() {
        let mut storage = MemoryStorage::new();
        let seeded = vec![
            LeaderboardEntry::new("Alice", 500),
            LeaderboardEntry::new("Carol", 300),
            LeaderboardEntry::new("Dave", 100),
        ];
        storage
            .write_raw(STORAGE_KEY, &serde_json::to_string(&seeded).unwrap())
            .unwrap();
        let mut store = LeaderboardStore::new(storage);

        let mut scene = HeadlessScene::new(Vec2::new(6.0, 4.0));
        let mut session = GameSession::new(Tuning::default(), 2024);
        session.start(Some("Bob"), 0.0, &mut scene).unwrap();
        let frame = session.current_task(TaskKind::Frame).unwrap();
        let player = player_pos(&session, &scene);
        let base_speed = session.difficulty().speed;

        // 50 frames at a fixed clock (no timed spawns); feed the player
        // an enemy every 8 frames
        for frame_no in 0..50 {
            if frame_no % 8 == 0 && session.score() < 300 {
                session.spawn_enemy_at(player, &mut scene);
            }
            let outcome = session.on_frame(frame, 0.0, &mut scene, &mut store);
            assert_eq!(outcome, Callback::Ran(TickOutcome::Running));
        }
        assert_eq!(session.score(), 300);
        assert!((base_speed - 0.03).abs() < 1e-6);
        assert!(session.difficulty().speed >= 0.03 + 2.0 * 0.008 - 1e-6);

        session.spawn_enemy_at(Vec2::new(0.0, 0.2), &mut scene);
        assert_eq!(
            session.on_frame(frame, 0.0, &mut scene, &mut store),
            Callback::Ran(TickOutcome::GameOver)
        );
        assert_eq!(session.phase(), GamePhase::GameOver);

        let summary = session.summary().unwrap().clone();
        assert_eq!(summary.score, 300);
        assert_eq!(summary.feedback, FeedbackTier::Good);
        let placement = summary.placement.unwrap();
        assert_eq!(placement.kind, PlacementKind::Inserted);
        assert!(placement.retained);
        // Alice is strictly above; Carol ties and shares the rank
        assert_eq!(summary.rank(), Some(2));
        assert_eq!(store.rank("Bob", 300), Some(2));
        assert_eq!(store.load().best_for("Bob"), Some(300));

        // Further frames after game over are stale
        assert!(session.on_frame(frame, 1.0, &mut scene, &mut store).is_stale());
    }

    #[test]
    fn test_restart_keeps_username_and_clears_enemies() {
        let (mut session, mut scene, mut store) = setup(Some("Bob"));
        session.spawn_enemy_at(Vec2::new(0.1, 0.0), &mut scene);
        session.spawn_enemy_at(Vec2::new(5.0, 0.0), &mut scene);
        tick(&mut session, 1.0, &mut scene, &mut store);
        assert_eq!(session.phase(), GamePhase::GameOver);

        session.restart(500.0, &mut scene);
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.username(), Some("Bob"));
        assert!(session.enemies().is_empty());
        assert_eq!(scene.count(EntityKind::Enemy), 0);
        assert_eq!(session.last_spawn_ms(), 500.0);
        assert!(session.summary().is_none());
    }

    fn seeded_store(entries: &[(&str, u64)]) -> LeaderboardStore<MemoryStorage> {
        let entries: Vec<_> = entries
            .iter()
            .map(|(name, score)| LeaderboardEntry::new(*name, *score))
            .collect();
        let mut storage = MemoryStorage::new();
        storage
            .write_raw(STORAGE_KEY, &serde_json::to_string(&entries).unwrap())
            .unwrap();
        LeaderboardStore::new(storage)
    }

    #[test]
    fn test_tying_best_score_still_ranks() {
        let mut store = seeded_store(&[("Alice", 500), ("Bob", 0)]);
        let mut scene = HeadlessScene::new(Vec2::new(6.0, 4.0));
        let mut session = GameSession::new(Tuning::default(), 7);
        session.start(Some("Bob"), 0.0, &mut scene).unwrap();

        session.spawn_enemy_at(Vec2::new(0.2, 0.0), &mut scene);
        assert_eq!(tick(&mut session, 1.0, &mut scene, &mut store), TickOutcome::GameOver);

        let summary = session.summary().unwrap();
        let placement = summary.placement.unwrap();
        assert_eq!(placement.kind, PlacementKind::KeptBest { best: 0 });
        assert_eq!(summary.rank(), Some(2));
        assert_eq!(store.rank("Bob", 0), Some(2));

        let ranked = session.drain_events().into_iter().any(|e| {
            matches!(e, GameEvent::GameOver { rank: Some(2), .. })
        });
        assert!(ranked);
    }

    #[test]
    fn test_below_best_score_has_no_rank() {
        let mut store = seeded_store(&[("Alice", 500), ("Bob", 400)]);
        let mut scene = HeadlessScene::new(Vec2::new(6.0, 4.0));
        let mut session = GameSession::new(Tuning::default(), 7);
        session.start(Some("Bob"), 0.0, &mut scene).unwrap();

        session.spawn_enemy_at(Vec2::new(0.2, 0.0), &mut scene);
        tick(&mut session, 1.0, &mut scene, &mut store);

        let summary = session.summary().unwrap();
        assert_eq!(summary.rank(), None);
        assert_eq!(store.load().best_for("Bob"), Some(400));
    }

    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn read_raw(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn write_raw(&mut self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::WriteRejected {
                key: key.to_string(),
                reason: "quota exceeded".to_string(),
            })
        }
    }

    #[test]
    fn test_game_over_survives_write_failure() {
        let mut store = LeaderboardStore::new(BrokenStorage);
        let mut scene = HeadlessScene::new(Vec2::new(6.0, 4.0));
        let mut session = GameSession::new(Tuning::default(), 3);
        session.start(Some("Bob"), 0.0, &mut scene).unwrap();
        let player = player_pos(&session, &scene);

        for _ in 0..3 {
            session.spawn_enemy_at(player, &mut scene);
            tick(&mut session, 0.0, &mut scene, &mut store);
        }
        assert_eq!(session.score(), 150);

        session.spawn_enemy_at(Vec2::new(0.2, 0.0), &mut scene);
        assert_eq!(tick(&mut session, 0.0, &mut scene, &mut store), TickOutcome::GameOver);
        assert_eq!(session.phase(), GamePhase::GameOver);

        let summary = session.summary().unwrap();
        assert_eq!(summary.score, 150);
        assert_eq!(summary.username.as_deref(), Some("Bob"));
        assert_eq!(summary.feedback, FeedbackTier::Fair);
        assert_eq!(summary.placement, None);
        assert!(session
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::GameOver { rank: None, .. })));
    }

    #[test]
    fn test_spawn_with_degenerate_bounds() {
        let mut session = GameSession::new(Tuning::default(), 11);
        let offset = 1.5 * 1.5;

        let mut scene = HeadlessScene::new(Vec2::new(f32::NAN, 4.0));
        let handle = session.spawn_enemy(&mut scene);
        let pos = scene.entity_position(handle).unwrap();
        assert!(pos.is_finite());
        assert!((pos.length() - offset).abs() < 1e-4);

        let mut scene = HeadlessScene::new(Vec2::new(-3.0, 0.0));
        for _ in 0..16 {
            let handle = session.spawn_enemy(&mut scene);
            let pos = scene.entity_position(handle).unwrap();
            assert!((pos.length() - offset).abs() < 1e-4);
        }
    }
}
