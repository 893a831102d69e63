//! Princess Guard entry point
//!
//! The browser build is driven from JS through `platform::web::WebGame`.
//! Natively this runs a headless autopilot session that exercises the whole
//! session loop (spawns, captures, pause/countdown, game over, leaderboard).
//!
//! Usage: `princess-guard [USERNAME]`. Scores persist under
//! `$PRINCESS_GUARD_DATA` (default `.princess-guard`).

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;

    use princess_guard::input::HandTracker;
    use princess_guard::leaderboard::LeaderboardStore;
    use princess_guard::persistence::{FileStorage, MemoryStorage, Storage};
    use princess_guard::platform;
    use princess_guard::sim::{
        Callback, GameEvent, GameSession, HeadlessScene, MotionStatus, Scene, TaskId,
        TickOutcome,
    };
    use princess_guard::Tuning;

    /// 60 Hz frames
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up after five simulated minutes
    const MAX_FRAMES: u32 = 60 * 60 * 5;
    /// Exercise pause/resume once
    const PAUSE_AT_FRAME: u32 = 600;

    /// Stand-in for the browser's requestAnimationFrame/setInterval
    #[derive(Debug, Default)]
    struct Host {
        frame: Option<TaskId>,
        /// (task, interval, next due time)
        countdown: Option<(TaskId, f64, f64)>,
    }

    impl Host {
        fn apply(&mut self, events: Vec<GameEvent>, now: f64) {
            for event in events {
                match event {
                    GameEvent::ScheduleFrame { task } => self.frame = Some(task),
                    GameEvent::ScheduleCountdown { task, interval_ms } => {
                        self.countdown = Some((task, interval_ms, now + interval_ms));
                    }
                    GameEvent::CancelTask { task } => {
                        if self.frame == Some(task) {
                            self.frame = None;
                        }
                        if self.countdown.is_some_and(|(t, _, _)| t == task) {
                            self.countdown = None;
                        }
                    }
                    GameEvent::Countdown { remaining } => log::info!("{remaining}..."),
                    GameEvent::PhaseChanged { from, to } => log::debug!("{from:?} -> {to:?}"),
                    GameEvent::ScoreChanged { score } => log::debug!("Score: {score}"),
                    GameEvent::GameOver { summary, .. } => {
                        log::info!("{}", summary.feedback.message());
                    }
                    _ => {}
                }
            }
        }
    }

    fn open_storage() -> Box<dyn Storage> {
        let dir = std::env::var("PRINCESS_GUARD_DATA").unwrap_or_else(|_| ".princess-guard".into());
        match FileStorage::open(&dir) {
            Ok(storage) => Box::new(storage),
            Err(e) => {
                log::warn!("Cannot open {dir}, scores will not persist: {e}");
                Box::new(MemoryStorage::new())
            }
        }
    }

    /// Point the "hand" at the enemy closest to the princess
    fn autopilot(session: &GameSession, scene: &HeadlessScene, tracker: &mut HandTracker) {
        let bounds = scene.world_bounds();
        let target = session
            .target_handle()
            .and_then(|h| scene.entity_position(h))
            .unwrap_or(Vec2::ZERO);
        let aim = session
            .enemies()
            .iter()
            .min_by(|a, b| {
                a.pos
                    .distance(target)
                    .partial_cmp(&b.pos.distance(target))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|e| e.pos)
            .unwrap_or(session.tuning().player_start);
        tracker.on_pointer(aim / bounds);
    }

    pub fn run() {
        platform::init_logging();
        log::info!("Princess Guard (headless) starting...");

        let username = std::env::args().nth(1);
        let storage = open_storage();
        let tuning = Tuning::load(&storage);
        let mut store = LeaderboardStore::new(storage);
        let mut scene = HeadlessScene::default();
        let seed = platform::now_ms() as u64;
        log::info!("Session seed: {seed}");

        let mut session = GameSession::new(tuning, seed);
        let mut tracker = HandTracker::new();
        let mut host = Host::default();
        let mut now = 0.0;

        if let Err(e) = session.start(username.as_deref(), now, &mut scene) {
            log::error!("{e}");
            return;
        }
        session.set_motion_status(MotionStatus::Tracking);

        for frame_no in 0..MAX_FRAMES {
            now += FRAME_MS;
            host.apply(session.drain_events(), now);

            if frame_no == PAUSE_AT_FRAME && session.pause().is_ok() {
                log::info!("Paused at score {}", session.score());
                if let Err(e) = session.resume() {
                    log::warn!("{e}");
                }
                host.apply(session.drain_events(), now);
            }

            if let Some((task, interval, due)) = host.countdown {
                if now >= due {
                    host.countdown = Some((task, interval, due + interval));
                    session.on_countdown(task);
                    host.apply(session.drain_events(), now);
                }
            }

            let Some(task) = host.frame else {
                continue;
            };
            autopilot(&session, &scene, &mut tracker);
            session.steer_player(&tracker, &mut scene);
            if session.on_frame(task, now, &mut scene, &mut store) == Callback::Ran(TickOutcome::GameOver) {
                break;
            }
        }
        host.apply(session.drain_events(), now);

        match session.summary() {
            Some(summary) => {
                println!("Final score: {}", summary.score);
                println!("{}", summary.feedback.message());
                match (summary.username.as_deref(), summary.rank()) {
                    (Some(name), Some(rank)) => println!("Well done {name}! You placed #{rank}."),
                    (Some(name), None) => println!("{name}, your best score stands."),
                    (None, _) => println!("Play with a name to enter the leaderboard."),
                }
            }
            None => println!("Autopilot survived; final score {}", session.score()),
        }

        let board = store.load();
        if board.is_empty() {
            println!("No scores yet.");
        }
        for row in board.display_rows() {
            println!("{:>3}. {:<16} {:>6} ({})", row.rank, row.name, row.score, row.badge.as_str());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Entry point is `platform::web::wasm_main`
}
