//! Browser bindings
//!
//! JS owns the renderer (three.js), the camera, and the hand tracker. It
//! hands a scene object to `WebGame`, forwards button clicks and landmarks,
//! and runs the callbacks the session schedules:
//!
//! ```js
//! const game = new WebGame(scene);
//! game.start(usernameInput.value);
//! for (const ev of JSON.parse(game.drainEvents())) {
//!   if (ev.type === "schedule_frame") loop(ev.task);
//!   if (ev.type === "schedule_countdown") timers[ev.task] = setInterval(() => game.countdown(ev.task), ev.interval_ms);
//!   if (ev.type === "cancel_task") clearInterval(timers[ev.task]);
//! }
//! ```

use wasm_bindgen::prelude::*;

use crate::input::HandTracker;
use crate::leaderboard::LeaderboardStore;
use crate::persistence::{LocalStorage, MemoryStorage, Storage};
use crate::sim::{
    Callback, CountdownStep, EntityHandle, EntityKind, GameSession, MotionStatus, Scene, TaskId,
    TickOutcome,
};
use crate::tuning::Tuning;
use glam::Vec2;

#[wasm_bindgen]
extern "C" {
    /// Scene object provided by the JS renderer
    pub type JsScene;

    #[wasm_bindgen(method, js_name = addEntity)]
    fn js_add_entity(this: &JsScene, kind: &str) -> u32;

    #[wasm_bindgen(method, js_name = removeEntity)]
    fn js_remove_entity(this: &JsScene, handle: u32);

    #[wasm_bindgen(method, js_name = setEntityPosition)]
    fn js_set_entity_position(this: &JsScene, handle: u32, x: f32, y: f32);

    /// `[x, y]`, or an empty array for unknown handles
    #[wasm_bindgen(method, js_name = getEntityPosition)]
    fn js_entity_position(this: &JsScene, handle: u32) -> Vec<f32>;

    #[wasm_bindgen(method, js_name = worldHalfWidth)]
    fn js_world_half_width(this: &JsScene) -> f32;

    #[wasm_bindgen(method, js_name = worldHalfHeight)]
    fn js_world_half_height(this: &JsScene) -> f32;
}

impl Scene for JsScene {
    fn add_entity(&mut self, kind: EntityKind) -> EntityHandle {
        EntityHandle(self.js_add_entity(kind.as_str()))
    }

    fn remove_entity(&mut self, handle: EntityHandle) {
        self.js_remove_entity(handle.0);
    }

    fn set_entity_position(&mut self, handle: EntityHandle, pos: Vec2) {
        self.js_set_entity_position(handle.0, pos.x, pos.y);
    }

    fn entity_position(&self, handle: EntityHandle) -> Option<Vec2> {
        match self.js_entity_position(handle.0).as_slice() {
            [x, y] => Some(Vec2::new(*x, *y)),
            _ => None,
        }
    }

    fn world_bounds(&self) -> Vec2 {
        Vec2::new(self.js_world_half_width(), self.js_world_half_height())
    }
}

#[wasm_bindgen(start)]
pub fn wasm_main() {
    super::init_logging();
    log::info!("Princess Guard starting...");
}

fn open_storage() -> Box<dyn Storage> {
    match LocalStorage::open() {
        Ok(storage) => Box::new(storage),
        Err(e) => {
            log::warn!("LocalStorage unavailable, scores will not persist: {e}");
            Box::new(MemoryStorage::new())
        }
    }
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json(value: &impl serde::Serialize) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::error!("Event encode failed: {e}");
        "null".to_string()
    })
}

/// Game handle exported to JS
#[wasm_bindgen]
pub struct WebGame {
    session: GameSession,
    scene: JsScene,
    store: LeaderboardStore<Box<dyn Storage>>,
    tracker: HandTracker,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(scene: JsScene) -> WebGame {
        let storage = open_storage();
        let tuning = Tuning::load(&storage);
        let seed = js_sys::Date::now() as u64;
        log::info!("Session seed: {seed}");
        WebGame {
            session: GameSession::new(tuning, seed),
            scene,
            store: LeaderboardStore::new(storage),
            tracker: HandTracker::new(),
        }
    }

    pub fn start(&mut self, username: Option<String>) -> Result<(), JsValue> {
        let now = super::now_ms();
        self.tracker.clear();
        self.session
            .start(username.as_deref(), now, &mut self.scene)
            .map_err(js_error)
    }

    pub fn pause(&mut self) -> Result<(), JsValue> {
        self.session.pause().map_err(js_error)
    }

    pub fn resume(&mut self) -> Result<(), JsValue> {
        self.session.resume().map_err(js_error)
    }

    pub fn restart(&mut self) {
        self.tracker.clear();
        self.session.restart(super::now_ms(), &mut self.scene);
    }

    pub fn menu(&mut self) -> Result<(), JsValue> {
        self.session.menu(&mut self.scene).map_err(js_error)
    }

    #[wasm_bindgen(js_name = showLeaderboard)]
    pub fn show_leaderboard(&mut self) -> Result<(), JsValue> {
        self.session.show_leaderboard().map_err(js_error)
    }

    pub fn back(&mut self) -> Result<(), JsValue> {
        self.session.back().map_err(js_error)
    }

    /// Animation frame callback. Returns false once the task is stale so the
    /// host stops requesting frames for it.
    pub fn frame(&mut self, task: f64) -> bool {
        self.session.steer_player(&self.tracker, &mut self.scene);
        match self.session.on_frame(
            TaskId::from_raw(task as u64),
            super::now_ms(),
            &mut self.scene,
            &mut self.store,
        ) {
            Callback::Ran(TickOutcome::GameOver) | Callback::Stale => false,
            Callback::Ran(_) => true,
        }
    }

    /// Countdown interval callback; returns the value to display, 0 when play resumed
    pub fn countdown(&mut self, task: f64) -> Option<u32> {
        match self.session.on_countdown(TaskId::from_raw(task as u64)) {
            Callback::Ran(CountdownStep::Remaining(n)) => Some(n),
            Callback::Ran(CountdownStep::Resumed) => Some(0),
            Callback::Stale => None,
        }
    }

    /// Hand landmark in camera image coordinates
    #[wasm_bindgen(js_name = onLandmark)]
    pub fn on_landmark(&mut self, x: f32, y: f32) {
        if !self.session.accepts_motion() {
            return;
        }
        self.tracker.on_landmark(x, y);
        self.session.set_motion_status(MotionStatus::Tracking);
    }

    /// Camera or tracker failure reported by JS
    #[wasm_bindgen(js_name = onMotionUnavailable)]
    pub fn on_motion_unavailable(&mut self, reason: String) {
        self.tracker.clear();
        self.session
            .set_motion_status(MotionStatus::Unavailable { reason });
    }

    pub fn score(&self) -> f64 {
        self.session.score() as f64
    }

    pub fn phase(&self) -> String {
        format!("{:?}", self.session.phase())
    }

    /// Pending events as a JSON array
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&mut self) -> String {
        to_json(&self.session.drain_events())
    }

    /// Leaderboard rows as a JSON array
    #[wasm_bindgen(js_name = leaderboardRows)]
    pub fn leaderboard_rows(&self) -> String {
        let board = self.store.load();
        to_json(&board.display_rows())
    }

    /// Feedback message for the last finished run
    #[wasm_bindgen(js_name = feedbackMessage)]
    pub fn feedback_message(&self) -> Option<String> {
        self.session
            .summary()
            .map(|s| s.feedback.message().to_string())
    }
}
