//! Game session simulation
//!
//! All gameplay logic lives here. Rendering, camera, and storage are
//! reached only through the `Scene` and `Storage` traits:
//! - Explicit wall-clock timestamps, no clock reads
//! - Seeded RNG only
//! - Stale timer callbacks are no-ops

pub mod collision;
pub mod difficulty;
pub mod feedback;
pub mod flow;
pub mod scene;
pub mod schedule;
pub mod state;
pub mod tick;

pub use collision::{pursue, within};
pub use difficulty::{Difficulty, DifficultyCurve, difficulty_for};
pub use feedback::FeedbackTier;
pub use flow::CountdownStep;
pub use scene::{EntityHandle, EntityKind, HeadlessScene, Scene};
pub use schedule::{Callback, TaskId, TaskKind};
pub use state::{
    Enemy, GameEvent, GameOverSummary, GamePhase, GameSession, MotionStatus, SpawnEdge,
};
pub use tick::{TickOutcome, tick};
