//! Error types shared across the crate

use thiserror::Error;

use crate::sim::GamePhase;

/// Failure of a raw key/value storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage rejected write for key {key}: {reason}")]
    WriteRejected { key: String, reason: String },
}

/// Rejected leaderboard operation
#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("player name must not be empty")]
    EmptyName,

    #[error("score must not be negative (got {0})")]
    NegativeScore(i64),

    #[error("failed to encode leaderboard: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Rejected game session action
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot {action} while in phase {from:?}")]
    InvalidTransition {
        from: GamePhase,
        action: &'static str,
    },
}
