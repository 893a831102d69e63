//! Best-score-per-name leaderboard
//!
//! Persisted through a `Storage` backend (LocalStorage on web), keeps the
//! top 10 names sorted by score, highest first.

use serde::{Deserialize, Serialize};

use crate::error::LeaderboardError;
use crate::persistence::Storage;

/// Maximum number of entries kept
pub const MAX_LEADERBOARD_ENTRIES: usize = 10;

/// Storage key for the encoded entry list
pub const STORAGE_KEY: &str = "princess_guard_leaderboard_v2";

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Player name (unique key for best-score semantics)
    pub name: String,
    /// Best score achieved by this name
    pub score: u64,
}

impl LeaderboardEntry {
    pub fn new(name: impl Into<String>, score: u64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// What an upsert did to the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlacementKind {
    /// Name was new and got appended
    Inserted,
    /// Name existed with a lower score, which was replaced
    Improved,
    /// Name already holds an equal or better score; board unchanged
    KeptBest { best: u64 },
}

/// Result of submitting a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub kind: PlacementKind,
    /// Rank of the submitted (name, score) pair among the candidates before truncation
    pub rank: Option<usize>,
    /// Whether the submitted pair survived truncation to the top entries
    pub retained: bool,
}

impl Placement {
    /// Whether the submission changed the board
    pub fn changed(&self) -> bool {
        !matches!(self.kind, PlacementKind::KeptBest { .. })
    }
}

/// Medal shown next to the top three visual ranks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankBadge {
    Gold,
    Silver,
    Bronze,
    Number(usize),
}

impl RankBadge {
    pub fn for_rank(rank: usize) -> Self {
        match rank {
            1 => RankBadge::Gold,
            2 => RankBadge::Silver,
            3 => RankBadge::Bronze,
            n => RankBadge::Number(n),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RankBadge::Gold => "gold",
            RankBadge::Silver => "silver",
            RankBadge::Bronze => "bronze",
            RankBadge::Number(_) => "number",
        }
    }
}

/// One row of the leaderboard screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow<'a> {
    pub rank: usize,
    pub badge: RankBadge,
    pub name: &'a str,
    pub score: u64,
}

/// Sorted, truncated leaderboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build from arbitrary entries, restoring sort order and size cap
    pub fn from_entries(mut entries: Vec<LeaderboardEntry>) -> Self {
        sort_descending(&mut entries);
        entries.truncate(MAX_LEADERBOARD_ENTRIES);
        Self { entries }
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Best stored score for `name`
    pub fn best_for(&self, name: &str) -> Option<u64> {
        let name = name.trim();
        self.entries.iter().find(|e| e.name == name).map(|e| e.score)
    }

    /// Record `score` for `name`, keeping only the best score per name.
    ///
    /// Scores that do not beat the stored best are silently ignored. Blank
    /// names and negative scores are rejected without touching the board.
    pub fn upsert(&mut self, name: &str, score: i64) -> Result<Placement, LeaderboardError> {
        let name = validate_name(name)?;
        let score = u64::try_from(score).map_err(|_| LeaderboardError::NegativeScore(score))?;

        let kind = match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) if score > entry.score => {
                entry.score = score;
                PlacementKind::Improved
            }
            Some(entry) => {
                // A tie with the stored best still ranks; a lower score does not
                let best = entry.score;
                return Ok(Placement {
                    kind: PlacementKind::KeptBest { best },
                    rank: rank_in(&self.entries, name, score),
                    retained: self.contains(name, score),
                });
            }
            None => {
                self.entries.push(LeaderboardEntry::new(name, score));
                PlacementKind::Inserted
            }
        };

        sort_descending(&mut self.entries);
        let rank = rank_in(&self.entries, name, score);
        self.entries.truncate(MAX_LEADERBOARD_ENTRIES);
        let retained = self.contains(name, score);

        Ok(Placement {
            kind,
            rank,
            retained,
        })
    }

    /// 1-indexed rank of the exact (name, score) pair; tied scores share a rank.
    /// Names are trimmed the same way `upsert` stores them.
    pub fn rank(&self, name: &str, score: u64) -> Option<usize> {
        rank_in(&self.entries, name.trim(), score)
    }

    /// Visual rank per entry: ties share a rank, the next lower score continues at +1
    pub fn display_ranks(&self) -> Vec<usize> {
        let mut ranks = Vec::with_capacity(self.entries.len());
        let mut current = 0;
        let mut boundary: Option<u64> = None;
        for entry in &self.entries {
            if boundary.is_none_or(|b| entry.score < b) {
                current += 1;
                boundary = Some(entry.score);
            }
            ranks.push(current);
        }
        ranks
    }

    /// Rows for the leaderboard screen
    pub fn display_rows(&self) -> Vec<DisplayRow<'_>> {
        self.entries
            .iter()
            .zip(self.display_ranks())
            .map(|(entry, rank)| DisplayRow {
                rank,
                badge: RankBadge::for_rank(rank),
                name: &entry.name,
                score: entry.score,
            })
            .collect()
    }

    fn contains(&self, name: &str, score: u64) -> bool {
        self.entries.iter().any(|e| e.name == name && e.score == score)
    }
}

fn validate_name(name: &str) -> Result<&str, LeaderboardError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LeaderboardError::EmptyName);
    }
    Ok(name)
}

/// Stable sort, highest score first
fn sort_descending(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
}

fn rank_in(entries: &[LeaderboardEntry], name: &str, score: u64) -> Option<usize> {
    if !entries.iter().any(|e| e.name == name && e.score == score) {
        return None;
    }
    let mut rank = 1;
    for entry in entries {
        if entry.score > score {
            rank += 1;
        } else if entry.score == score && entry.name == name {
            break;
        }
    }
    Some(rank)
}

/// Leaderboard persisted through a `Storage` backend
///
/// Every operation re-reads storage, so several stores over the same backend
/// never act on a stale copy.
#[derive(Debug)]
pub struct LeaderboardStore<S> {
    storage: S,
    key: String,
}

impl<S: Storage> LeaderboardStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    /// Load the board; unreadable or corrupt data yields an empty board
    pub fn load(&self) -> Leaderboard {
        let raw = match self.storage.read_raw(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                log::info!("No leaderboard found, starting fresh");
                return Leaderboard::new();
            }
            Err(e) => {
                log::warn!("Leaderboard read failed, using empty board: {e}");
                return Leaderboard::new();
            }
        };

        match serde_json::from_str::<Vec<LeaderboardEntry>>(&raw) {
            Ok(entries) => {
                log::info!("Loaded {} leaderboard entries", entries.len());
                Leaderboard::from_entries(entries)
            }
            Err(e) => {
                log::warn!("Leaderboard data corrupt, using empty board: {e}");
                Leaderboard::new()
            }
        }
    }

    /// Persist `board` as a JSON list of `{name, score}` records
    pub fn save(&mut self, board: &Leaderboard) -> Result<(), LeaderboardError> {
        let json = serde_json::to_string(board.entries())?;
        self.storage.write_raw(&self.key, &json)?;
        log::info!("Leaderboard saved ({} entries)", board.len());
        Ok(())
    }

    /// Load, upsert, and persist if anything changed
    pub fn upsert(&mut self, name: &str, score: i64) -> Result<Placement, LeaderboardError> {
        let mut board = self.load();
        let placement = board.upsert(name, score)?;
        if placement.changed() {
            self.save(&board)?;
        }
        Ok(placement)
    }

    /// Rank of the exact (name, score) pair in the persisted board
    pub fn rank(&self, name: &str, score: u64) -> Option<usize> {
        self.load().rank(name, score)
    }
}
