//! Local leaderboard of finished runs
//!
//! Persisted as JSON, tracks the top 10 towers.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::sim::GameSummary;

/// Maximum number of runs to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Tower height reached
    pub level: u32,
    /// Aggregate precision, breaks ties between equal levels
    pub score: u64,
    pub accuracy: f32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: u64,
}

impl LeaderboardEntry {
    fn beats(&self, other: &LeaderboardEntry) -> bool {
        (self.level, self.score) > (other.level, other.score)
    }
}

/// Best runs, sorted descending by level then score
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn entry(summary: &GameSummary, timestamp: u64) -> LeaderboardEntry {
        LeaderboardEntry {
            level: summary.final_level,
            score: summary.score,
            accuracy: summary.average_accuracy,
            timestamp,
        }
    }

    /// Check if a run makes the board. Empty towers never do.
    pub fn qualifies(&self, summary: &GameSummary) -> bool {
        if summary.final_level == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        let candidate = Self::entry(summary, 0);
        self.entries
            .last()
            .map(|e| candidate.beats(e))
            .unwrap_or(true)
    }

    /// Rank a run would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, summary: &GameSummary) -> Option<usize> {
        if !self.qualifies(summary) {
            return None;
        }
        let candidate = Self::entry(summary, 0);
        let rank = self.entries.iter().position(|e| candidate.beats(e));
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a finished run. Returns the rank achieved or None.
    pub fn add_run(&mut self, summary: &GameSummary, timestamp: u64) -> Option<usize> {
        let rank = self.potential_rank(summary)?;
        self.entries.insert(rank - 1, Self::entry(summary, timestamp));
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The best run (if any)
    pub fn best(&self) -> Option<&LeaderboardEntry> {
        self.entries.first()
    }

    /// Load from `path`; a missing or corrupt file starts a fresh board
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let loaded = std::fs::read_to_string(path)
            .map_err(SettingsError::from)
            .and_then(|json| Ok(serde_json::from_str::<Leaderboard>(&json)?));
        match loaded {
            Ok(board) => {
                log::info!("Loaded {} leaderboard entries", board.entries.len());
                board
            }
            Err(err) => {
                log::info!("No leaderboard at {} ({}), starting fresh", path.display(), err);
                Self::new()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Leaderboard saved ({} entries)", self.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GameMetrics;

    fn run(level: u32, score: u64) -> GameSummary {
        let mut summary = GameMetrics::new(0).finalize(level, 1000, 0);
        summary.score = score;
        summary
    }

    #[test]
    fn test_empty_tower_never_qualifies() {
        let board = Leaderboard::new();
        assert!(!board.qualifies(&run(0, 0)));
        assert!(board.qualifies(&run(1, 0)));
    }

    #[test]
    fn test_orders_by_level_then_score() {
        let mut board = Leaderboard::new();
        assert_eq!(board.add_run(&run(5, 4000), 1), Some(1));
        assert_eq!(board.add_run(&run(8, 2000), 2), Some(1));
        assert_eq!(board.add_run(&run(5, 4500), 3), Some(2));
        assert_eq!(board.add_run(&run(2, 9000), 4), Some(4));

        let levels: Vec<(u32, u64)> = board.entries.iter().map(|e| (e.level, e.score)).collect();
        assert_eq!(levels, vec![(8, 2000), (5, 4500), (5, 4000), (2, 9000)]);
        assert_eq!(board.best().unwrap().timestamp, 2);
    }

    #[test]
    fn test_full_board_keeps_top_ten() {
        let mut board = Leaderboard::new();
        for level in 1..=MAX_HIGH_SCORES as u32 {
            board.add_run(&run(level + 10, 0), level as u64);
        }
        assert!(!board.qualifies(&run(3, 100)));
        assert_eq!(board.potential_rank(&run(3, 100)), None);

        assert_eq!(board.add_run(&run(30, 0), 99), Some(1));
        assert_eq!(board.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(board.entries.last().unwrap().level, 12);
    }

    #[test]
    fn test_missing_file_starts_fresh() {
        let board = Leaderboard::load("/nonexistent/tower-block/leaderboard.json");
        assert!(board.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!(
            "tower-block-leaderboard-{}.json",
            std::process::id()
        ));
        let mut board = Leaderboard::new();
        board.add_run(&run(7, 5200), 10);
        board.add_run(&run(3, 2900), 20);
        board.save(&path).unwrap();

        let loaded = Leaderboard::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.entries, board.entries);
        assert_eq!(loaded.best().unwrap().level, 7);
    }
}
