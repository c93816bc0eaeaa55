//! Run-level performance metrics
//!
//! Fed one `PlacementResult` per placement; summarised once when the run ends.

use serde::{Deserialize, Serialize};

use super::geometry::PlacementResult;

/// Cumulative counters for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMetrics {
    pub total_precision_score: u64,
    /// Sum of per-placement overlap percentages (0-100 each)
    pub total_overlap_percentage: f32,
    /// Milliseconds between consecutive placements
    pub block_placement_times: Vec<u64>,
    pub consecutive_success_streak: u32,
    pub max_consecutive_streak: u32,
    pub perfect_placements: u32,
    pub total_tower_area: f32,
    pub block_areas: Vec<f32>,
    pub total_area_lost: f32,
    pub area_loss_history: Vec<f32>,
    /// None until the first successful placement
    pub min_block_area: Option<f32>,
    pub max_block_area: f32,
    pub misses: u32,
    pub last_placement_timestamp: u64,
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new(0)
    }
}

impl GameMetrics {
    /// Empty metrics for a run starting at `now_ms`
    pub fn new(now_ms: u64) -> Self {
        Self {
            total_precision_score: 0,
            total_overlap_percentage: 0.0,
            block_placement_times: Vec::new(),
            consecutive_success_streak: 0,
            max_consecutive_streak: 0,
            perfect_placements: 0,
            total_tower_area: 0.0,
            block_areas: Vec::new(),
            total_area_lost: 0.0,
            area_loss_history: Vec::new(),
            min_block_area: None,
            max_block_area: 0.0,
            misses: 0,
            last_placement_timestamp: now_ms,
        }
    }

    /// Successful placements recorded so far
    #[inline]
    pub fn placed_count(&self) -> usize {
        self.block_areas.len()
    }

    /// Fold one placement into the run totals
    pub fn record(&mut self, result: &PlacementResult, now_ms: u64) {
        self.block_placement_times
            .push(now_ms.saturating_sub(self.last_placement_timestamp));
        self.last_placement_timestamp = now_ms;

        if result.is_success() {
            self.consecutive_success_streak += 1;
            self.max_consecutive_streak = self
                .max_consecutive_streak
                .max(self.consecutive_success_streak);
            self.total_precision_score += u64::from(result.precision_score);
            self.total_overlap_percentage += result.overlap_ratio * 100.0;
            self.total_tower_area += result.placed_area;
            self.block_areas.push(result.placed_area);
            self.total_area_lost += result.area_lost;
            self.area_loss_history.push(result.area_lost);
            self.min_block_area = Some(
                self.min_block_area
                    .map_or(result.placed_area, |min| min.min(result.placed_area)),
            );
            self.max_block_area = self.max_block_area.max(result.placed_area);
            if result.is_perfect {
                self.perfect_placements += 1;
            }
        } else {
            self.consecutive_success_streak = 0;
            self.misses += 1;
            self.total_area_lost += result.original_area;
            self.area_loss_history.push(result.original_area);
        }
    }

    /// Accuracy as a percentage (0-100); 0 with no placements
    pub fn average_accuracy(&self) -> f32 {
        match self.placed_count() {
            0 => 0.0,
            n => self.total_precision_score as f32 / n as f32 / 10.0,
        }
    }

    /// Mean time between placements in seconds; 0 with no placements
    pub fn average_reaction_time_seconds(&self) -> f32 {
        if self.block_placement_times.is_empty() {
            return 0.0;
        }
        let total: u64 = self.block_placement_times.iter().sum();
        total as f32 / self.block_placement_times.len() as f32 / 1000.0
    }

    /// Derive the end-of-run summary
    pub fn finalize(
        &self,
        final_level: u32,
        duration_ms: u64,
        continues_used: u32,
    ) -> GameSummary {
        GameSummary {
            final_level,
            score: self.total_precision_score,
            duration_ms,
            average_accuracy: self.average_accuracy(),
            average_reaction_time_seconds: self.average_reaction_time_seconds(),
            perfect_placements: self.perfect_placements,
            max_consecutive_streak: self.max_consecutive_streak,
            total_overlap_percentage: self.total_overlap_percentage,
            total_tower_area: self.total_tower_area,
            total_area_lost: self.total_area_lost,
            min_block_area: self.min_block_area.unwrap_or(0.0),
            max_block_area: self.max_block_area,
            misses: self.misses,
            continues_used,
        }
    }
}

/// Finalized run statistics surfaced at game over and persisted by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub final_level: u32,
    /// Aggregate precision over the run
    pub score: u64,
    pub duration_ms: u64,
    pub average_accuracy: f32,
    pub average_reaction_time_seconds: f32,
    pub perfect_placements: u32,
    pub max_consecutive_streak: u32,
    pub total_overlap_percentage: f32,
    pub total_tower_area: f32,
    pub total_area_lost: f32,
    pub min_block_area: f32,
    pub max_block_area: f32,
    pub misses: u32,
    pub continues_used: u32,
}
