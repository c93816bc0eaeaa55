//! Run state and core simulation types
//!
//! `GameState` is the single owner of the tower and the run metrics. Only the
//! transitions in `tick.rs` mutate it.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::PlacementResult;
use super::metrics::{GameMetrics, GameSummary};
use super::tower::{Tower, TowerSnapshot};
use crate::continues::ContinueController;
use crate::settings::Settings;

/// Top-level phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// Foundation in place, waiting for the start action
    Ready,
    /// Blocks moving; may be suspended on a pending continue
    Playing,
    /// Tower being torn down to the foundation
    Resetting,
    /// Run over, summary emitted
    Ended,
}

/// Identifies one continue offer; outcomes for any other ticket are stale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContinueTicket {
    pub run_id: u32,
    pub attempt_index: u32,
}

/// A miss waiting on the continue negotiation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingContinue {
    pub ticket: ContinueTicket,
    pub cost: u64,
    /// Level at the time of the miss
    pub level: u32,
}

/// Events for presentation and the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Started { run_id: u32 },
    Placed(PlacementResult),
    LevelChanged { level: u32 },
    Missed { index: u32 },
    ContinueRequested {
        ticket: ContinueTicket,
        attempt_index: u32,
        cost: u64,
    },
    ContinueResolved { accepted: bool, cost: u64 },
    GameOver(GameSummary),
    ResetStarted { removed: usize },
    Ready,
    /// An action was rolled back because it broke the tower
    Fault { message: String },
}

/// Complete engine state for one host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Seed for the non-gameplay randomness (spawn side, colors)
    pub seed: u64,
    pub settings: Settings,
    pub pricing: ContinueController,
    /// Bumped on every start
    pub run_id: u32,
    pub run_state: RunState,
    pub tower: Tower,
    pub metrics: GameMetrics,
    pub pending_continue: Option<PendingContinue>,
    /// Continues bought this run; indexes the price progression
    pub attempt_index: u32,
    pub run_started_at: u64,
    pub last_action_at: Option<u64>,
    /// Resetting ends at this timestamp
    pub reset_until: u64,
    pub last_summary: Option<GameSummary>,
    /// Saved mid-stream so a restored run keeps its spawn sides and colors
    pub(crate) rng: Pcg32,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create an idle engine in READY with an empty tower
    pub fn new(seed: u64, settings: Settings) -> Self {
        Self {
            seed,
            pricing: ContinueController::from_settings(&settings),
            settings,
            run_id: 0,
            run_state: RunState::Ready,
            tower: Tower::new(),
            metrics: GameMetrics::default(),
            pending_continue: None,
            attempt_index: 0,
            run_started_at: 0,
            last_action_at: None,
            reset_until: 0,
            last_summary: None,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.tower.level()
    }

    /// PLAYING but suspended on a miss
    #[inline]
    pub fn is_continue_pending(&self) -> bool {
        self.pending_continue.is_some()
    }

    /// Whether an action at `now_ms` clears the debounce window
    pub fn accepts_action_at(&self, now_ms: u64) -> bool {
        self.last_action_at
            .is_none_or(|last| now_ms.saturating_sub(last) >= self.settings.action_debounce_ms)
    }

    pub fn snapshot(&self) -> TowerSnapshot {
        self.tower.snapshot()
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand queued events to the host
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
