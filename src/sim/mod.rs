//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One motion step per display tick, no wall clock reads
//! - Seeded RNG only (spawn side, colors)
//! - No rendering, audio or economy transport

pub mod block;
pub mod geometry;
pub mod metrics;
pub mod state;
pub mod tick;
pub mod tower;

pub use block::{Block, BlockState, speed_for_index};
pub use geometry::{
    Axis, BlockGeometry, Overlap, PlacementResult, Split, compute_overlap, split_block,
};
pub use metrics::{GameMetrics, GameSummary};
pub use state::{ContinueTicket, GameEvent, GameState, PendingContinue, RunState};
pub use tick::{Action, TickInput, abandon, handle_action, resolve_continue, tick};
pub use tower::{BlockSnapshot, Tower, TowerSnapshot};
