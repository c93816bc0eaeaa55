//! Tower Block - A stacking-tower arcade game engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (block motion, slicing, run state, metrics)
//! - `continues`: Paid continue negotiation against the economy collaborator
//! - `session`: Host glue (entry fee, continue offers, run recording)
//! - `highscores`: Local leaderboard of finished runs
//! - `settings`: Data-driven engine configuration

pub mod continues;
pub mod error;
pub mod highscores;
pub mod session;
pub mod settings;
pub mod sim;

pub use continues::{ContinueController, ContinueOutcome, Economy, Wallet};
pub use error::{EconomyError, EngineError, SessionError, SettingsError};
pub use highscores::Leaderboard;
pub use session::{JsonLinesRecorder, RunSession, SessionRecord, SessionRecorder};
pub use settings::{PricingPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Travel bound for the moving block along its working axis
    pub const MOVE_AMOUNT: f32 = 12.0;
    /// Leftover span below which a placement snaps to the target
    pub const SNAP_THRESHOLD: f32 = 0.3;
    /// Actions closer together than this are treated as one gesture
    pub const ACTION_DEBOUNCE_MS: u64 = 200;

    /// Block defaults
    pub const BLOCK_HEIGHT: f32 = 2.0;
    pub const FOUNDATION_WIDTH: f32 = 10.0;
    pub const FOUNDATION_DEPTH: f32 = 10.0;

    /// Oscillation speed formula
    pub const BASE_SPEED: f32 = -0.13;
    pub const SPEED_PER_INDEX: f32 = 0.008;
    pub const SPEED_PER_LEVEL_PAIR: f32 = 0.025;
    /// Fastest allowed speed (speeds are negative; this is the clamp floor)
    pub const MAX_SPEED: f32 = -4.5;

    /// Economy defaults (coins)
    pub const ENTRY_FEE: u64 = 10;
    pub const CONTINUE_BASE_COST: u64 = 10;

    /// Reset animation window
    pub const RESET_BASE_MS: u64 = 400;
    pub const RESET_PER_BLOCK_MS: u64 = 20;
}
