//! Error types
//!
//! Recoverable failures only. Contract violations (placing a block twice)
//! panic instead.

use thiserror::Error;

/// Tower invariant violations detected after an action mutated the tower
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("placed block at slot {slot} carries index {index}")]
    IndexGap { slot: usize, index: u32 },
    #[error("active block has index {index}, expected {expected}")]
    ActiveIndexMismatch { index: u32, expected: u32 },
    #[error("active block {index} is not moving")]
    ActiveNotMoving { index: u32 },
    #[error("placed block {index} is not stopped")]
    StoppedBlockExpected { index: u32 },
}

/// Failures reported by the economy collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EconomyError {
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },
    #[error("debit rejected: {0}")]
    Rejected(String),
}

/// Failures while hosting a run
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("entry fee not paid: {0}")]
    EntryFee(#[from] EconomyError),
    #[error("run already in progress")]
    AlreadyRunning,
    #[error("no continue is being offered")]
    NoContinueOffered,
    #[error("recorder i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("recorder encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while loading or saving configuration and leaderboard files
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}
