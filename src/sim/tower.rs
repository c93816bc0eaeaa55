//! The tower: placed blocks plus the one currently moving

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::block::{Block, BlockState};
use super::geometry::{BlockGeometry, PlacementResult};
use crate::error::EngineError;

/// Ordered stack of placed blocks and the active slot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tower {
    /// `placed[i].index == i`; index 0 is the foundation
    pub placed: Vec<Block>,
    /// The moving block, always `placed.len()` when present
    pub active: Option<Block>,
    /// Last block that fell past its target, kept for debris rendering
    pub missed: Option<Block>,
}

impl Tower {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    /// Successfully placed blocks above the foundation
    #[inline]
    pub fn level(&self) -> u32 {
        self.placed.len().saturating_sub(1) as u32
    }

    #[inline]
    pub fn top(&self) -> Option<&Block> {
        self.placed.last()
    }

    #[inline]
    pub fn active(&self) -> Option<&Block> {
        self.active.as_ref()
    }

    #[inline]
    pub fn active_mut(&mut self) -> Option<&mut Block> {
        self.active.as_mut()
    }

    /// Lay the foundation if the tower is empty
    pub fn lay_foundation(
        &mut self,
        dimension: Vec3,
        color_offset: u32,
    ) -> Option<PlacementResult> {
        if !self.is_empty() {
            return None;
        }
        let mut base = Block::foundation(dimension, color_offset);
        let result = base.place(None, 0.0);
        self.placed.push(base);
        Some(result)
    }

    /// Spawn the next moving block on top of the tower.
    ///
    /// Replaces any previous active or missed block. Returns the new index.
    pub fn spawn_next(&mut self, start_high: bool, move_amount: f32) -> Option<u32> {
        let top = self.top()?;
        let index = self.placed.len() as u32;
        let block = Block::spawn(index, top, start_high, move_amount);
        self.active = Some(block);
        self.missed = None;
        Some(index)
    }

    /// Advance the moving block one step
    pub fn tick(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.tick();
        }
    }

    /// Place the active block on the top of the tower.
    ///
    /// A stopped block joins `placed`; a missed one moves to `missed`.
    /// Returns `None` when nothing is moving.
    pub fn place_active(&mut self, snap_threshold: f32) -> Option<PlacementResult> {
        let mut block = self.active.take()?;
        let result = block.place(self.placed.last(), snap_threshold);
        match block.state {
            BlockState::Stopped => self.placed.push(block),
            _ => self.missed = Some(block),
        }
        Some(result)
    }

    /// Drop everything above the foundation, returning how many blocks went
    pub fn truncate_to_foundation(&mut self) -> usize {
        let removed = self.placed.len().saturating_sub(1);
        self.placed.truncate(1);
        self.active = None;
        self.missed = None;
        removed
    }

    /// Check the structural invariants of the stack
    pub fn validate(&self) -> Result<(), EngineError> {
        for (slot, block) in self.placed.iter().enumerate() {
            if block.index as usize != slot {
                return Err(EngineError::IndexGap {
                    slot,
                    index: block.index,
                });
            }
            if block.state != BlockState::Stopped {
                return Err(EngineError::StoppedBlockExpected { index: block.index });
            }
        }
        if let Some(active) = &self.active {
            let expected = self.placed.len() as u32;
            if active.index != expected {
                return Err(EngineError::ActiveIndexMismatch {
                    index: active.index,
                    expected,
                });
            }
            if !active.is_active() {
                return Err(EngineError::ActiveNotMoving {
                    index: active.index,
                });
            }
        }
        Ok(())
    }

    /// Read-only view for rendering
    pub fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            level: self.level(),
            placed: self.placed.iter().map(BlockSnapshot::from).collect(),
            active: self.active.as_ref().map(BlockSnapshot::from),
            missed: self.missed.as_ref().map(BlockSnapshot::from),
        }
    }
}

/// Render-facing copy of one block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSnapshot {
    pub index: u32,
    pub geometry: BlockGeometry,
    pub color: [u8; 3],
    pub state: BlockState,
}

impl From<&Block> for BlockSnapshot {
    fn from(block: &Block) -> Self {
        Self {
            index: block.index,
            geometry: block.geometry(),
            color: block.color(),
            state: block.state,
        }
    }
}

/// Render-facing copy of the whole tower
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowerSnapshot {
    pub level: u32,
    pub placed: Vec<BlockSnapshot>,
    pub active: Option<BlockSnapshot>,
    pub missed: Option<BlockSnapshot>,
}
