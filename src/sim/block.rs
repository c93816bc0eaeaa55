//! A single tower segment
//!
//! Blocks are spawned ACTIVE, sweep back and forth along their axis, and are
//! placed exactly once. A placed block is either STOPPED (kept geometry is
//! frozen) or MISSED (nothing rested on the target).

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::geometry::{Axis, BlockGeometry, PlacementResult};
use crate::consts::*;

/// Lifecycle of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockState {
    /// Moving, waiting for the player
    Active,
    /// Placed on the tower; immutable from here on
    Stopped,
    /// Fell past the target
    Missed,
}

/// Oscillation speed for a block at `index`.
///
/// Negative numbers; the sign is the initial direction. Gets faster every
/// index and again every second level, clamped at `MAX_SPEED`.
pub fn speed_for_index(index: u32) -> f32 {
    let level_pairs = ((index as f32 - 1.0) / 2.0).floor();
    let speed = BASE_SPEED - index as f32 * SPEED_PER_INDEX - level_pairs * SPEED_PER_LEVEL_PAIR;
    speed.max(MAX_SPEED)
}

/// A tower segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub index: u32,
    pub axis: Axis,
    /// Minimum corner; y is fixed at `height × index`
    pub position: Vec3,
    /// x = width, y = height, z = depth
    pub dimension: Vec3,
    pub speed: f32,
    /// Signed step applied per tick
    pub direction: f32,
    /// Travel bound along `axis`
    pub move_amount: f32,
    pub state: BlockState,
    /// Seed for the color ramp, shared by the whole tower
    pub color_offset: u32,
}

impl Block {
    /// The immovable base at index 0
    pub fn foundation(dimension: Vec3, color_offset: u32) -> Self {
        Self {
            index: 0,
            axis: Axis::for_index(0),
            position: Vec3::ZERO,
            dimension,
            speed: 0.0,
            direction: 0.0,
            move_amount: 0.0,
            state: BlockState::Active,
            color_offset,
        }
    }

    /// Spawn the block that will be placed on `target`.
    ///
    /// Copies the target's footprint, then parks the working coordinate at
    /// one end of its travel.
    pub fn spawn(index: u32, target: &Block, start_high: bool, move_amount: f32) -> Self {
        let axis = Axis::for_index(index);
        let speed = speed_for_index(index);
        let mut position = Vec3::new(
            target.position.x,
            target.dimension.y * index as f32,
            target.position.z,
        );
        axis.set_component(
            &mut position,
            if start_high { move_amount } else { -move_amount },
        );

        Self {
            index,
            axis,
            position,
            dimension: target.dimension,
            speed,
            direction: speed,
            move_amount,
            state: BlockState::Active,
            color_offset: target.color_offset,
        }
    }

    #[inline]
    pub fn geometry(&self) -> BlockGeometry {
        BlockGeometry::new(self.position, self.dimension)
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == BlockState::Active
    }

    /// Advance one step along the working axis (moving blocks only)
    pub fn tick(&mut self) {
        if self.state != BlockState::Active {
            return;
        }
        let value = self.axis.component(self.position);
        if value > self.move_amount || value < -self.move_amount {
            self.reverse_direction();
        }
        self.axis
            .set_component(&mut self.position, value + self.direction);
    }

    fn reverse_direction(&mut self) {
        self.direction = if self.direction > 0.0 {
            self.speed
        } else {
            self.speed.abs()
        };
    }

    /// Place this block on `target` (or as the foundation when `None`).
    ///
    /// Must be called exactly once per block.
    pub fn place(&mut self, target: Option<&Block>, snap_threshold: f32) -> PlacementResult {
        assert!(
            self.state == BlockState::Active,
            "block {} placed twice",
            self.index
        );

        let Some(target) = target else {
            self.state = BlockState::Stopped;
            return PlacementResult::foundation(self.index, self.geometry());
        };

        let result = PlacementResult::resolve(
            self.index,
            &self.geometry(),
            &target.geometry(),
            snap_threshold,
        );
        match result.placed_geometry {
            Some(kept) if result.is_success() => {
                self.position = kept.position;
                self.dimension = kept.dimension;
                self.state = BlockState::Stopped;
            }
            _ => self.state = BlockState::Missed,
        }
        result
    }

    /// RGB color, fixed for the block's lifetime
    pub fn color(&self) -> [u8; 3] {
        let offset = (self.color_offset + self.index) as f32;
        let channel = |phase: f32| ((0.3 * offset + phase).sin() * 55.0 + 200.0).round() as u8;
        [channel(0.0), channel(2.0), channel(4.0)]
    }
}
