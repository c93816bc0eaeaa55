//! Axis-alternating overlap and slicing
//!
//! Blocks are axis-aligned boxes described by their minimum corner
//! (`position`) and extent (`dimension`, x = width, y = height, z = depth).
//! Every block moves along a single horizontal axis; overlap against the
//! block beneath is only ever measured along that axis.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Horizontal axis a block travels along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Z,
}

impl Axis {
    /// Odd indices travel along X, even indices along Z
    pub fn for_index(index: u32) -> Self {
        if index % 2 == 1 { Axis::X } else { Axis::Z }
    }

    /// Coordinate of `v` along this axis
    #[inline]
    pub fn component(self, v: Vec3) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Z => v.z,
        }
    }

    #[inline]
    pub fn set_component(self, v: &mut Vec3, value: f32) {
        match self {
            Axis::X => v.x = value,
            Axis::Z => v.z = value,
        }
    }

    /// Name of the dimension this axis slices
    pub fn dimension_name(self) -> &'static str {
        match self {
            Axis::X => "width",
            Axis::Z => "depth",
        }
    }
}

/// A box in world space: minimum corner plus extent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockGeometry {
    pub position: Vec3,
    pub dimension: Vec3,
}

impl BlockGeometry {
    pub fn new(position: Vec3, dimension: Vec3) -> Self {
        Self {
            position,
            dimension,
        }
    }

    /// Horizontal footprint (width × depth)
    #[inline]
    pub fn footprint(&self) -> f32 {
        self.dimension.x * self.dimension.z
    }
}

/// Overlap of an active block against its target along one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    /// Fraction of the target's span covered, in [0, 1]
    pub ratio: f32,
    /// Signed overlap length; zero or negative means no contact
    pub raw: f32,
}

/// Measure how much of `target` the `active` block covers along `axis`
pub fn compute_overlap(axis: Axis, active: &BlockGeometry, target: &BlockGeometry) -> Overlap {
    let span = axis.component(target.dimension);
    let offset = axis.component(active.position) - axis.component(target.position);
    let raw = span - offset.abs();
    let ratio = if span > 0.0 {
        (raw.max(0.0) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };
    Overlap { ratio, raw }
}

/// The two pieces an active block splits into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split {
    pub kept: BlockGeometry,
    /// None on a perfect snap
    pub chopped: Option<BlockGeometry>,
    pub perfect: bool,
}

/// Slice `active` into the piece resting on `target` and the piece hanging off.
///
/// Only meaningful for `raw_overlap > 0`. When the leftover span is under
/// `snap_threshold` the kept piece takes the target's footprint exactly.
pub fn split_block(
    axis: Axis,
    active: &BlockGeometry,
    target: &BlockGeometry,
    raw_overlap: f32,
    snap_threshold: f32,
) -> Split {
    debug_assert!(raw_overlap > 0.0, "split_block called without overlap");

    let span = axis.component(active.dimension);
    if span - raw_overlap < snap_threshold {
        let kept = BlockGeometry::new(
            Vec3::new(target.position.x, active.position.y, target.position.z),
            Vec3::new(target.dimension.x, active.dimension.y, target.dimension.z),
        );
        return Split {
            kept,
            chopped: None,
            perfect: true,
        };
    }

    let mut kept = *active;
    let mut chopped = *active;
    axis.set_component(&mut kept.dimension, raw_overlap);
    axis.set_component(&mut chopped.dimension, span - raw_overlap);

    let active_coord = axis.component(active.position);
    let target_coord = axis.component(target.position);
    if active_coord < target_coord {
        // Hanging off the low side: kept piece starts where the target starts
        axis.set_component(&mut kept.position, target_coord);
    } else {
        axis.set_component(&mut chopped.position, active_coord + raw_overlap);
    }

    Split {
        kept,
        chopped: Some(chopped),
        perfect: false,
    }
}

/// Outcome of placing one block, produced exactly once per block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementResult {
    pub index: u32,
    pub axis: Axis,
    pub overlap_ratio: f32,
    pub raw_overlap: f32,
    /// `round(overlap_ratio × 1000)`
    pub precision_score: u32,
    pub is_perfect: bool,
    pub original_area: f32,
    pub placed_area: f32,
    pub area_lost: f32,
    pub placed_geometry: Option<BlockGeometry>,
    pub chopped_geometry: Option<BlockGeometry>,
}

impl PlacementResult {
    /// The foundation has no target and always lands whole
    pub fn foundation(index: u32, geometry: BlockGeometry) -> Self {
        let area = geometry.footprint();
        Self {
            index,
            axis: Axis::for_index(index),
            overlap_ratio: 1.0,
            raw_overlap: Axis::for_index(index).component(geometry.dimension),
            precision_score: 1000,
            is_perfect: true,
            original_area: area,
            placed_area: area,
            area_lost: 0.0,
            placed_geometry: Some(geometry),
            chopped_geometry: None,
        }
    }

    /// Resolve a placement of `active` onto `target`
    pub fn resolve(
        index: u32,
        active: &BlockGeometry,
        target: &BlockGeometry,
        snap_threshold: f32,
    ) -> Self {
        let axis = Axis::for_index(index);
        let overlap = compute_overlap(axis, active, target);
        let original_area = active.footprint();

        if overlap.raw <= 0.0 {
            return Self {
                index,
                axis,
                overlap_ratio: 0.0,
                raw_overlap: overlap.raw,
                precision_score: 0,
                is_perfect: false,
                original_area,
                placed_area: 0.0,
                area_lost: original_area,
                placed_geometry: None,
                chopped_geometry: Some(*active),
            };
        }

        let split = split_block(axis, active, target, overlap.raw, snap_threshold);
        let overlap_ratio = if split.perfect { 1.0 } else { overlap.ratio };
        let placed_area = split.kept.footprint();
        Self {
            index,
            axis,
            overlap_ratio,
            raw_overlap: overlap.raw,
            precision_score: precision_score(overlap_ratio),
            is_perfect: split.perfect,
            original_area,
            placed_area,
            area_lost: (original_area - placed_area).max(0.0),
            placed_geometry: Some(split.kept),
            chopped_geometry: split.chopped,
        }
    }

    /// A placement counts when any part of the block rests on its target
    #[inline]
    pub fn is_success(&self) -> bool {
        self.raw_overlap > 0.0
    }
}

/// Integer precision on a 0..=1000 scale
#[inline]
pub fn precision_score(overlap_ratio: f32) -> u32 {
    (overlap_ratio.clamp(0.0, 1.0) * 1000.0).round() as u32
}
