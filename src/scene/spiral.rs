//! Difficulty-epoch spiral: one cube per block on a flat spiral in the XZ plane.
//!
//! The spiral is `r = k·φ`. Walking along it, each block advances the arc
//! length by its inter-block time, so long gaps open visible spaces between
//! neighbours while a steady 10-minute cadence gives even spacing.
//!
//! Per record `i`:
//!   1. `block_distance` = time difference (0 for the first and last block)
//!   2. `arc_distance += block_distance · FACTOR_BLOCK_DISTANCE`
//!   3. `φ` = Newton solve of `φ² = arc_distance · k` (warm-started)
//!   4. `r = k·φ`, position `(r·sin φ, 0, r·cos φ)`, yaw `φ + π/2`
//!   5. grey level from the block size

use std::f64::consts::FRAC_PI_2;

use glam::DVec3;

use crate::data::{BlockRecord, BLOCKS_PER_EPOCH};
use crate::error::LayoutError;
use crate::scene::newton;
use crate::scene::{BlockInfo, ItemKind, PlacedItem, Rgb, Rotation, Shape};

pub const FACTOR_BLOCK_DISTANCE: f64 = 0.2;
pub const RADIUS_SPIRAL_START: f64 = 0.4;
pub const FACTOR_SPIRAL_GROWTH: f64 = 0.13;
pub const BLOCK_SIZE: f64 = 0.3;
pub const MIN_BRIGHTNESS: f64 = 20.0;
pub const MAX_BRIGHTNESS_SIZE: f64 = 5000.0;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SpiralConfig
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Tunables of the spiral layout.
#[derive(Debug, Clone)]
pub struct SpiralConfig {
    /// Arc length per second of inter-block time
    pub block_distance_factor: f64,
    /// Radius at which the spiral starts
    pub radius_start: f64,
    /// Radius growth per radian (`k`)
    pub growth: f64,
    /// Cube edge length
    pub block_size: f64,
    /// Brightness of an empty block (0–255 scale)
    pub min_brightness: f64,
    /// Size in bytes that adds a full 256 to the brightness
    pub max_brightness_size: f64,
    pub block_opacity: f64,
    /// Hard cap on placed blocks
    pub max_blocks: usize,
}

impl Default for SpiralConfig {
    fn default() -> Self {
        Self {
            block_distance_factor: FACTOR_BLOCK_DISTANCE,
            radius_start: RADIUS_SPIRAL_START,
            growth: FACTOR_SPIRAL_GROWTH,
            block_size: BLOCK_SIZE,
            min_brightness: MIN_BRIGHTNESS,
            max_brightness_size: MAX_BRIGHTNESS_SIZE,
            block_opacity: 0.8,
            max_blocks: BLOCKS_PER_EPOCH as usize,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SpiralState
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Running state carried from one block to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpiralState {
    /// Spiral angle parameter (radians)
    pub phi: f64,
    /// Accumulated arc length
    pub arc_distance: f64,
    /// `growth · phi`
    pub radius: f64,
}

impl SpiralState {
    /// Initial state: the angle at `radius_start` and the matching arc length
    /// `k·(asinh φ + φ·√(φ²+1))`, so the first block is not at the origin.
    pub fn seed(cfg: &SpiralConfig) -> Self {
        let phi = cfg.radius_start / cfg.growth;
        let arc_distance = cfg.growth * (phi.asinh() + phi * (phi * phi + 1.0).sqrt());
        Self {
            phi,
            arc_distance,
            radius: cfg.radius_start,
        }
    }

    /// Advance the arc length and re-solve the angle.
    pub fn advance(&mut self, block_distance: f64, cfg: &SpiralConfig) -> Result<(), LayoutError> {
        self.arc_distance += block_distance * cfg.block_distance_factor;
        self.phi = newton::solve(self.arc_distance, cfg.growth, self.phi)?;
        self.radius = cfg.growth * self.phi;
        Ok(())
    }

    /// Point on the spiral for the current angle.
    pub fn position(&self) -> DVec3 {
        DVec3::new(self.radius * self.phi.sin(), 0.0, self.radius * self.phi.cos())
    }
}

/// Grey level for a block of `size` bytes, clamped to the displayable range.
pub fn block_color(size: u64, cfg: &SpiralConfig) -> Rgb {
    let brightness = cfg.min_brightness + (size as f64 / cfg.max_brightness_size) * 256.0;
    Rgb::grey(brightness.min(255.0) / 255.0)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Layout
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Result of laying out one epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct SpiralLayout {
    pub blocks: Vec<PlacedItem>,
    /// Walk state right after placing each block, parallel to `blocks`
    pub states: Vec<SpiralState>,
    /// State after the last block (the seed for an empty epoch)
    pub final_state: SpiralState,
}

struct SpiralBuilder<'a> {
    cfg: &'a SpiralConfig,
    state: SpiralState,
    blocks: Vec<PlacedItem>,
    states: Vec<SpiralState>,
}

impl<'a> SpiralBuilder<'a> {
    fn new(cfg: &'a SpiralConfig, capacity: usize) -> Self {
        Self {
            cfg,
            state: SpiralState::seed(cfg),
            blocks: Vec::with_capacity(capacity),
            states: Vec::with_capacity(capacity),
        }
    }

    fn place(&mut self, index: usize, last: usize, record: &BlockRecord) -> Result<(), LayoutError> {
        let first = index == 0;
        let block_distance = if first || index == last {
            0.0
        } else {
            record.time_difference.max(0) as f64
        };

        self.state.advance(block_distance, self.cfg)?;
        self.states.push(self.state);

        self.blocks.push(PlacedItem {
            position: self.state.position(),
            rotation: Rotation::Yaw(self.state.phi + FRAC_PI_2),
            shape: Shape::Cube { edge: self.cfg.block_size },
            color: block_color(record.size, self.cfg),
            opacity: self.cfg.block_opacity,
            kind: ItemKind::Block(BlockInfo {
                index,
                height: record.height,
                time_difference: if first { 0 } else { record.time_difference },
                size: record.size,
                time: record.time,
                n_tx: record.n_tx,
            }),
        });
        Ok(())
    }
}

/// Lay out up to `cfg.max_blocks` records on the spiral.
///
/// A divergence in the root finder aborts the whole layout; no partial
/// spiral is ever returned.
pub fn layout_blocks(records: &[BlockRecord], cfg: &SpiralConfig) -> Result<SpiralLayout, LayoutError> {
    let count = records.len().min(cfg.max_blocks);
    if records.len() > count {
        log::debug!(
            "spiral: truncating {} records to {}",
            records.len(),
            count
        );
    }

    let mut builder = SpiralBuilder::new(cfg, count);
    let last = count.saturating_sub(1);
    for (i, record) in records[..count].iter().enumerate() {
        builder.place(i, last, record)?;
    }

    log::debug!(
        "spiral: placed {} blocks, arc={:.3}, radius={:.3}",
        builder.blocks.len(),
        builder.state.arc_distance,
        builder.state.radius
    );

    Ok(SpiralLayout {
        blocks: builder.blocks,
        states: builder.states,
        final_state: builder.state,
    })
}
