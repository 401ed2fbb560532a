//! Placed scene items: the output of the spiral layout and the disc placer.
//!
//! Every item carries a tagged payload so the picker and the renderer can
//! tell blocks from epoch discs with a plain `match`:
//!
//!   - `ItemKind::Block`: one block on the spiral, with its tooltip data
//!   - `ItemKind::Disc`: a past/future epoch disc, with its navigation target

pub mod discs;
pub mod newton;
pub mod spiral;

use glam::DVec3;

/// Linear RGB colour, each channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::grey(1.0);

    pub const fn grey(v: f64) -> Self {
        Self { r: v, g: v, b: v }
    }

    /// Channels as 8-bit values (for the painter).
    pub fn to_u8(self) -> [u8; 3] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }
}

/// Orientation of an item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rotation {
    /// Rotation about the vertical (Y) axis, radians.
    Yaw(f64),
    /// Half-turn about X. Discs are symmetric, so it only matters to renderers.
    Flip,
}

impl Rotation {
    /// Yaw component used for picking (a flip leaves a disc's footprint unchanged).
    pub fn yaw(self) -> f64 {
        match self {
            Rotation::Yaw(a) => a,
            Rotation::Flip => 0.0,
        }
    }
}

/// Tooltip/navigation data for a block. Never read by the layout math.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    /// 0-based position within the epoch
    pub index: usize,
    pub height: u64,
    /// Seconds since the previous block; 0 for the first block of the epoch
    pub time_difference: i64,
    pub size: u64,
    pub time: i64,
    pub n_tx: u64,
}

/// Which side of the displayed epoch a disc stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscEra {
    Past,
    Future,
}

/// Navigation data for an epoch disc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscInfo {
    /// Epoch this disc navigates to
    pub epoch: u64,
    pub era: DiscEra,
    /// Slot within its stack, 0 = closest to the spiral
    pub slot: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemKind {
    Block(BlockInfo),
    Disc(DiscInfo),
}

/// Geometry of an item, in its local frame before rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Axis-aligned cube of the given edge length
    Cube { edge: f64 },
    /// Vertical cylinder centred on the item position
    Cylinder { radius: f64, height: f64 },
}

/// A positioned, oriented, coloured block or disc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedItem {
    pub position: DVec3,
    pub rotation: Rotation,
    pub shape: Shape,
    pub color: Rgb,
    pub opacity: f64,
    pub kind: ItemKind,
}

impl PlacedItem {
    pub fn is_disc(&self) -> bool {
        matches!(self.kind, ItemKind::Disc(_))
    }

    pub fn block_info(&self) -> Option<&BlockInfo> {
        match &self.kind {
            ItemKind::Block(info) => Some(info),
            ItemKind::Disc(_) => None,
        }
    }

    pub fn disc_info(&self) -> Option<&DiscInfo> {
        match &self.kind {
            ItemKind::Disc(info) => Some(info),
            ItemKind::Block(_) => None,
        }
    }
}
