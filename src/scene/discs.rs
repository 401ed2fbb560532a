//! Epoch discs stacked above (future) and below (past) the spiral.
//!
//! Discs are navigation handles: double-clicking one loads that epoch. They
//! do not depend on the block count, only on the displayed epoch and on how
//! far the chain tip is.

use glam::DVec3;

use crate::data::MAX_EPOCH;
use crate::scene::{DiscEra, DiscInfo, ItemKind, PlacedItem, Rgb, Rotation, Shape};

/// Tunables of the disc stacks.
#[derive(Debug, Clone)]
pub struct DiscConfig {
    pub radius: f64,
    pub thickness: f64,
    /// Vertical distance between discs and from the spiral to the first disc
    pub spacing: f64,
    /// Maximum discs per stack
    pub max_per_side: u64,
    /// Opacity of the disc closest to the spiral
    pub base_opacity: f64,
    /// Opacity lost per slot away from the spiral
    pub opacity_step: f64,
    pub future_color: Rgb,
    pub past_color: Rgb,
}

impl Default for DiscConfig {
    fn default() -> Self {
        Self {
            radius: 21.0 * 1.1,
            thickness: 0.5,
            spacing: 21.0,
            max_per_side: 5,
            base_opacity: 0.1,
            opacity_step: 0.02,
            future_color: Rgb::WHITE,
            past_color: Rgb::grey(0.8),
        }
    }
}

/// Number of future discs for `current`, given the chain tip epoch if known.
/// Never reaches past [`MAX_EPOCH`].
pub fn future_disc_count(current: u64, tip_epoch: Option<u64>, cfg: &DiscConfig) -> u64 {
    let last = tip_epoch.unwrap_or(MAX_EPOCH).min(MAX_EPOCH);
    last.saturating_sub(current).min(cfg.max_per_side)
}

/// Number of past discs for `current` (never reaches below epoch 0).
pub fn past_disc_count(current: u64, cfg: &DiscConfig) -> u64 {
    current.min(cfg.max_per_side)
}

fn disc(cfg: &DiscConfig, y: f64, slot: usize, epoch: u64, era: DiscEra) -> PlacedItem {
    PlacedItem {
        position: DVec3::new(0.0, y, 0.0),
        rotation: Rotation::Flip,
        shape: Shape::Cylinder {
            radius: cfg.radius,
            height: cfg.thickness,
        },
        color: match era {
            DiscEra::Future => cfg.future_color,
            DiscEra::Past => cfg.past_color,
        },
        opacity: cfg.base_opacity - slot as f64 * cfg.opacity_step,
        kind: ItemKind::Disc(DiscInfo { epoch, era, slot }),
    }
}

/// Build the future stack (`current+1 ..`) followed by the past stack (`current-1 ..`).
pub fn place_discs(current: u64, tip_epoch: Option<u64>, cfg: &DiscConfig) -> Vec<PlacedItem> {
    let n_future = future_disc_count(current, tip_epoch, cfg);
    let n_past = past_disc_count(current, cfg);

    let mut discs = Vec::with_capacity((n_future + n_past) as usize);
    for i in 0..n_future {
        let y = cfg.spacing + i as f64 * cfg.spacing;
        discs.push(disc(cfg, y, i as usize, current + i + 1, DiscEra::Future));
    }
    for i in 0..n_past {
        let y = -cfg.spacing - i as f64 * cfg.spacing;
        discs.push(disc(cfg, y, i as usize, current - i - 1, DiscEra::Past));
    }

    log::debug!(
        "discs: epoch {} -> {} future, {} past (tip {:?})",
        current,
        n_future,
        n_past,
        tip_epoch
    );
    discs
}

// ── Camera-tilt fade ──

const FADE_START_DEG: f64 = 60.0;
const SCALE_START_DEG: f64 = 40.0;
const FADE_END_UP_DEG: f64 = 30.0;
const FADE_END_DOWN_DEG: f64 = 150.0;

/// Opacity factor and scale for all discs at camera polar angle `phi`.
///
/// Looking steeply down (or up) through the stacks hides the spiral, so the
/// discs fade out below 60° (above 120°) and shrink below 40° (above 140°);
/// both reach zero at 30° (150°).
pub fn disc_fade(phi: f64) -> (f64, f64) {
    let deg = phi.to_degrees();
    let mut opacity = 1.0;
    let mut scale = 1.0;

    if deg < FADE_START_DEG {
        let fade = (FADE_START_DEG - deg).max(0.0) / (FADE_START_DEG - FADE_END_UP_DEG);
        opacity = (1.0 - fade).max(0.0);
        if deg < SCALE_START_DEG {
            let s = (SCALE_START_DEG - deg).max(0.0) / (SCALE_START_DEG - FADE_END_UP_DEG);
            scale = (1.0 - s).max(0.0);
        }
    } else if deg > 180.0 - FADE_START_DEG {
        let start = 180.0 - FADE_START_DEG;
        let fade = (deg - start).max(0.0) / (FADE_END_DOWN_DEG - start);
        opacity = (1.0 - fade).max(0.0);
        let scale_start = 180.0 - SCALE_START_DEG;
        if deg > scale_start {
            let s = (deg - scale_start).max(0.0) / (FADE_END_DOWN_DEG - scale_start);
            scale = (1.0 - s).max(0.0);
        }
    }

    (opacity, scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(discs: &[PlacedItem]) -> (usize, usize) {
        let future = discs
            .iter()
            .filter(|d| d.disc_info().map(|i| i.era) == Some(DiscEra::Future))
            .count();
        (future, discs.len() - future)
    }

    #[test]
    fn epoch_zero_has_no_past() {
        let discs = place_discs(0, None, &DiscConfig::default());
        assert_eq!(counts(&discs), (5, 0));
    }

    #[test]
    fn past_stack_is_clipped_at_genesis() {
        let discs = place_discs(3, None, &DiscConfig::default());
        assert_eq!(counts(&discs), (5, 3));
        let past: Vec<u64> = discs
            .iter()
            .filter_map(|d| d.disc_info())
            .filter(|i| i.era == DiscEra::Past)
            .map(|i| i.epoch)
            .collect();
        assert_eq!(past, vec![2, 1, 0]);
    }

    #[test]
    fn stacks_never_exceed_cap() {
        let discs = place_discs(10, None, &DiscConfig::default());
        assert_eq!(counts(&discs), (5, 5));
    }

    #[test]
    fn future_stack_stops_at_chain_tip() {
        let cfg = DiscConfig::default();
        assert_eq!(counts(&place_discs(450, Some(452), &cfg)), (2, 5));
        assert_eq!(counts(&place_discs(452, Some(452), &cfg)), (0, 5));
        assert_eq!(counts(&place_discs(100, Some(452), &cfg)), (5, 5));
    }

    #[test]
    fn future_stack_stops_at_last_epoch() {
        let cfg = DiscConfig::default();
        assert_eq!(counts(&place_discs(MAX_EPOCH - 2, None, &cfg)), (2, 5));
        assert_eq!(counts(&place_discs(MAX_EPOCH, Some(u64::MAX), &cfg)), (0, 5));
        let top = place_discs(MAX_EPOCH - 1, None, &cfg);
        assert_eq!(top[0].disc_info().unwrap().epoch, MAX_EPOCH);
    }

    #[test]
    fn offsets_and_opacity() {
        let discs = place_discs(7, None, &DiscConfig::default());
        let future: Vec<_> = discs.iter().filter(|d| d.position.y > 0.0).collect();
        let ys: Vec<f64> = future.iter().map(|d| d.position.y).collect();
        assert_eq!(ys, vec![21.0, 42.0, 63.0, 84.0, 105.0]);
        let ops: Vec<f64> = future.iter().map(|d| d.opacity).collect();
        for (o, e) in ops.iter().zip([0.1, 0.08, 0.06, 0.04, 0.02]) {
            assert!((o - e).abs() < 1e-12);
        }
        assert_eq!(future[0].disc_info().unwrap().epoch, 8);
        assert_eq!(future[0].color, Rgb::WHITE);

        let past: Vec<_> = discs.iter().filter(|d| d.position.y < 0.0).collect();
        assert_eq!(past[0].position.y, -21.0);
        assert_eq!(past[4].position.y, -105.0);
        assert_eq!(past[0].color, Rgb::grey(0.8));
        assert_eq!(past[0].rotation, Rotation::Flip);
    }

    #[test]
    fn fade_is_neutral_at_side_view() {
        assert_eq!(disc_fade(90f64.to_radians()), (1.0, 1.0));
        assert_eq!(disc_fade(std::f64::consts::FRAC_PI_3 + 0.01), (1.0, 1.0));
    }

    #[test]
    fn fade_reaches_zero_near_poles() {
        let (o, s) = disc_fade(30f64.to_radians());
        assert!(o.abs() < 1e-9 && s.abs() < 1e-9);
        let (o, s) = disc_fade(150f64.to_radians());
        assert!(o.abs() < 1e-9 && s.abs() < 1e-9);
        let (o, s) = disc_fade(0.1);
        assert_eq!((o, s), (0.0, 0.0));
    }

    #[test]
    fn fade_starts_before_scaling() {
        let (o, s) = disc_fade(50f64.to_radians());
        assert!((o - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(s, 1.0);
        let (o, s) = disc_fade(35f64.to_radians());
        assert!((o - 1.0 / 6.0).abs() < 1e-9);
        assert!((s - 0.5).abs() < 1e-9);
    }
}
