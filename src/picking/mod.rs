//! Ray picking against placed items.
//!
//! Blocks are tested as oriented cubes, discs as capped cylinders. Every
//! candidate is independent, so the tests fan out over rayon and the nearest
//! hit wins.

pub mod tooltip;

use glam::DVec3;
use rayon::prelude::*;

use crate::camera::{rotate_y, Ray};
use crate::scene::{ItemKind, PlacedItem, Shape};

/// Items the picker may hit, plus the transforms applied at draw time.
#[derive(Debug, Clone, Copy)]
pub struct PickScene<'a> {
    pub blocks: &'a [PlacedItem],
    pub discs: &'a [PlacedItem],
    /// Blocks past this count are hidden (visibility slider / replay)
    pub visible_blocks: usize,
    /// Auto-rotation of the whole scene about +Y
    pub scene_yaw: f64,
    /// Disc scale from the camera-tilt fade
    pub disc_scale: f64,
}

/// Which item a ray hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Block(usize),
    Disc(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub target: HitTarget,
    /// Distance along the ray
    pub distance: f64,
}

impl Hit {
    pub fn item<'a>(&self, scene: &PickScene<'a>) -> Option<&'a PlacedItem> {
        match self.target {
            HitTarget::Block(i) => scene.blocks.get(i),
            HitTarget::Disc(i) => scene.discs.get(i),
        }
    }
}

/// What a double-click asks the host to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationRequest {
    /// Load the given adjustment epoch
    Epoch(u64),
    /// Show the block at this height
    Block(u64),
}

impl NavigationRequest {
    pub fn for_item(item: &PlacedItem) -> Self {
        match item.kind {
            ItemKind::Block(info) => NavigationRequest::Block(info.height),
            ItemKind::Disc(info) => NavigationRequest::Epoch(info.epoch),
        }
    }
}

/// Nearest item hit by `ray` (world space), or `None`.
pub fn pick(scene: &PickScene<'_>, ray: &Ray) -> Option<Hit> {
    let local = ray.rotated_y(-scene.scene_yaw);
    let visible = scene.visible_blocks.min(scene.blocks.len());

    let block_hit = scene.blocks[..visible]
        .par_iter()
        .enumerate()
        .filter_map(|(i, item)| {
            intersect(item, &local, 1.0).map(|distance| Hit {
                target: HitTarget::Block(i),
                distance,
            })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance));

    let disc_hit = scene
        .discs
        .par_iter()
        .enumerate()
        .filter_map(|(i, item)| {
            intersect(item, &local, scene.disc_scale).map(|distance| Hit {
                target: HitTarget::Disc(i),
                distance,
            })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance));

    match (block_hit, disc_hit) {
        (Some(a), Some(b)) => Some(if b.distance < a.distance { b } else { a }),
        (a, b) => a.or(b),
    }
}

/// Ray parameter of the first intersection with `item` drawn at `scale`.
pub fn intersect(item: &PlacedItem, ray: &Ray, scale: f64) -> Option<f64> {
    if scale.is_nan() || scale <= 0.0 {
        return None;
    }
    // Into the item frame: translate, then undo its yaw.
    let yaw = item.rotation.yaw();
    let origin = rotate_y(ray.origin - item.position, -yaw);
    let direction = rotate_y(ray.direction, -yaw);

    match item.shape {
        Shape::Cube { edge } => ray_box(origin, direction, DVec3::splat(edge * scale * 0.5)),
        Shape::Cylinder { radius, height } => ray_cylinder(origin, direction, radius * scale, height * scale * 0.5),
    }
}

// ── Primitive tests (item-local frame) ──

/// Slab test against the box `[-half, half]`.
fn ray_box(o: DVec3, d: DVec3, half: DVec3) -> Option<f64> {
    let mut t_near = f64::NEG_INFINITY;
    let mut t_far = f64::INFINITY;

    for axis in 0..3 {
        let (oa, da, ha) = (o[axis], d[axis], half[axis]);
        if da.abs() < 1e-12 {
            if oa.abs() > ha {
                return None;
            }
            continue;
        }
        let t1 = (-ha - oa) / da;
        let t2 = (ha - oa) / da;
        t_near = t_near.max(t1.min(t2));
        t_far = t_far.min(t1.max(t2));
        if t_near > t_far {
            return None;
        }
    }

    nearest_forward(t_near, t_far)
}

/// Capped cylinder around +Y: `x² + z² ≤ r²`, `|y| ≤ half_h`.
fn ray_cylinder(o: DVec3, d: DVec3, r: f64, half_h: f64) -> Option<f64> {
    // Interval inside the infinite cylinder
    let a = d.x * d.x + d.z * d.z;
    let b = 2.0 * (o.x * d.x + o.z * d.z);
    let c = o.x * o.x + o.z * o.z - r * r;
    let (mut t_near, mut t_far) = if a < 1e-12 {
        if c > 0.0 {
            return None;
        }
        (f64::NEG_INFINITY, f64::INFINITY)
    } else {
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }
        let sq = disc.sqrt();
        ((-b - sq) / (2.0 * a), (-b + sq) / (2.0 * a))
    };

    // Intersect with the slab between the caps
    if d.y.abs() < 1e-12 {
        if o.y.abs() > half_h {
            return None;
        }
    } else {
        let t1 = (-half_h - o.y) / d.y;
        let t2 = (half_h - o.y) / d.y;
        t_near = t_near.max(t1.min(t2));
        t_far = t_far.min(t1.max(t2));
    }
    if t_near > t_far {
        return None;
    }

    nearest_forward(t_near, t_far)
}

fn nearest_forward(t_near: f64, t_far: f64) -> Option<f64> {
    if t_far < 0.0 {
        None
    } else if t_near >= 0.0 {
        Some(t_near)
    } else {
        Some(t_far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{Camera, Projection};
    use crate::data::BlockRecord;
    use crate::scene::discs::{place_discs, DiscConfig};
    use crate::scene::spiral::{layout_blocks, SpiralConfig};
    use crate::scene::{BlockInfo, Rgb, Rotation};
    use std::f64::consts::FRAC_PI_4;

    fn cube_at(position: DVec3, yaw: f64, index: usize) -> PlacedItem {
        PlacedItem {
            position,
            rotation: Rotation::Yaw(yaw),
            shape: Shape::Cube { edge: 0.3 },
            color: Rgb::WHITE,
            opacity: 0.8,
            kind: ItemKind::Block(BlockInfo {
                index,
                height: 840_000 + index as u64,
                time_difference: 600,
                size: 1000,
                time: 0,
                n_tx: 1,
            }),
        }
    }

    fn scene<'a>(blocks: &'a [PlacedItem], discs: &'a [PlacedItem]) -> PickScene<'a> {
        PickScene {
            blocks,
            discs,
            visible_blocks: blocks.len(),
            scene_yaw: 0.0,
            disc_scale: 1.0,
        }
    }

    fn down_ray(x: f64, z: f64) -> Ray {
        Ray {
            origin: DVec3::new(x, 50.0, z),
            direction: DVec3::NEG_Y,
        }
    }

    #[test]
    fn empty_scene_has_no_hit() {
        let ray = down_ray(0.0, 0.0);
        assert!(pick(&scene(&[], &[]), &ray).is_none());
    }

    #[test]
    fn nearest_block_wins() {
        let blocks = vec![
            cube_at(DVec3::new(0.0, 0.0, -5.0), 0.0, 0),
            cube_at(DVec3::new(0.0, 0.0, -2.0), 0.0, 1),
            cube_at(DVec3::new(0.0, 0.0, -9.0), 0.0, 2),
        ];
        let ray = Ray {
            origin: DVec3::ZERO,
            direction: DVec3::NEG_Z,
        };
        let hit = pick(&scene(&blocks, &[]), &ray).unwrap();
        assert_eq!(hit.target, HitTarget::Block(1));
        assert!((hit.distance - 1.85).abs() < 1e-9);
    }

    #[test]
    fn cube_yaw_is_respected() {
        // Rotated 45°, the corner reaches further than the face would.
        let blocks = vec![cube_at(DVec3::ZERO, FRAC_PI_4, 0)];
        let s = scene(&blocks, &[]);
        assert!(pick(&s, &down_ray(0.2, 0.0)).is_some());
        let aligned = vec![cube_at(DVec3::ZERO, 0.0, 0)];
        assert!(pick(&scene(&aligned, &[]), &down_ray(0.2, 0.0)).is_none());
    }

    #[test]
    fn hidden_blocks_are_skipped() {
        let blocks = vec![cube_at(DVec3::ZERO, 0.0, 0), cube_at(DVec3::new(3.0, 0.0, 0.0), 0.0, 1)];
        let mut s = scene(&blocks, &[]);
        s.visible_blocks = 1;
        assert!(pick(&s, &down_ray(3.0, 0.0)).is_none());
        assert!(pick(&s, &down_ray(0.0, 0.0)).is_some());
    }

    #[test]
    fn scene_yaw_is_undone() {
        let blocks = vec![cube_at(DVec3::new(5.0, 0.0, 0.0), 0.0, 0)];
        let mut s = scene(&blocks, &[]);
        s.scene_yaw = std::f64::consts::FRAC_PI_2;
        // (5,0,0) rotated a quarter turn about +Y lands at (0,0,-5)
        assert!(pick(&s, &down_ray(0.0, -5.0)).is_some());
        assert!(pick(&s, &down_ray(5.0, 0.0)).is_none());
    }

    #[test]
    fn disc_hit_from_above_and_side() {
        let discs = place_discs(10, None, &DiscConfig::default());
        let s = scene(&[], &discs);
        let hit = pick(&s, &down_ray(3.0, 4.0)).unwrap();
        // discs above the ray origin are behind it
        match hit.target {
            HitTarget::Disc(i) => assert_eq!(discs[i].position.y, 42.0),
            other => panic!("unexpected {:?}", other),
        }

        let side = Ray {
            origin: DVec3::new(100.0, -21.0, 0.0),
            direction: DVec3::NEG_X,
        };
        let hit = pick(&s, &side).unwrap();
        assert!((hit.distance - (100.0 - 23.1)).abs() < 1e-9);
        let item = hit.item(&s).unwrap();
        assert_eq!(NavigationRequest::for_item(item), NavigationRequest::Epoch(9));
    }

    #[test]
    fn shrunken_discs_are_not_hit() {
        let discs = place_discs(10, None, &DiscConfig::default());
        let mut s = scene(&[], &discs);
        s.disc_scale = 0.0;
        assert!(pick(&s, &down_ray(0.0, 0.0)).is_none());
        s.disc_scale = 0.5;
        assert!(pick(&s, &down_ray(15.0, 0.0)).is_none());
        assert!(pick(&s, &down_ray(10.0, 0.0)).is_some());
    }

    #[test]
    fn camera_ray_picks_laid_out_block() {
        let records: Vec<BlockRecord> = (0..20)
            .map(|i| BlockRecord {
                height: 100 + i,
                time: 0,
                n_tx: 1,
                size: 500,
                time_difference: 600,
            })
            .collect();
        let layout = layout_blocks(&records, &SpiralConfig::default()).unwrap();
        let target = layout.blocks[7].position;
        let camera = Camera {
            position: target + DVec3::new(0.0, 30.0, 0.01),
            target,
            projection: Projection::Perspective { fov_y_deg: 50.0, aspect: 1.5 },
        };
        let hit = pick(&scene(&layout.blocks, &[]), &camera.ray(0.0, 0.0)).unwrap();
        let item = hit.item(&scene(&layout.blocks, &[])).unwrap();
        assert_eq!(NavigationRequest::for_item(item), NavigationRequest::Block(107));
    }
}
