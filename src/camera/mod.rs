//! Look-at camera with perspective or orthographic projection.
//!
//! Provides the two operations the viewer needs every frame:
//!   - `ray`: NDC pointer position → world-space ray (picking)
//!   - `project`: world point → NDC + depth (painting)

pub mod orbit;

use glam::DVec3;

/// Vertical field of view of the perspective camera, degrees.
pub const PERSPECTIVE_FOV_DEG: f64 = 50.0;
pub const NEAR: f64 = 0.1;
pub const FAR: f64 = 1000.0;

/// Projection of a camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective { fov_y_deg: f64, aspect: f64 },
    /// `height` is the full vertical extent of the view volume.
    Orthographic { height: f64, aspect: f64 },
}

impl Projection {
    pub fn is_perspective(&self) -> bool {
        matches!(self, Projection::Perspective { .. })
    }

    pub fn aspect(&self) -> f64 {
        match *self {
            Projection::Perspective { aspect, .. } | Projection::Orthographic { aspect, .. } => aspect,
        }
    }
}

/// A ray `origin + t·direction`, `direction` normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub direction: DVec3,
}

impl Ray {
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }

    /// Rotate the ray about the world Y axis by `angle` radians.
    pub fn rotated_y(&self, angle: f64) -> Ray {
        Ray {
            origin: rotate_y(self.origin, angle),
            direction: rotate_y(self.direction, angle),
        }
    }
}

/// Rotate `v` about +Y by `angle` (right-handed, X towards −Z).
pub fn rotate_y(v: DVec3, angle: f64) -> DVec3 {
    let (s, c) = angle.sin_cos();
    DVec3::new(c * v.x + s * v.z, v.y, -s * v.x + c * v.z)
}

/// Pixel-space viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    /// Pixel coordinates (origin top-left) → NDC in `[-1, 1]`, +Y up.
    pub fn to_ndc(&self, x: f64, y: f64) -> (f64, f64) {
        (x / self.width * 2.0 - 1.0, -(y / self.height) * 2.0 + 1.0)
    }

    /// NDC → pixel coordinates.
    pub fn from_ndc(&self, x: f64, y: f64) -> (f64, f64) {
        ((x + 1.0) * 0.5 * self.width, (1.0 - y) * 0.5 * self.height)
    }
}

/// A positioned camera looking at a target with world up = +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: DVec3,
    pub target: DVec3,
    pub projection: Projection,
}

impl Camera {
    /// Unit view direction.
    pub fn forward(&self) -> DVec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Unit screen-right direction.
    pub fn right(&self) -> DVec3 {
        self.forward().cross(DVec3::Y).normalize_or_zero()
    }

    /// Unit screen-up direction.
    pub fn up(&self) -> DVec3 {
        self.right().cross(self.forward())
    }

    /// World-space ray through the NDC point `(x, y)`.
    pub fn ray(&self, x: f64, y: f64) -> Ray {
        let (forward, right, up) = (self.forward(), self.right(), self.up());
        match self.projection {
            Projection::Perspective { fov_y_deg, aspect } => {
                let tan_half = (fov_y_deg.to_radians() * 0.5).tan();
                let direction = (forward + right * (x * tan_half * aspect) + up * (y * tan_half)).normalize();
                Ray {
                    origin: self.position,
                    direction,
                }
            }
            Projection::Orthographic { height, aspect } => {
                let half_h = height * 0.5;
                let origin = self.position + right * (x * half_h * aspect) + up * (y * half_h);
                Ray {
                    origin,
                    direction: forward,
                }
            }
        }
    }

    /// Project a world point to NDC. The third component is the view depth.
    /// Returns `None` for points outside the near/far range.
    pub fn project(&self, point: DVec3) -> Option<DVec3> {
        let rel = point - self.position;
        let depth = rel.dot(self.forward());
        if !(NEAR..=FAR).contains(&depth) {
            return None;
        }
        let sx = rel.dot(self.right());
        let sy = rel.dot(self.up());
        match self.projection {
            Projection::Perspective { fov_y_deg, aspect } => {
                let tan_half = (fov_y_deg.to_radians() * 0.5).tan();
                Some(DVec3::new(
                    sx / (depth * tan_half * aspect),
                    sy / (depth * tan_half),
                    depth,
                ))
            }
            Projection::Orthographic { height, aspect } => {
                let half_h = height * 0.5;
                Some(DVec3::new(sx / (half_h * aspect), sy / half_h, depth))
            }
        }
    }

    /// World units per NDC unit (vertically) at `depth`; used to size sprites.
    pub fn world_per_ndc(&self, depth: f64) -> f64 {
        match self.projection {
            Projection::Perspective { fov_y_deg, .. } => depth * (fov_y_deg.to_radians() * 0.5).tan(),
            Projection::Orthographic { height, .. } => height * 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cam(projection: Projection) -> Camera {
        Camera {
            position: DVec3::new(0.0, 0.0, 10.0),
            target: DVec3::ZERO,
            projection,
        }
    }

    #[test]
    fn basis_is_orthonormal() {
        let c = Camera {
            position: DVec3::new(3.0, 7.0, -4.0),
            target: DVec3::new(1.0, 0.0, 2.0),
            projection: Projection::Perspective { fov_y_deg: 50.0, aspect: 1.5 },
        };
        let (f, r, u) = (c.forward(), c.right(), c.up());
        assert!((f.length() - 1.0).abs() < 1e-12);
        assert!((r.length() - 1.0).abs() < 1e-12);
        assert!((u.length() - 1.0).abs() < 1e-12);
        assert!(f.dot(r).abs() < 1e-12 && f.dot(u).abs() < 1e-12 && r.dot(u).abs() < 1e-12);
        assert!(u.y > 0.0);
    }

    #[test]
    fn center_ray_hits_target() {
        let c = cam(Projection::Perspective { fov_y_deg: 50.0, aspect: 2.0 });
        let ray = c.ray(0.0, 0.0);
        assert!((ray.at(10.0) - DVec3::ZERO).length() < 1e-12);
    }

    #[test]
    fn project_inverts_ray() {
        for projection in [
            Projection::Perspective { fov_y_deg: 50.0, aspect: 1.6 },
            Projection::Orthographic { height: 20.0, aspect: 1.6 },
        ] {
            let c = cam(projection);
            let ray = c.ray(0.3, -0.45);
            let p = ray.at(7.0);
            let ndc = c.project(p).unwrap();
            assert!((ndc.x - 0.3).abs() < 1e-9, "{:?}", projection);
            assert!((ndc.y + 0.45).abs() < 1e-9, "{:?}", projection);
        }
    }

    #[test]
    fn orthographic_rays_are_parallel() {
        let c = cam(Projection::Orthographic { height: 20.0, aspect: 1.0 });
        let a = c.ray(-1.0, 1.0);
        let b = c.ray(1.0, -1.0);
        assert_eq!(a.direction, b.direction);
        assert!((a.origin - DVec3::new(-10.0, 10.0, 10.0)).length() < 1e-9);
    }

    #[test]
    fn points_behind_camera_are_not_projected() {
        let c = cam(Projection::Perspective { fov_y_deg: 50.0, aspect: 1.0 });
        assert!(c.project(DVec3::new(0.0, 0.0, 20.0)).is_none());
    }

    #[test]
    fn viewport_ndc_round_trip() {
        let vp = Viewport::new(800.0, 600.0);
        assert_eq!(vp.to_ndc(0.0, 0.0), (-1.0, 1.0));
        assert_eq!(vp.to_ndc(800.0, 600.0), (1.0, -1.0));
        let (x, y) = vp.from_ndc(0.25, -0.5);
        let (nx, ny) = vp.to_ndc(x, y);
        assert!((nx - 0.25).abs() < 1e-12 && (ny + 0.5).abs() < 1e-12);
    }

    #[test]
    fn rotate_y_quarter_turn() {
        let v = rotate_y(DVec3::X, std::f64::consts::FRAC_PI_2);
        assert!((v - DVec3::new(0.0, 0.0, -1.0)).length() < 1e-12);
    }
}
