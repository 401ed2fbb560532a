//! Orbit camera controller as an explicit state machine.
//!
//! The camera sits on a sphere around `target`:
//!
//! ```text
//! position = target + distance · (sin φ cos θ, cos φ, sin φ sin θ)
//! ```
//!
//! Input is fed as [`CameraEvent`]s through the pure [`transition`] function,
//! which returns the next [`OrbitState`]. [`OrbitCameraController`] is a thin
//! owner around it for the viewer.
//!
//! - Drag: orbit (θ, φ), or pan the target when the pan modifier is held
//! - Wheel: dolly (perspective) or resize the view volume (orthographic)
//! - Pinch: multiplicative zoom
//! - Steps: the toolbar's fixed rotate/pan/zoom increments

use std::f64::consts::{FRAC_PI_3, PI};

use glam::DVec3;

use crate::camera::{Camera, Projection, PERSPECTIVE_FOV_DEG};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  OrbitConfig
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone)]
pub struct OrbitConfig {
    /// Radians per pixel of mouse drag
    pub rotate_speed_mouse: f64,
    /// Radians per pixel of touch drag
    pub rotate_speed_touch: f64,
    /// Pan per pixel, as a fraction of the camera distance (mouse)
    pub pan_speed_mouse: f64,
    /// Pan per pixel, as a fraction of the camera distance (touch)
    pub pan_speed_touch: f64,
    /// Zoom units per wheel delta unit
    pub wheel_speed: f64,
    pub phi_min: f64,
    pub phi_max: f64,
    pub distance_min: f64,
    pub distance_max: f64,
    /// Toolbar zoom keeps to a tighter range than the wheel
    pub step_distance_max: f64,
    pub ortho_zoom_min: f64,
    pub ortho_zoom_max: f64,
    pub step_rotate: f64,
    pub step_pan: f64,
    pub step_zoom: f64,
    /// Scene yaw speed while auto-rotating (rad/s)
    pub auto_rotate_speed: f64,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            rotate_speed_mouse: 0.05,
            rotate_speed_touch: 0.02,
            pan_speed_mouse: 0.001,
            pan_speed_touch: 0.002,
            wheel_speed: 0.1,
            phi_min: 0.1,
            phi_max: PI - 0.1,
            distance_min: 10.0,
            distance_max: 600.0,
            step_distance_max: 100.0,
            ortho_zoom_min: 5.0,
            ortho_zoom_max: 100.0,
            step_rotate: 0.2,
            step_pan: 0.5,
            step_zoom: 2.0,
            auto_rotate_speed: 0.1,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  State
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Perspective,
    Orthographic,
}

/// Spherical camera pose plus projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub target: DVec3,
    pub distance: f64,
    /// Polar angle from +Y
    pub phi: f64,
    /// Azimuth in the XZ plane
    pub theta: f64,
    /// Vertical extent of the orthographic view volume
    pub ortho_zoom: f64,
    pub mode: ProjectionMode,
    pub aspect: f64,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            target: DVec3::ZERO,
            distance: 80.0,
            phi: FRAC_PI_3,
            theta: 0.0,
            ortho_zoom: 20.0,
            mode: ProjectionMode::Perspective,
            aspect: 16.0 / 9.0,
        }
    }
}

impl CameraState {
    /// Cartesian camera position from the spherical pose.
    pub fn position(&self) -> DVec3 {
        let (sp, cp) = self.phi.sin_cos();
        let (st, ct) = self.theta.sin_cos();
        self.target + DVec3::new(sp * ct, cp, sp * st) * self.distance
    }

    pub fn projection(&self) -> Projection {
        match self.mode {
            ProjectionMode::Perspective => Projection::Perspective {
                fov_y_deg: PERSPECTIVE_FOV_DEG,
                aspect: self.aspect,
            },
            ProjectionMode::Orthographic => Projection::Orthographic {
                height: self.ortho_zoom,
                aspect: self.aspect,
            },
        }
    }

    /// Camera for this frame, looking at `target`.
    pub fn camera(&self) -> Camera {
        Camera {
            position: self.position(),
            target: self.target,
            projection: self.projection(),
        }
    }

    /// Pan axes: (`left`, `up`) in world space. Moving the target along
    /// `left` slides the scene towards screen-right.
    fn pan_axes(&self) -> (DVec3, DVec3) {
        let cam = self.camera();
        let left = DVec3::Y.cross(cam.forward()).normalize_or_zero();
        (left, cam.up())
    }
}

/// Pointer interaction mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragMode {
    Idle,
    Dragging { last_x: f64, last_y: f64 },
}

/// Complete controller state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitState {
    pub camera: CameraState,
    pub drag: DragMode,
    /// Ambient scene rotation; any direct manipulation switches it off
    pub auto_rotate: bool,
}

impl Default for OrbitState {
    fn default() -> Self {
        Self {
            camera: CameraState::default(),
            drag: DragMode::Idle,
            auto_rotate: true,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Events
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    Touch,
}

/// Fixed-increment toolbar commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepCommand {
    RotateLeft,
    RotateRight,
    RotateUp,
    RotateDown,
    PanLeft,
    PanRight,
    PanUp,
    PanDown,
    ZoomIn,
    ZoomOut,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraEvent {
    PointerDown { x: f64, y: f64 },
    /// `pan` is true while the pan modifier (shift/alt) is held.
    PointerMove { x: f64, y: f64, pan: bool, source: PointerSource },
    PointerUp,
    /// Raw wheel delta; positive when scrolling towards the user.
    Wheel { delta_y: f64 },
    /// Ratio start-distance / current-distance of a two-finger gesture.
    Pinch { factor: f64 },
    Step(StepCommand),
    Reset,
    ToggleProjection,
    SetAutoRotate(bool),
    Resize { aspect: f64 },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Transition
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Next controller state for `event`. Pure: no clocks, no I/O.
pub fn transition(state: &OrbitState, event: &CameraEvent, cfg: &OrbitConfig) -> OrbitState {
    let mut next = *state;
    let cam = &mut next.camera;

    match *event {
        CameraEvent::PointerDown { x, y } => {
            next.drag = DragMode::Dragging { last_x: x, last_y: y };
            next.auto_rotate = false;
        }
        CameraEvent::PointerMove { x, y, pan, source } => {
            if let DragMode::Dragging { last_x, last_y } = state.drag {
                let dx = x - last_x;
                let dy = y - last_y;
                if pan {
                    let speed = match source {
                        PointerSource::Mouse => cfg.pan_speed_mouse,
                        PointerSource::Touch => cfg.pan_speed_touch,
                    };
                    let (left, up) = cam.pan_axes();
                    cam.target += left * (dx * speed * cam.distance) + up * (dy * speed * cam.distance);
                } else {
                    let speed = match source {
                        PointerSource::Mouse => cfg.rotate_speed_mouse,
                        PointerSource::Touch => cfg.rotate_speed_touch,
                    };
                    cam.theta += dx * speed;
                    cam.phi = (cam.phi - dy * speed).clamp(cfg.phi_min, cfg.phi_max);
                }
                next.drag = DragMode::Dragging { last_x: x, last_y: y };
            }
        }
        CameraEvent::PointerUp => {
            next.drag = DragMode::Idle;
        }
        CameraEvent::Wheel { delta_y } => {
            if delta_y.is_finite() {
                next.auto_rotate = false;
                // Perspective dollies away on positive delta, orthographic grows
                // the view volume on negative delta.
                match cam.mode {
                    ProjectionMode::Perspective => {
                        cam.distance = (cam.distance + delta_y * cfg.wheel_speed)
                            .clamp(cfg.distance_min, cfg.distance_max);
                    }
                    ProjectionMode::Orthographic => {
                        cam.ortho_zoom = (cam.ortho_zoom - delta_y * cfg.wheel_speed)
                            .clamp(cfg.ortho_zoom_min, cfg.ortho_zoom_max);
                    }
                }
            }
        }
        CameraEvent::Pinch { factor } => {
            if factor.is_finite() && factor > 0.0 {
                next.auto_rotate = false;
                match cam.mode {
                    ProjectionMode::Perspective => {
                        cam.distance = (cam.distance * factor).clamp(cfg.distance_min, cfg.distance_max);
                    }
                    ProjectionMode::Orthographic => {
                        cam.ortho_zoom = (cam.ortho_zoom * factor).clamp(cfg.ortho_zoom_min, cfg.ortho_zoom_max);
                    }
                }
            }
        }
        CameraEvent::Step(step) => {
            next.auto_rotate = false;
            apply_step(cam, step, cfg);
        }
        CameraEvent::Reset => {
            cam.target = DVec3::ZERO;
            cam.distance = 50.0;
            cam.phi = FRAC_PI_3;
            cam.theta = 0.0;
        }
        CameraEvent::ToggleProjection => {
            // The pose is spherical, so position and target carry over as-is;
            // only the projection is rebuilt from the stored zoom values.
            cam.mode = match cam.mode {
                ProjectionMode::Perspective => ProjectionMode::Orthographic,
                ProjectionMode::Orthographic => ProjectionMode::Perspective,
            };
        }
        CameraEvent::SetAutoRotate(on) => {
            next.auto_rotate = on;
        }
        CameraEvent::Resize { aspect } => {
            if aspect.is_finite() && aspect > 0.0 {
                cam.aspect = aspect;
            }
        }
    }

    next
}

fn apply_step(cam: &mut CameraState, step: StepCommand, cfg: &OrbitConfig) {
    match step {
        StepCommand::RotateLeft => cam.theta -= cfg.step_rotate,
        StepCommand::RotateRight => cam.theta += cfg.step_rotate,
        StepCommand::RotateUp => cam.phi = (cam.phi - cfg.step_rotate).clamp(cfg.phi_min, cfg.phi_max),
        StepCommand::RotateDown => cam.phi = (cam.phi + cfg.step_rotate).clamp(cfg.phi_min, cfg.phi_max),
        StepCommand::PanLeft | StepCommand::PanRight => {
            let (left, _) = cam.pan_axes();
            let sign = if step == StepCommand::PanLeft { -1.0 } else { 1.0 };
            cam.target += left * (sign * cfg.step_pan);
        }
        StepCommand::PanUp | StepCommand::PanDown => {
            let (_, up) = cam.pan_axes();
            let sign = if step == StepCommand::PanUp { 1.0 } else { -1.0 };
            cam.target += up * (sign * cfg.step_pan);
        }
        StepCommand::ZoomIn | StepCommand::ZoomOut => {
            let sign = if step == StepCommand::ZoomIn { -1.0 } else { 1.0 };
            match cam.mode {
                ProjectionMode::Perspective => {
                    cam.distance = (cam.distance + sign * cfg.step_zoom)
                        .clamp(cfg.distance_min, cfg.step_distance_max);
                }
                ProjectionMode::Orthographic => {
                    cam.ortho_zoom = (cam.ortho_zoom + sign * cfg.step_zoom)
                        .clamp(cfg.ortho_zoom_min, cfg.ortho_zoom_max);
                }
            }
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Controller
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Owner of an [`OrbitState`] for the viewer session.
#[derive(Debug, Clone)]
pub struct OrbitCameraController {
    state: OrbitState,
    cfg: OrbitConfig,
}

impl OrbitCameraController {
    pub fn new(cfg: OrbitConfig) -> Self {
        Self {
            state: OrbitState::default(),
            cfg,
        }
    }

    pub fn handle(&mut self, event: CameraEvent) {
        self.state = transition(&self.state, &event, &self.cfg);
    }

    pub fn state(&self) -> &OrbitState {
        &self.state
    }

    pub fn config(&self) -> &OrbitConfig {
        &self.cfg
    }

    pub fn camera(&self) -> Camera {
        self.state.camera.camera()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state.drag, DragMode::Dragging { .. })
    }
}

impl Default for OrbitCameraController {
    fn default() -> Self {
        Self::new(OrbitConfig::default())
    }
}
