//! Touch Gesture Recognition
//!
//! Turns raw touch events into orbit camera events:
//! - One finger: orbit drag (touch sensitivity)
//! - Two fingers: pinch zoom, incremental per move
//! - Two touch starts within 300ms: camera reset
//!
//! Timestamps are passed in so the recognizer stays deterministic.

use std::time::{Duration, Instant};

use crate::camera::orbit::{CameraEvent, PointerSource};

/// Touch point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub x: f64,
    pub y: f64,
    pub id: u64,
}

/// Touch gesture state machine.
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    /// Current active touches
    touches: Vec<TouchPoint>,
    /// Finger distance at the previous pinch step
    pinch_distance: Option<f64>,
    /// Time of the last touch start (double-tap detection)
    last_start: Option<Instant>,
    double_tap: Duration,
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self {
            touches: Vec::with_capacity(4),
            pinch_distance: None,
            last_start: None,
            double_tap: Duration::from_millis(300),
        }
    }

    pub fn active_touches(&self) -> usize {
        self.touches.len()
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch_distance.is_some()
    }

    /// Process touch start event
    pub fn touch_start(&mut self, x: f64, y: f64, id: u64, now: Instant) -> Vec<CameraEvent> {
        let mut events = Vec::with_capacity(2);
        self.touches.retain(|t| t.id != id);
        self.touches.push(TouchPoint { x, y, id });

        match self.touches.len() {
            1 => events.push(CameraEvent::PointerDown { x, y }),
            2 => {
                self.pinch_distance = Some(self.finger_distance());
                events.push(CameraEvent::SetAutoRotate(false));
            }
            _ => {}
        }

        if let Some(last) = self.last_start {
            let gap = now.saturating_duration_since(last);
            if gap > Duration::ZERO && gap < self.double_tap {
                log::debug!("touch: double tap ({} ms), resetting camera", gap.as_millis());
                events.push(CameraEvent::Reset);
            }
        }
        self.last_start = Some(now);
        events
    }

    /// Process touch move event
    pub fn touch_move(&mut self, x: f64, y: f64, id: u64) -> Vec<CameraEvent> {
        let Some(touch) = self.touches.iter_mut().find(|t| t.id == id) else {
            return Vec::new();
        };
        touch.x = x;
        touch.y = y;

        match (self.touches.len(), self.pinch_distance) {
            (1, None) => vec![CameraEvent::PointerMove {
                x,
                y,
                pan: false,
                source: PointerSource::Touch,
            }],
            (2, Some(start)) => {
                let current = self.finger_distance();
                self.pinch_distance = Some(current);
                if current > f64::EPSILON && start > f64::EPSILON {
                    vec![CameraEvent::Pinch { factor: start / current }]
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }

    /// Process touch end event
    pub fn touch_end(&mut self, id: u64) -> Vec<CameraEvent> {
        self.touches.retain(|t| t.id != id);
        match self.touches.as_slice() {
            [] => {
                self.pinch_distance = None;
                vec![CameraEvent::PointerUp]
            }
            [remaining] => {
                // Back from a pinch to a single-finger orbit
                self.pinch_distance = None;
                vec![CameraEvent::PointerDown {
                    x: remaining.x,
                    y: remaining.y,
                }]
            }
            _ => Vec::new(),
        }
    }

    fn finger_distance(&self) -> f64 {
        match self.touches.as_slice() {
            [a, b, ..] => (a.x - b.x).hypot(a.y - b.y),
            _ => 0.0,
        }
    }
}
