//! Viewer session: the single owner of everything the viewer shows.
//!
//! Holds the orbit camera, the current scene snapshot and the pending epoch
//! load. Loads are identified by a [`LoadTicket`]; only the most recent
//! ticket may replace the snapshot, and the replacement is built completely
//! before it is swapped in.

use std::time::Duration;

use serde_json::Value;

use crate::camera::orbit::{CameraEvent, OrbitCameraController};
use crate::camera::{Camera, Viewport};
use crate::config::ViewerConfig;
use crate::data::{epoch_of_height, is_valid_epoch, parse_epoch_payload, ParseReport, MAX_EPOCH};
use crate::error::{FetchError, LoadError};
use crate::input::touch::GestureRecognizer;
use crate::picking::tooltip::{describe, Tooltip};
use crate::picking::{pick, Hit, HitTarget, NavigationRequest, PickScene};
use crate::playback::{BlockReplay, BlockVisibility, ReplaySpeed, ReplayToggle};
use crate::scene::discs::{disc_fade, place_discs, DiscConfig};
use crate::scene::spiral::{layout_blocks, SpiralConfig, SpiralState};
use crate::scene::PlacedItem;
use crate::stats::EpochStats;

/// Scale applied to the hovered item.
pub const HOVER_SCALE: f64 = 1.1;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Snapshot
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One fully built epoch scene. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSnapshot {
    pub epoch: u64,
    pub blocks: Vec<PlacedItem>,
    pub discs: Vec<PlacedItem>,
    pub stats: EpochStats,
    pub report: ParseReport,
    pub final_state: SpiralState,
}

impl SceneSnapshot {
    /// Parse, lay out and summarize one epoch payload.
    pub fn build(
        epoch: u64,
        payload: &Value,
        tip_epoch: Option<u64>,
        spiral: &SpiralConfig,
        discs: &DiscConfig,
    ) -> Result<Self, LoadError> {
        let batch = parse_epoch_payload(payload).ok_or(LoadError::MissingBlocks { epoch })?;
        if !batch.report.is_clean() {
            log::warn!(
                "epoch {}: {} field(s) missing or malformed across {} records, fallbacks used",
                epoch,
                batch.report.fallbacks(),
                batch.report.records
            );
        }

        let layout = layout_blocks(&batch.records, spiral)?;
        let stats = EpochStats::compute(epoch, &batch.records, &batch.report);

        Ok(Self {
            epoch,
            blocks: layout.blocks,
            discs: place_discs(epoch, tip_epoch, discs),
            stats,
            report: batch.report,
            final_state: layout.final_state,
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Load lifecycle
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Identifies one epoch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub epoch: u64,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The snapshot was replaced
    Applied,
    /// A newer request superseded this one; nothing changed
    Discarded,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ViewerSession
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct ViewerSession {
    cfg: ViewerConfig,
    camera: OrbitCameraController,
    touch: GestureRecognizer,
    viewport: Viewport,
    snapshot: Option<SceneSnapshot>,
    pending: Option<LoadTicket>,
    generation: u64,
    tip_epoch: Option<u64>,
    visibility: BlockVisibility,
    replay: BlockReplay,
    /// Accumulated auto-rotation of the scene about +Y
    scene_yaw: f64,
    hovered: Option<HitTarget>,
    last_error: Option<String>,
}

impl ViewerSession {
    pub fn new(cfg: ViewerConfig) -> Self {
        let camera = OrbitCameraController::new(cfg.orbit.clone());
        Self {
            cfg,
            camera,
            touch: GestureRecognizer::new(),
            viewport: Viewport::new(1280.0, 720.0),
            snapshot: None,
            pending: None,
            generation: 0,
            tip_epoch: None,
            visibility: BlockVisibility::new(0),
            replay: BlockReplay::default(),
            scene_yaw: 0.0,
            hovered: None,
            last_error: None,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.cfg
    }

    // ── Loading ──

    /// Start loading `epoch`. Any earlier pending request becomes stale.
    ///
    /// Epochs past [`MAX_EPOCH`] are rejected; the current request, if any,
    /// stays pending.
    pub fn request_epoch(&mut self, epoch: u64) -> Result<LoadTicket, LoadError> {
        if !is_valid_epoch(epoch) {
            let err = LoadError::EpochOutOfRange { epoch, max: MAX_EPOCH };
            log::warn!("{}", err);
            self.last_error = Some(err.to_string());
            return Err(err);
        }
        self.generation += 1;
        let ticket = LoadTicket {
            epoch,
            generation: self.generation,
        };
        if let Some(old) = self.pending.replace(ticket) {
            log::debug!("epoch {} request superseded by epoch {}", old.epoch, epoch);
        }
        log::info!("requesting epoch {} (generation {})", epoch, ticket.generation);
        Ok(ticket)
    }

    /// Apply the result of a fetch started with `ticket`.
    ///
    /// Stale tickets are discarded. On error the current snapshot stays as it
    /// was and the error is returned (and kept for the status line).
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Value, FetchError>,
    ) -> Result<LoadOutcome, LoadError> {
        if self.pending != Some(ticket) {
            log::warn!(
                "discarding stale result for epoch {} (generation {})",
                ticket.epoch,
                ticket.generation
            );
            return Ok(LoadOutcome::Discarded);
        }
        self.pending = None;

        let built = result.map_err(LoadError::from).and_then(|payload| {
            SceneSnapshot::build(ticket.epoch, &payload, self.tip_epoch, &self.cfg.spiral, &self.cfg.discs)
        });

        match built {
            Ok(snapshot) => {
                log::info!(
                    "epoch {} loaded: {} blocks, {} discs",
                    snapshot.epoch,
                    snapshot.blocks.len(),
                    snapshot.discs.len()
                );
                self.replay.stop(&mut self.visibility);
                self.visibility = BlockVisibility::new(snapshot.blocks.len());
                self.hovered = None;
                self.last_error = None;
                self.snapshot = Some(snapshot);
                Ok(LoadOutcome::Applied)
            }
            Err(e) => {
                log::warn!("epoch {} failed to load: {}", ticket.epoch, e);
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Record the chain tip; the future disc stack is clipped to it.
    pub fn set_tip_height(&mut self, height: u64) {
        let tip = epoch_of_height(height);
        self.tip_epoch = Some(tip);
        if let Some(snapshot) = self.snapshot.as_mut() {
            snapshot.discs = place_discs(snapshot.epoch, Some(tip), &self.cfg.discs);
            self.hovered = None;
        }
    }

    pub fn tip_epoch(&self) -> Option<u64> {
        self.tip_epoch
    }

    pub fn snapshot(&self) -> Option<&SceneSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn current_epoch(&self) -> Option<u64> {
        self.snapshot.as_ref().map(|s| s.epoch)
    }

    pub fn pending(&self) -> Option<LoadTicket> {
        self.pending
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    // ── Camera & input ──

    pub fn camera_event(&mut self, event: CameraEvent) {
        self.camera.handle(event);
    }

    pub fn camera_events(&mut self, events: impl IntoIterator<Item = CameraEvent>) {
        for event in events {
            self.camera.handle(event);
        }
    }

    pub fn controller(&self) -> &OrbitCameraController {
        &self.camera
    }

    pub fn camera(&self) -> Camera {
        self.camera.camera()
    }

    pub fn touch(&mut self) -> &mut GestureRecognizer {
        &mut self.touch
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport != self.viewport {
            self.viewport = viewport;
            self.camera.handle(CameraEvent::Resize {
                aspect: viewport.aspect(),
            });
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn auto_rotate(&self) -> bool {
        self.camera.state().auto_rotate
    }

    pub fn set_auto_rotate(&mut self, on: bool) {
        self.camera.handle(CameraEvent::SetAutoRotate(on));
    }

    pub fn scene_yaw(&self) -> f64 {
        self.scene_yaw
    }

    /// Disc opacity factor and scale for the current camera tilt.
    pub fn disc_fade(&self) -> (f64, f64) {
        disc_fade(self.camera.state().camera.phi)
    }

    /// Advance time-driven state by one frame.
    pub fn tick(&mut self, dt: Duration) {
        if self.camera.state().auto_rotate {
            self.scene_yaw += dt.as_secs_f64() * self.cfg.orbit.auto_rotate_speed;
        }
        if let Some(snapshot) = self.snapshot.as_ref() {
            self.replay.tick(dt, &snapshot.blocks, &mut self.visibility);
        }
    }

    // ── Visibility & replay ──

    pub fn visibility(&self) -> &BlockVisibility {
        &self.visibility
    }

    /// Slider input. Moving the slider ends a running replay.
    pub fn set_visibility_percent(&mut self, percent: u8) {
        if self.replay.is_running() {
            self.replay.stop(&mut self.visibility);
        }
        self.visibility.set_percent(percent);
        self.drop_hidden_hover();
    }

    pub fn toggle_replay(&mut self, speed: ReplaySpeed) -> ReplayToggle {
        let toggle = self.replay.toggle(speed, &mut self.visibility);
        self.drop_hidden_hover();
        toggle
    }

    pub fn replay(&self) -> &BlockReplay {
        &self.replay
    }

    pub fn highest_visible_height(&self) -> Option<u64> {
        let snapshot = self.snapshot.as_ref()?;
        self.visibility.highest_visible_height(&snapshot.blocks)
    }

    fn drop_hidden_hover(&mut self) {
        if let Some(HitTarget::Block(i)) = self.hovered {
            if i >= self.visibility.visible() {
                self.hovered = None;
            }
        }
    }

    // ── Picking ──

    fn pick_scene(&self) -> Option<PickScene<'_>> {
        let snapshot = self.snapshot.as_ref()?;
        Some(PickScene {
            blocks: &snapshot.blocks,
            discs: &snapshot.discs,
            visible_blocks: self.visibility.visible(),
            scene_yaw: self.scene_yaw,
            disc_scale: self.disc_fade().1,
        })
    }

    /// Nearest item under the pixel position `(x, y)`.
    pub fn pick_at(&self, x: f64, y: f64) -> Option<Hit> {
        let scene = self.pick_scene()?;
        let (nx, ny) = self.viewport.to_ndc(x, y);
        pick(&scene, &self.camera().ray(nx, ny))
    }

    /// Pointer hover; returns the tooltip for the item under the pointer.
    pub fn hover(&mut self, x: f64, y: f64) -> Option<Tooltip> {
        let hit = self.pick_at(x, y);
        self.hovered = hit.map(|h| h.target);
        let scene = self.pick_scene()?;
        hit.and_then(|h| h.item(&scene)).map(describe)
    }

    pub fn clear_hover(&mut self) {
        self.hovered = None;
    }

    pub fn hovered(&self) -> Option<HitTarget> {
        self.hovered
    }

    /// Draw scale for an item; the hovered one is enlarged.
    pub fn item_scale(&self, target: HitTarget) -> f64 {
        if self.hovered == Some(target) {
            HOVER_SCALE
        } else {
            1.0
        }
    }

    /// Double-click: what the host should navigate to, if anything was hit.
    pub fn double_click(&self, x: f64, y: f64) -> Option<NavigationRequest> {
        let hit = self.pick_at(x, y)?;
        let scene = self.pick_scene()?;
        let request = NavigationRequest::for_item(hit.item(&scene)?);
        log::info!("navigation request: {:?}", request);
        Some(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(n: usize, first_height: u64) -> Value {
        let blocks: Vec<Value> = (0..n)
            .map(|i| {
                json!([
                    {"height": first_height + i as u64},
                    {"time": 1_600_000_000 + i as i64 * 600},
                    {"nTx": 100},
                    {}, {},
                    {"size": 1_000_000},
                    {}, {},
                    {"time_difference": 600}
                ])
            })
            .collect();
        json!([blocks])
    }

    #[test]
    fn load_applies_snapshot() {
        let mut s = ViewerSession::new(ViewerConfig::default());
        let t = s.request_epoch(3).unwrap();
        assert!(s.is_loading());
        let out = s.complete_load(t, Ok(payload(10, 6048))).unwrap();
        assert_eq!(out, LoadOutcome::Applied);
        let snap = s.snapshot().unwrap();
        assert_eq!(snap.epoch, 3);
        assert_eq!(snap.blocks.len(), 10);
        assert_eq!(snap.discs.len(), 8);
        assert_eq!(s.visibility().visible(), 10);
        assert!(!s.is_loading());
    }

    #[test]
    fn stale_ticket_is_discarded() {
        let mut s = ViewerSession::new(ViewerConfig::default());
        let old = s.request_epoch(1).unwrap();
        let new = s.request_epoch(2).unwrap();
        assert_eq!(s.complete_load(old, Ok(payload(5, 2016))).unwrap(), LoadOutcome::Discarded);
        assert!(s.snapshot().is_none());
        assert_eq!(s.pending(), Some(new));
        assert_eq!(s.complete_load(new, Ok(payload(5, 4032))).unwrap(), LoadOutcome::Applied);
        assert_eq!(s.current_epoch(), Some(2));
    }

    #[test]
    fn failed_load_keeps_previous_snapshot() {
        let mut s = ViewerSession::new(ViewerConfig::default());
        let t = s.request_epoch(1).unwrap();
        s.complete_load(t, Ok(payload(5, 2016))).unwrap();
        let before = s.snapshot().cloned();

        let t = s.request_epoch(2).unwrap();
        let err = s.complete_load(t, Ok(json!({"oops": true}))).unwrap_err();
        assert!(matches!(err, LoadError::MissingBlocks { epoch: 2 }));
        assert_eq!(s.snapshot().cloned(), before);
        assert!(s.last_error().is_some());
        assert!(!s.is_loading());
    }

    #[test]
    fn out_of_range_epoch_is_rejected() {
        let mut s = ViewerSession::new(ViewerConfig::default());
        let pending = s.request_epoch(7).unwrap();
        let err = s.request_epoch(u64::MAX / 1000).unwrap_err();
        assert!(matches!(err, LoadError::EpochOutOfRange { max: MAX_EPOCH, .. }));
        assert_eq!(s.pending(), Some(pending));
        assert!(s.last_error().is_some());

        let t = s.request_epoch(MAX_EPOCH).unwrap();
        assert_eq!(s.complete_load(t, Ok(json!([[]]))).unwrap(), LoadOutcome::Applied);
        let snap = s.snapshot().unwrap();
        assert_eq!(snap.stats.first_height, MAX_EPOCH * 2016);
        assert_eq!(snap.discs.len(), 5);
    }

    #[test]
    fn tip_clips_future_discs() {
        let mut s = ViewerSession::new(ViewerConfig::default());
        let t = s.request_epoch(10).unwrap();
        s.complete_load(t, Ok(payload(3, 20160))).unwrap();
        assert_eq!(s.snapshot().unwrap().discs.len(), 10);
        // tip inside epoch 12
        s.set_tip_height(12 * 2016 + 7);
        assert_eq!(s.tip_epoch(), Some(12));
        assert_eq!(s.snapshot().unwrap().discs.len(), 7);
    }

    #[test]
    fn auto_rotation_accumulates_until_interaction() {
        let mut s = ViewerSession::new(ViewerConfig::default());
        s.tick(Duration::from_secs(2));
        assert!((s.scene_yaw() - 0.2).abs() < 1e-12);
        s.camera_event(CameraEvent::Wheel { delta_y: 10.0 });
        s.tick(Duration::from_secs(2));
        assert!((s.scene_yaw() - 0.2).abs() < 1e-12);
        s.set_auto_rotate(true);
        s.tick(Duration::from_secs(1));
        assert!((s.scene_yaw() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn nothing_to_pick_without_snapshot() {
        let mut s = ViewerSession::new(ViewerConfig::default());
        assert!(s.hover(640.0, 360.0).is_none());
        assert!(s.double_click(640.0, 360.0).is_none());
    }

    #[test]
    fn slider_stops_replay() {
        let mut s = ViewerSession::new(ViewerConfig::default());
        let t = s.request_epoch(0).unwrap();
        s.complete_load(t, Ok(payload(20, 0))).unwrap();
        assert_eq!(s.toggle_replay(ReplaySpeed::X1000), ReplayToggle::Started(ReplaySpeed::X1000));
        assert_eq!(s.visibility().visible(), 0);
        s.set_visibility_percent(50);
        assert!(!s.replay().is_running());
        assert_eq!(s.visibility().visible(), 10);
        assert_eq!(s.highest_visible_height(), Some(9));
    }
}
