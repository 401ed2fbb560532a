//! Content-area rendering for `SpiralApp`.
//!
//! - `draw_content`: viewport: input routing, painting, tooltip
//! - `paint_scene`: project blocks and discs, painter's-algorithm fill
//! - `draw_stats_panel`: right-side epoch statistics

use std::time::Instant;

use eframe::egui;
use glam::DVec3;

use chainspiral::camera::orbit::{CameraEvent, PointerSource};
use chainspiral::camera::{rotate_y, Camera, Viewport};
use chainspiral::picking::HitTarget;
use chainspiral::scene::{PlacedItem, Shape};

use super::SpiralApp;

/// Segments used to outline a disc rim.
const DISC_SEGMENTS: usize = 48;

/// A filled polygon waiting to be painted, farthest first.
struct Facet {
    depth: f64,
    points: Vec<egui::Pos2>,
    color: egui::Color32,
}

impl SpiralApp {
    // ── Viewport ─────────────────────────────────────────────────────────────

    pub fn draw_content(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let (response, painter) = ui.allocate_painter(
            ui.available_size(),
            egui::Sense::click_and_drag().union(egui::Sense::hover()),
        );
        let rect = response.rect;
        self.session
            .set_viewport(Viewport::new(rect.width() as f64, rect.height() as f64));
        let local = |p: egui::Pos2| ((p.x - rect.min.x) as f64, (p.y - rect.min.y) as f64);

        // Touch first: egui also mirrors the first finger as a pointer.
        let touch_active = self.route_touch(ui, rect);

        if !touch_active {
            let pan = ui.input(|i| i.modifiers.shift || i.modifiers.alt);
            if response.drag_started() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let (x, y) = local(pos);
                    self.session.camera_event(CameraEvent::PointerDown { x, y });
                }
            }
            if response.dragged() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let (x, y) = local(pos);
                    self.session.camera_event(CameraEvent::PointerMove {
                        x,
                        y,
                        pan,
                        source: PointerSource::Mouse,
                    });
                }
            }
            if response.drag_stopped() {
                self.session.camera_event(CameraEvent::PointerUp);
            }
        }

        // Wheel: egui reports scrolling up as positive
        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll.abs() > 0.1 {
                self.session.camera_event(CameraEvent::Wheel {
                    delta_y: -scroll as f64,
                });
            }
        }

        // Hover and double-click picking
        let tooltip = match response.hover_pos() {
            Some(pos) if !response.dragged() => {
                let (x, y) = local(pos);
                self.session.hover(x, y)
            }
            _ => {
                self.session.clear_hover();
                None
            }
        };
        if response.double_clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let (x, y) = local(pos);
                if let Some(request) = self.session.double_click(x, y) {
                    self.navigate(request, ctx);
                }
            }
        }

        self.paint_scene(&painter, rect);
        self.paint_overlay(&painter, rect);

        if let Some(tooltip) = tooltip {
            response.on_hover_ui_at_pointer(|ui| {
                ui.label(egui::RichText::new(&tooltip.title).monospace().strong());
                for line in &tooltip.lines {
                    ui.label(egui::RichText::new(line).monospace());
                }
            });
        }
    }

    /// Feed raw touch events to the gesture recognizer. Returns true while
    /// fingers are down.
    fn route_touch(&mut self, ui: &egui::Ui, rect: egui::Rect) -> bool {
        let touches: Vec<(u64, egui::TouchPhase, egui::Pos2)> = ui.input(|i| {
            i.events
                .iter()
                .filter_map(|e| match e {
                    egui::Event::Touch { id, phase, pos, .. } => Some((id.0, *phase, *pos)),
                    _ => None,
                })
                .collect()
        });

        let now = Instant::now();
        for (id, phase, pos) in touches {
            let (x, y) = ((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64);
            let events = match phase {
                egui::TouchPhase::Start => self.session.touch().touch_start(x, y, id, now),
                egui::TouchPhase::Move => self.session.touch().touch_move(x, y, id),
                egui::TouchPhase::End | egui::TouchPhase::Cancel => self.session.touch().touch_end(id),
            };
            self.session.camera_events(events);
        }
        self.session.touch().active_touches() > 0
    }

    // ── Painting ─────────────────────────────────────────────────────────────

    fn paint_scene(&self, painter: &egui::Painter, rect: egui::Rect) {
        let Some(snapshot) = self.session.snapshot() else {
            return;
        };
        let camera = self.session.camera();
        let viewport = self.session.viewport();
        let yaw = self.session.scene_yaw();
        let (disc_opacity, disc_scale) = self.session.disc_fade();
        let visible = self.session.visibility().visible();

        let mut facets = Vec::with_capacity(visible * 3 + snapshot.discs.len());

        for (i, item) in snapshot.blocks.iter().take(visible).enumerate() {
            let scale = self.session.item_scale(HitTarget::Block(i));
            cube_facets(item, scale, item.opacity, yaw, &camera, viewport, rect, &mut facets);
        }
        if disc_scale > 0.0 && disc_opacity > 0.0 {
            for (i, item) in snapshot.discs.iter().enumerate() {
                let scale = disc_scale * self.session.item_scale(HitTarget::Disc(i));
                let opacity = item.opacity * disc_opacity;
                disc_facet(item, scale, opacity, yaw, &camera, viewport, rect, &mut facets);
            }
        }

        facets.sort_by(|a, b| b.depth.total_cmp(&a.depth));
        painter.extend(
            facets
                .into_iter()
                .map(|f| egui::Shape::convex_polygon(f.points, f.color, egui::Stroke::NONE)),
        );
    }

    fn paint_overlay(&self, painter: &egui::Painter, rect: egui::Rect) {
        let font = egui::FontId::monospace(13.0);
        let color = egui::Color32::from_gray(200);
        let mut y = rect.min.y + 8.0;

        if let Some(snapshot) = self.session.snapshot() {
            painter.text(
                egui::pos2(rect.min.x + 8.0, y),
                egui::Align2::LEFT_TOP,
                format!(
                    "Adjustment {}  \u{2022}  Blocks {} - {}",
                    snapshot.epoch, snapshot.stats.first_height, snapshot.stats.last_height
                ),
                font.clone(),
                color,
            );
            y += 18.0;
        } else if self.session.is_loading() {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Loading epoch data...",
                font.clone(),
                color,
            );
        }

        if let Some(err) = self.session.last_error() {
            painter.text(
                egui::pos2(rect.min.x + 8.0, y),
                egui::Align2::LEFT_TOP,
                err,
                font,
                egui::Color32::from_rgb(255, 80, 80),
            );
        }
    }

    // ── Stats panel ──────────────────────────────────────────────────────────

    pub fn draw_stats_panel(&self, ui: &mut egui::Ui) {
        ui.heading("Difficulty Epoch");
        ui.separator();

        let Some(snapshot) = self.session.snapshot() else {
            ui.label("No epoch loaded");
            return;
        };

        egui::Grid::new("epoch_stats").num_columns(2).striped(true).show(ui, |ui| {
            for (label, value) in snapshot.stats.rows() {
                ui.label(label);
                ui.label(egui::RichText::new(value).monospace());
                ui.end_row();
            }
        });

        ui.separator();
        ui.heading("Scene");
        ui.label(format!("Blocks placed: {}", snapshot.blocks.len()));
        ui.label(format!("Epoch discs: {}", snapshot.discs.len()));
        ui.label(format!("Spiral radius: {:.2}", snapshot.final_state.radius));
        if let Some(tip) = self.session.tip_epoch() {
            ui.label(format!("Chain tip epoch: {}", tip));
        }

        ui.separator();
        ui.heading("Camera");
        let cam = self.session.controller().state().camera;
        ui.label(format!("Distance: {:.1}", cam.distance));
        ui.label(format!("Tilt: {:.0}\u{00B0}", cam.phi.to_degrees()));
        ui.label(format!("Target: ({:.1}, {:.1}, {:.1})", cam.target.x, cam.target.y, cam.target.z));
        ui.small("Drag: orbit \u{2022} Shift+drag: pan \u{2022} Wheel: zoom \u{2022} Double-click: open");
    }
}

// ── Projection helpers ───────────────────────────────────────────────────────

fn to_screen(camera: &Camera, viewport: Viewport, rect: egui::Rect, world: DVec3) -> Option<(egui::Pos2, f64)> {
    let ndc = camera.project(world)?;
    let (x, y) = viewport.from_ndc(ndc.x, ndc.y);
    Some((egui::pos2(rect.min.x + x as f32, rect.min.y + y as f32), ndc.z))
}

fn shade(color: [u8; 3], factor: f64, opacity: f64) -> egui::Color32 {
    let s = |c: u8| (c as f64 * factor).clamp(0.0, 255.0) as u8;
    let a = (opacity.clamp(0.0, 1.0) * 255.0) as u8;
    egui::Color32::from_rgba_unmultiplied(s(color[0]), s(color[1]), s(color[2]), a)
}

/// Visible faces of a block cube.
#[allow(clippy::too_many_arguments)]
fn cube_facets(
    item: &PlacedItem,
    scale: f64,
    opacity: f64,
    scene_yaw: f64,
    camera: &Camera,
    viewport: Viewport,
    rect: egui::Rect,
    out: &mut Vec<Facet>,
) {
    let Shape::Cube { edge } = item.shape else {
        return;
    };
    let h = edge * scale * 0.5;
    let yaw = item.rotation.yaw();
    let world = |local: DVec3| rotate_y(rotate_y(local, yaw) + item.position, scene_yaw);

    // (normal, four corners) per face
    let faces: [(DVec3, [DVec3; 4]); 6] = [
        (DVec3::X, [DVec3::new(h, -h, -h), DVec3::new(h, h, -h), DVec3::new(h, h, h), DVec3::new(h, -h, h)]),
        (DVec3::NEG_X, [DVec3::new(-h, -h, -h), DVec3::new(-h, -h, h), DVec3::new(-h, h, h), DVec3::new(-h, h, -h)]),
        (DVec3::Y, [DVec3::new(-h, h, -h), DVec3::new(-h, h, h), DVec3::new(h, h, h), DVec3::new(h, h, -h)]),
        (DVec3::NEG_Y, [DVec3::new(-h, -h, -h), DVec3::new(h, -h, -h), DVec3::new(h, -h, h), DVec3::new(-h, -h, h)]),
        (DVec3::Z, [DVec3::new(-h, -h, h), DVec3::new(h, -h, h), DVec3::new(h, h, h), DVec3::new(-h, h, h)]),
        (DVec3::NEG_Z, [DVec3::new(-h, -h, -h), DVec3::new(-h, h, -h), DVec3::new(h, h, -h), DVec3::new(h, -h, -h)]),
    ];
    let light = DVec3::new(0.4, 1.0, 0.6).normalize();
    let base = item.color.to_u8();

    for (normal, corners) in faces {
        let n = rotate_y(rotate_y(normal, yaw), scene_yaw);
        let center = world(normal * h);
        let to_camera = if camera.projection.is_perspective() {
            camera.position - center
        } else {
            -camera.forward()
        };
        if n.dot(to_camera) <= 0.0 {
            continue;
        }

        let mut points = Vec::with_capacity(4);
        let mut depth = 0.0;
        for c in corners {
            let Some((p, d)) = to_screen(camera, viewport, rect, world(c)) else {
                return;
            };
            points.push(p);
            depth += d * 0.25;
        }
        out.push(Facet {
            depth,
            points,
            color: shade(base, 0.55 + 0.45 * n.dot(light).abs(), opacity),
        });
    }
}

/// Top face of an epoch disc as a filled ellipse.
#[allow(clippy::too_many_arguments)]
fn disc_facet(
    item: &PlacedItem,
    scale: f64,
    opacity: f64,
    scene_yaw: f64,
    camera: &Camera,
    viewport: Viewport,
    rect: egui::Rect,
    out: &mut Vec<Facet>,
) {
    let Shape::Cylinder { radius, .. } = item.shape else {
        return;
    };
    let r = radius * scale;
    let mut points = Vec::with_capacity(DISC_SEGMENTS);
    for k in 0..DISC_SEGMENTS {
        let a = k as f64 / DISC_SEGMENTS as f64 * std::f64::consts::TAU;
        let local = DVec3::new(r * a.cos(), 0.0, r * a.sin());
        let Some((p, _)) = to_screen(camera, viewport, rect, rotate_y(local + item.position, scene_yaw)) else {
            return;
        };
        points.push(p);
    }
    let depth = camera
        .project(rotate_y(item.position, scene_yaw))
        .map_or(f64::MAX, |ndc| ndc.z);
    out.push(Facet {
        depth,
        points,
        color: shade(item.color.to_u8(), 1.0, opacity),
    });
}
