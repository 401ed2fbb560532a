//! Toolbar rendering for `SpiralApp`.
//!
//! Draws the epoch selector, camera controls, replay buttons and the block
//! visibility slider.

use eframe::egui;

use chainspiral::camera::orbit::{CameraEvent, ProjectionMode, StepCommand};
use chainspiral::picking::tooltip::group_thousands;
use chainspiral::playback::ReplaySpeed;

use super::SpiralApp;

impl SpiralApp {
    /// Render the top toolbar strip.
    pub fn draw_toolbar(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            ui.add_space(4.0);

            // Previous / Next epoch
            let has_epoch = self.session.current_epoch().is_some();
            let can_prev = self.session.current_epoch().is_some_and(|e| e > 0);
            let can_next = match (self.session.current_epoch(), self.session.tip_epoch()) {
                (Some(e), Some(tip)) => e < tip,
                (Some(_), None) => true,
                _ => false,
            };
            if ui
                .add_enabled(can_prev, egui::Button::new("\u{25C0}").min_size(egui::vec2(28.0, 24.0)))
                .clicked()
            {
                self.step_epoch(-1, ctx);
            }
            if ui
                .add_enabled(can_next && has_epoch, egui::Button::new("\u{25B6}").min_size(egui::vec2(28.0, 24.0)))
                .clicked()
            {
                self.step_epoch(1, ctx);
            }

            // Epoch input
            ui.label("Epoch");
            let response = ui.add_sized(
                [80.0, 24.0],
                egui::TextEdit::singleline(&mut self.epoch_input)
                    .hint_text("0")
                    .font(egui::TextStyle::Monospace),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                self.load_from_input(ctx);
            }
            if ui.button("Go").clicked() {
                self.load_from_input(ctx);
            }
            if self.session.is_loading() {
                ui.spinner();
            }

            ui.separator();

            // Camera steps
            let steps = [
                ("\u{21BA}", StepCommand::RotateLeft, "Rotate left"),
                ("\u{21BB}", StepCommand::RotateRight, "Rotate right"),
                ("\u{2191}", StepCommand::RotateUp, "Tilt up"),
                ("\u{2193}", StepCommand::RotateDown, "Tilt down"),
                ("\u{2190}", StepCommand::PanLeft, "Pan left"),
                ("\u{2192}", StepCommand::PanRight, "Pan right"),
                ("\u{21E1}", StepCommand::PanUp, "Pan up"),
                ("\u{21E3}", StepCommand::PanDown, "Pan down"),
                ("+", StepCommand::ZoomIn, "Zoom in"),
                ("-", StepCommand::ZoomOut, "Zoom out"),
            ];
            for (label, step, hint) in steps {
                if ui.button(label).on_hover_text(hint).clicked() {
                    self.session.camera_event(CameraEvent::Step(step));
                }
            }
            if ui.button("Reset").clicked() {
                self.session.camera_event(CameraEvent::Reset);
            }

            let projection = match self.session.controller().state().camera.mode {
                ProjectionMode::Perspective => "Perspective",
                ProjectionMode::Orthographic => "Orthographic",
            };
            if ui.button(projection).clicked() {
                self.session.camera_event(CameraEvent::ToggleProjection);
            }

            let rotating = self.session.auto_rotate();
            let rotation_label = if rotating { "Stop Rotation" } else { "Start Rotation" };
            if ui.button(rotation_label).clicked() {
                self.session.set_auto_rotate(!rotating);
            }

            ui.separator();
            ui.toggle_value(&mut self.show_stats, "Stats");

            let dark_label = if self.dark_mode { "\u{263E}" } else { "\u{2600}" };
            if ui.button(dark_label).clicked() {
                self.dark_mode = !self.dark_mode;
            }
        });
    }

    /// Render the bottom strip: visibility slider and replay buttons.
    pub fn draw_playback_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.add_space(4.0);

            let mut percent = self.session.visibility().percent();
            let slider = ui.add(egui::Slider::new(&mut percent, 0..=100).suffix("%").text("Blocks"));
            if slider.changed() {
                self.session.set_visibility_percent(percent);
            }

            let highest = self
                .session
                .highest_visible_height()
                .map(group_thousands)
                .unwrap_or_else(|| "0".to_string());
            ui.label(format!("Highest visible block: {}", highest));

            ui.separator();
            ui.label("Replay");
            let running = self.session.replay().speed();
            for speed in ReplaySpeed::ALL {
                let label = if running == Some(speed) { "Stop" } else { speed.label() };
                if ui.selectable_label(running == Some(speed), label).clicked() {
                    self.session.toggle_replay(speed);
                }
            }

            if let Some(link) = self.block_link.clone() {
                ui.separator();
                ui.hyperlink_to(link.as_str(), link.as_str());
            }
        });
    }
}
