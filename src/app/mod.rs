//! `SpiralApp`: the top-level egui application state.
//!
//! This module declares the `SpiralApp` struct and its `eframe::App` impl.
//! The remaining methods are split across the sibling sub-modules:
//!
//! - `navigation`: epoch loading, chain tip, background fetch
//! - `toolbar`: epoch selector, camera and replay controls
//! - `content`: spiral viewport (painting, input routing, tooltip)

pub mod content;
pub mod navigation;
pub mod toolbar;

use std::sync::mpsc;
use std::time::Instant;

use eframe::egui;
use serde_json::Value;

use chainspiral::config::ViewerConfig;
use chainspiral::error::FetchError;
use chainspiral::session::{LoadTicket, ViewerSession};

/// Result of a background epoch fetch.
pub type FetchMessage = (LoadTicket, Result<Value, FetchError>);

// ─── Application state ───────────────────────────────────────────────────────

pub struct SpiralApp {
    pub session: ViewerSession,
    /// Epoch number typed in the toolbar
    pub epoch_input: String,
    pub fetch_tx: mpsc::Sender<FetchMessage>,
    pub fetch_rx: mpsc::Receiver<FetchMessage>,
    pub tip_rx: Option<mpsc::Receiver<Result<u64, FetchError>>>,
    pub show_stats: bool,
    pub dark_mode: bool,
    /// Block page requested by the last double-click
    pub block_link: Option<String>,
    pub last_frame_time: Instant,
}

impl SpiralApp {
    pub fn new(cc: &eframe::CreationContext<'_>, cfg: ViewerConfig) -> Self {
        let initial_epoch = cfg.initial_epoch;
        let (fetch_tx, fetch_rx) = mpsc::channel();
        let mut app = Self {
            session: ViewerSession::new(cfg),
            epoch_input: initial_epoch.to_string(),
            fetch_tx,
            fetch_rx,
            tip_rx: None,
            show_stats: true,
            dark_mode: true,
            block_link: None,
            last_frame_time: Instant::now(),
        };
        app.fetch_tip(&cc.egui_ctx);
        app.load_epoch(initial_epoch, &cc.egui_ctx);
        app
    }
}

impl eframe::App for SpiralApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_fetch();
        self.check_tip();

        let now = Instant::now();
        let dt = now.duration_since(self.last_frame_time);
        self.last_frame_time = now;
        self.session.tick(dt);

        if self.dark_mode {
            ctx.set_visuals(egui::Visuals::dark());
        } else {
            ctx.set_visuals(egui::Visuals::light());
        }

        // Top toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui, ctx);
        });

        // Playback strip
        egui::TopBottomPanel::bottom("playback").show(ctx, |ui| {
            self.draw_playback_bar(ui);
        });

        // Stats side panel
        if self.show_stats {
            egui::SidePanel::right("stats")
                .default_width(240.0)
                .show(ctx, |ui| {
                    self.draw_stats_panel(ui);
                });
        }

        // Main content area
        let ctx_clone = ctx.clone();
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                self.draw_content(ui, &ctx_clone);
            });

        // Keep animating while something moves on its own
        if self.session.auto_rotate() || self.session.replay().is_running() || self.session.is_loading() {
            ctx.request_repaint();
        }
    }
}
