//! Navigation methods for `SpiralApp`.
//!
//! Covers epoch navigation (`load_epoch`, `step_epoch`, `navigate`) and the
//! background fetch lifecycle (`check_fetch`, `fetch_tip`, `check_tip`).

use std::sync::mpsc;

use eframe::egui;

use chainspiral::net::client::EpochClient;
use chainspiral::picking::NavigationRequest;
use chainspiral::session::LoadOutcome;

use super::SpiralApp;

impl SpiralApp {
    /// Request `epoch` and fetch it on a background thread.
    pub fn load_epoch(&mut self, epoch: u64, ctx: &egui::Context) {
        // Rejection is recorded in the session and shown in the overlay.
        let Ok(ticket) = self.session.request_epoch(epoch) else {
            return;
        };
        self.epoch_input = epoch.to_string();
        self.block_link = None;

        let tx = self.fetch_tx.clone();
        let cfg = self.session.config().client.clone();
        let ctx = ctx.clone();

        std::thread::spawn(move || {
            let result = EpochClient::new(&cfg).and_then(|client| client.fetch_epoch(epoch));
            let _ = tx.send((ticket, result));
            ctx.request_repaint();
        });
    }

    /// Load the epoch typed in the toolbar.
    pub fn load_from_input(&mut self, ctx: &egui::Context) {
        match self.epoch_input.trim().parse::<u64>() {
            Ok(epoch) => self.load_epoch(epoch, ctx),
            Err(_) => self
                .session
                .set_error(format!("not an epoch number: {:?}", self.epoch_input.trim())),
        }
    }

    /// Previous (`-1`) or next (`+1`) epoch relative to the one shown.
    pub fn step_epoch(&mut self, delta: i64, ctx: &egui::Context) {
        let Some(current) = self.session.current_epoch() else {
            return;
        };
        let Some(target) = current.checked_add_signed(delta) else {
            return;
        };
        if let Some(tip) = self.session.tip_epoch() {
            if target > tip {
                return;
            }
        }
        self.load_epoch(target, ctx);
    }

    /// Act on a double-click request from the viewport.
    pub fn navigate(&mut self, request: NavigationRequest, ctx: &egui::Context) {
        match request {
            NavigationRequest::Epoch(epoch) => self.load_epoch(epoch, ctx),
            NavigationRequest::Block(height) => {
                let url = self.session.config().block_page(height);
                log::info!("opening block {} at {}", height, url);
                ctx.open_url(egui::OpenUrl::new_tab(&url));
                self.block_link = Some(url);
            }
        }
    }

    /// Drain finished epoch fetches into the session.
    pub fn check_fetch(&mut self) {
        while let Ok((ticket, result)) = self.fetch_rx.try_recv() {
            match self.session.complete_load(ticket, result) {
                Ok(LoadOutcome::Applied) => {
                    self.epoch_input = ticket.epoch.to_string();
                }
                Ok(LoadOutcome::Discarded) => {}
                Err(_) => {
                    // The session keeps the previous scene and the message.
                    if let Some(epoch) = self.session.current_epoch() {
                        self.epoch_input = epoch.to_string();
                    }
                }
            }
        }
    }

    /// Fetch the chain tip height on a background thread.
    pub fn fetch_tip(&mut self, ctx: &egui::Context) {
        let (tx, rx) = mpsc::channel();
        self.tip_rx = Some(rx);

        let cfg = self.session.config().client.clone();
        let ctx = ctx.clone();

        std::thread::spawn(move || {
            let result = EpochClient::new(&cfg).and_then(|client| client.fetch_tip_height());
            let _ = tx.send(result);
            ctx.request_repaint();
        });
    }

    /// Poll the chain tip channel.
    pub fn check_tip(&mut self) {
        if let Some(rx) = &self.tip_rx {
            if let Ok(result) = rx.try_recv() {
                match result {
                    Ok(height) => {
                        log::info!("chain tip at height {}", height);
                        self.session.set_tip_height(height);
                    }
                    // Without a tip the future stack just stays at full size.
                    Err(e) => log::warn!("chain tip unavailable: {}", e),
                }
                self.tip_rx = None;
            }
        }
    }
}
