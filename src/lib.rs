//! Bitcoin difficulty-epoch explorer.
//!
//! One difficulty epoch (2016 blocks) is laid out on a flat spiral whose
//! arc-length steps follow the inter-block times. Epoch discs stack above
//! (future) and below (past) the spiral; an orbit camera, ray picking and
//! tooltips make it explorable. The `chainspiral` binary hosts it in egui.

pub mod camera;
pub mod config;
pub mod data;
pub mod error;
pub mod input;
pub mod net;
pub mod picking;
pub mod playback;
pub mod scene;
pub mod session;
pub mod stats;
