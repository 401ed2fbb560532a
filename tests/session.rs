//! End-to-end session lifecycle: payload → snapshot → picking → navigation.

use chainspiral::camera::orbit::{CameraEvent, StepCommand};
use chainspiral::config::ViewerConfig;
use chainspiral::error::{FetchError, LoadError};
use chainspiral::picking::NavigationRequest;
use chainspiral::session::{LoadOutcome, ViewerSession};
use glam::DVec3;
use serde_json::{json, Value};

fn epoch_payload(epoch: u64, n: usize) -> Value {
    let first = epoch * 2016;
    let blocks: Vec<Value> = (0..n)
        .map(|i| {
            json!([
                {"height": first + i as u64},
                {"time": 1_700_000_000 + i as i64 * 600},
                {"nTx": 2500},
                {"bits": "17034219"},
                {"difficulty": 6.2e13},
                {"size": 1_500_000},
                {"weight": 3_993_000},
                {"version": 536_870_912},
                {"time_difference": 540 + (i as i64 % 7) * 30}
            ])
        })
        .collect();
    json!([blocks])
}

/// Pixel position of a world point in the session's viewport.
fn pixel_of(session: &ViewerSession, world: DVec3) -> (f64, f64) {
    let ndc = session.camera().project(world).expect("point in view");
    session.viewport().from_ndc(ndc.x, ndc.y)
}

/// Index of the block closest to the camera; nothing can sit in front of it.
fn nearest_block(session: &ViewerSession) -> usize {
    let camera = session.camera();
    let blocks = &session.snapshot().unwrap().blocks;
    (0..blocks.len())
        .min_by(|&a, &b| {
            let da = (blocks[a].position - camera.position).length();
            let db = (blocks[b].position - camera.position).length();
            da.total_cmp(&db)
        })
        .unwrap()
}

fn loaded(epoch: u64, n: usize) -> ViewerSession {
    let mut session = ViewerSession::new(ViewerConfig::default());
    let ticket = session.request_epoch(epoch).unwrap();
    let outcome = session.complete_load(ticket, Ok(epoch_payload(epoch, n))).unwrap();
    assert_eq!(outcome, LoadOutcome::Applied);
    session
}

#[test]
fn full_epoch_is_laid_out() {
    let session = loaded(420, 2016);
    let snap = session.snapshot().unwrap();
    assert_eq!(snap.blocks.len(), 2016);
    assert_eq!(snap.discs.len(), 10);
    assert!(snap.report.is_clean());
    assert_eq!(snap.stats.first_height, 420 * 2016);

    let radii: Vec<f64> = snap
        .blocks
        .iter()
        .map(|b| (b.position.x.powi(2) + b.position.z.powi(2)).sqrt())
        .collect();
    assert!(radii.windows(2).all(|w| w[1] >= w[0] - 1e-9));
}

#[test]
fn hovering_a_block_describes_it() {
    let mut session = loaded(420, 50);
    let index = nearest_block(&session);
    let block = session.snapshot().unwrap().blocks[index];
    let (x, y) = pixel_of(&session, block.position);
    let height = 420 * 2016 + index as u64;

    let tooltip = session.hover(x, y).expect("block under pointer");
    assert_eq!(tooltip.title, format!("Block {}", height));
    assert_eq!(tooltip.lines[0], format!("Block {} of 2016", index + 1));
    assert_eq!(tooltip.lines[1], "Size: 1,500,000 bytes");

    assert_eq!(session.double_click(x, y), Some(NavigationRequest::Block(height)));
}

#[test]
fn double_clicking_a_disc_requests_its_epoch() {
    let mut session = loaded(420, 50);
    // top face centre of the first future disc
    let (x, y) = pixel_of(&session, DVec3::new(0.0, 21.25, 0.0));
    let request = session.double_click(x, y);
    assert_eq!(request, Some(NavigationRequest::Epoch(421)));

    let ticket = session.request_epoch(421).unwrap();
    session.complete_load(ticket, Ok(epoch_payload(421, 10))).unwrap();
    assert_eq!(session.current_epoch(), Some(421));
}

#[test]
fn hidden_blocks_are_not_pickable() {
    let mut session = loaded(420, 50);
    let index = nearest_block(&session);
    let block = session.snapshot().unwrap().blocks[index];
    let (x, y) = pixel_of(&session, block.position);
    assert!(session.hover(x, y).is_some());

    session.set_visibility_percent(0);
    assert_eq!(session.visibility().visible(), 0);
    assert!(session.hover(x, y).is_none());
    assert!(session.hovered().is_none());
}

#[test]
fn rate_limited_fetch_keeps_scene() {
    let mut session = loaded(420, 50);
    let ticket = session.request_epoch(421).unwrap();
    let err = session
        .complete_load(
            ticket,
            Err(FetchError::RateLimited {
                api: "Epoch data API".to_string(),
            }),
        )
        .unwrap_err();
    assert!(matches!(err, LoadError::Fetch(FetchError::RateLimited { .. })));
    assert_eq!(session.current_epoch(), Some(420));
    assert!(session.last_error().unwrap().contains("too many requests"));
}

#[test]
fn camera_survives_reload() {
    let mut session = loaded(420, 50);
    session.camera_event(CameraEvent::Step(StepCommand::ZoomIn));
    let before = session.controller().state().camera;

    let ticket = session.request_epoch(419).unwrap();
    session.complete_load(ticket, Ok(epoch_payload(419, 50))).unwrap();
    assert_eq!(session.controller().state().camera, before);
}

#[test]
fn extreme_time_difference_still_loads() {
    let mut session = ViewerSession::new(ViewerConfig::default());
    let ticket = session.request_epoch(3).unwrap();
    let payload = json!([[
        [{"height": 6048}, {"time": 0}, {"nTx": 1}, {}, {}, {"size": 300}, {}, {}, {"time_difference": 600}],
        [{"height": 6049}, {"time": 600}, {"nTx": 1}, {}, {}, {"size": 300}, {}, {}, {"time_difference": 1e300}],
        [{"height": 6050}, {"time": 1200}, {"nTx": 1}, {}, {}, {"size": 300}, {}, {}, {"time_difference": 1e300}]
    ]]);
    assert_eq!(session.complete_load(ticket, Ok(payload)).unwrap(), LoadOutcome::Applied);
    let stats = &session.snapshot().unwrap().stats;
    assert_eq!(stats.max_gap, i64::MAX);
    assert!(stats.average_gap.is_finite());
}
