//! Input adapters feeding the orbit camera.

pub mod touch;
