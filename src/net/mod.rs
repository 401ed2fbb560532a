//! Data clients.

pub mod client;
