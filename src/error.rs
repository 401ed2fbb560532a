//! Error types for layout, fetching and epoch loading.

use thiserror::Error;

/// Spiral layout failures. Any of these aborts the whole build.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// Newton-Raphson did not reach the tolerance within the iteration cap.
    #[error("layout diverged: no root for L={arc_distance}, k={growth} after {iterations} iterations")]
    Diverged {
        arc_distance: f64,
        growth: f64,
        iterations: usize,
    },
}

/// Errors from the HTTP data client.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The upstream API answered 429.
    #[error("{api} is temporarily unavailable due to too many requests")]
    RateLimited { api: String },

    #[error("HTTP error {status} from {url}")]
    Status { status: u16, url: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("chain tip height is not an integer: {0:?}")]
    InvalidTipHeight(String),

    #[error("epoch {epoch} is beyond the last representable epoch")]
    EpochOutOfRange { epoch: u64 },
}

/// Errors from loading one epoch into the session.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to load epoch data: {0}")]
    Fetch(#[from] FetchError),

    /// The payload has no outer block array.
    #[error("no block data available for epoch {epoch}")]
    MissingBlocks { epoch: u64 },

    #[error("layout computation failed: {0}")]
    Layout(#[from] LayoutError),

    /// Heights of this epoch would not fit in a `u64`.
    #[error("epoch {epoch} is out of range (max {max})")]
    EpochOutOfRange { epoch: u64, max: u64 },
}
