//! Viewer configuration.
//!
//! Defaults point at the public endpoints; the binary overrides them from
//! command-line flags or environment variables.

use std::time::Duration;

use crate::camera::orbit::OrbitConfig;
use crate::scene::discs::DiscConfig;
use crate::scene::spiral::SpiralConfig;

pub const DEFAULT_DATA_BASE_URL: &str = "https://pvxg.net/bitcoin_data/difficulty_epochs/";
pub const DEFAULT_TIP_URL: &str = "https://mempool.space/api/blocks/tip/height";
pub const DEFAULT_BLOCK_URL: &str = "https://mempool.space/block/";

/// Data client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Directory URL holding the `rcp_bitcoin_block_data_*.json` files
    pub data_base_url: String,
    /// Endpoint answering the chain tip height as a plain integer
    pub tip_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_base_url: DEFAULT_DATA_BASE_URL.to_string(),
            tip_url: DEFAULT_TIP_URL.to_string(),
            timeout: Duration::from_secs(15),
            user_agent: concat!("chainspiral/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Everything the viewer session needs.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub client: ClientConfig,
    pub spiral: SpiralConfig,
    pub discs: DiscConfig,
    pub orbit: OrbitConfig,
    /// Epoch shown on startup
    pub initial_epoch: u64,
    /// Page opened for a double-clicked block; the height is appended
    pub block_url: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            spiral: SpiralConfig::default(),
            discs: DiscConfig::default(),
            orbit: OrbitConfig::default(),
            initial_epoch: 0,
            block_url: DEFAULT_BLOCK_URL.to_string(),
        }
    }
}

impl ViewerConfig {
    pub fn block_page(&self, height: u64) -> String {
        format!("{}{}", self.block_url, height)
    }
}
