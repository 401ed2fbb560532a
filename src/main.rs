mod app;

use std::time::Duration;

use clap::Parser;
use eframe::egui;

use chainspiral::config::ViewerConfig;
use chainspiral::data::MAX_EPOCH;

use app::SpiralApp;

/// chainspiral - Bitcoin difficulty-epoch explorer
///
/// Lays one difficulty epoch out on a time-driven spiral.
/// Configuration priority: CLI args > Environment variables > Defaults
#[derive(Parser, Debug)]
#[command(name = "chainspiral")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bitcoin difficulty-epoch spiral explorer", long_about = None)]
struct CliArgs {
    /// Difficulty epoch shown on startup
    #[arg(
        short,
        long,
        env = "CHAINSPIRAL_EPOCH",
        value_parser = clap::value_parser!(u64).range(..=MAX_EPOCH)
    )]
    epoch: Option<u64>,

    /// Directory URL holding the epoch JSON files
    #[arg(long, env = "CHAINSPIRAL_DATA_URL")]
    data_url: Option<String>,

    /// Chain tip height endpoint (plain integer body)
    #[arg(long, env = "CHAINSPIRAL_TIP_URL")]
    tip_url: Option<String>,

    /// Block explorer URL prefix opened on block double-click
    #[arg(long, env = "CHAINSPIRAL_BLOCK_URL")]
    block_url: Option<String>,

    /// HTTP timeout in seconds (1-120)
    #[arg(long, env = "CHAINSPIRAL_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,
}

impl CliArgs {
    fn into_config(self) -> ViewerConfig {
        let mut cfg = ViewerConfig::default();
        if let Some(epoch) = self.epoch {
            cfg.initial_epoch = epoch;
        }
        if let Some(url) = self.data_url {
            cfg.client.data_base_url = url;
        }
        if let Some(url) = self.tip_url {
            cfg.client.tip_url = url;
        }
        if let Some(url) = self.block_url {
            cfg.block_url = url;
        }
        if let Some(secs) = self.timeout_secs {
            cfg.client.timeout = Duration::from_secs(secs.clamp(1, 120));
        }
        cfg
    }
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    let cfg = CliArgs::parse().into_config();
    log::info!(
        "starting at epoch {} (data: {})",
        cfg.initial_epoch,
        cfg.client.data_base_url
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "chainspiral - Difficulty Epochs",
        options,
        Box::new(move |cc| Ok(Box::new(SpiralApp::new(cc, cfg)))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_flag_is_range_checked() {
        let args = CliArgs::try_parse_from(["chainspiral", "--epoch", "450"]).unwrap();
        assert_eq!(args.into_config().initial_epoch, 450);

        let too_far = (MAX_EPOCH + 1).to_string();
        assert!(CliArgs::try_parse_from(["chainspiral", "--epoch", too_far.as_str()]).is_err());
    }
}
