//! Blocking HTTP client for epoch files and the chain tip.
//!
//! Runs on a background thread; the UI thread never blocks on it.

use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::data::{epoch_first_height, is_valid_epoch};
use crate::error::FetchError;

/// File name of the epoch starting at `first_height`.
pub fn epoch_file_name(first_height: u64) -> String {
    format!("rcp_bitcoin_block_data_{:07}.json", first_height)
}

pub struct EpochClient {
    http: reqwest::blocking::Client,
    data_base: Url,
    tip_url: Url,
}

impl EpochClient {
    pub fn new(cfg: &ClientConfig) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(cfg.user_agent.as_str())
            .timeout(cfg.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            http,
            data_base: base_url(&cfg.data_base_url)?,
            tip_url: Url::parse(&cfg.tip_url)?,
        })
    }

    /// URL of the epoch file for `epoch`.
    pub fn epoch_url(&self, epoch: u64) -> Result<Url, FetchError> {
        if !is_valid_epoch(epoch) {
            return Err(FetchError::EpochOutOfRange { epoch });
        }
        Ok(self.data_base.join(&epoch_file_name(epoch_first_height(epoch)))?)
    }

    /// Current chain tip height.
    pub fn fetch_tip_height(&self) -> Result<u64, FetchError> {
        let body = self.get(&self.tip_url, "Chain tip API")?.text()?;
        parse_tip_height(&body)
    }

    /// Raw epoch payload. Decoding into records is left to the session.
    pub fn fetch_epoch(&self, epoch: u64) -> Result<Value, FetchError> {
        let url = self.epoch_url(epoch)?;
        log::info!("fetching epoch {} from {}", epoch, url);
        let body = self.get(&url, "Epoch data API")?.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    fn get(&self, url: &Url, api: &str) -> Result<reqwest::blocking::Response, FetchError> {
        let response = self.http.get(url.as_str()).header("Accept", "application/json").send()?;
        check_status(response.status(), url, api)?;
        Ok(response)
    }
}

fn base_url(raw: &str) -> Result<Url, FetchError> {
    // `join` replaces the last path segment unless the base ends in '/'
    if raw.ends_with('/') {
        Ok(Url::parse(raw)?)
    } else {
        Ok(Url::parse(&format!("{}/", raw))?)
    }
}

fn check_status(status: StatusCode, url: &Url, api: &str) -> Result<(), FetchError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        log::warn!("{} rate limited ({})", api, url);
        return Err(FetchError::RateLimited { api: api.to_string() });
    }
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(())
}

/// Parse the plain-text tip height body.
pub fn parse_tip_height(body: &str) -> Result<u64, FetchError> {
    let trimmed = body.trim();
    trimmed
        .parse::<u64>()
        .map_err(|_| FetchError::InvalidTipHeight(trimmed.to_string()))
}
