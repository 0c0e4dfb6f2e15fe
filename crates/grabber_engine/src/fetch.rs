use std::path::Path;
use std::time::Duration;

use grabber_core::{AssetLink, DownloadOutcome};

use crate::download::download_asset;
use crate::types::map_reqwest_error;
use crate::{FailureKind, FetchError};

/// Bounded, fixed-delay retry for asset requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total requests made for one asset, the first one included.
    pub max_attempts: u32,
    /// Pause after a failed attempt when another one follows.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub user_agent: String,
    pub retry: RetryPolicy,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            redirect_limit: 5,
            user_agent: concat!("thread-grabber/", env!("CARGO_PKG_VERSION")).to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Body of the thread page.
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;

    /// Download one asset into `destination_dir`. Never fails: every problem
    /// is reported through the outcome.
    async fn fetch_asset(
        &self,
        link: &AssetLink,
        destination_dir: &Path,
        force_refresh: bool,
    ) -> DownloadOutcome;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { client, settings })
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        response.text().await.map_err(map_reqwest_error)
    }

    async fn fetch_asset(
        &self,
        link: &AssetLink,
        destination_dir: &Path,
        force_refresh: bool,
    ) -> DownloadOutcome {
        download_asset(
            &self.client,
            &self.settings.retry,
            link,
            destination_dir,
            force_refresh,
        )
        .await
    }
}
