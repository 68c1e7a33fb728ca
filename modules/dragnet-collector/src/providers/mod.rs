// Concrete adapters for the collector's trait boundaries.

pub mod crawler;
pub mod exa;
pub mod html;
pub mod page;
pub mod serper;
pub mod unconfigured;

pub use crawler::LinkCrawler;
pub use exa::ExaSearcher;
pub use page::HttpContentExtractor;
pub use serper::SerperSearcher;
pub use unconfigured::UnconfiguredPlatform;

use std::time::Duration;

use anyhow::{Context, Result};

const USER_AGENT: &str = concat!("dragnet/", env!("CARGO_PKG_VERSION"));

/// Shared reqwest client setup for every HTTP adapter.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}
