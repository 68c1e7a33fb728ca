use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use dragnet_common::{Query, SocialItem, SocialPlatform};

use crate::traits::SocialSearcher;

/// Placeholder adapter for a platform with no client wired in. Always
/// answers with zero items so the run treats it like an empty platform.
pub struct UnconfiguredPlatform {
    platform: SocialPlatform,
}

impl UnconfiguredPlatform {
    pub fn new(platform: SocialPlatform) -> Self {
        Self { platform }
    }

    /// One placeholder per known platform.
    pub fn all() -> Vec<Self> {
        SocialPlatform::ALL.iter().copied().map(Self::new).collect()
    }
}

#[async_trait]
impl SocialSearcher for UnconfiguredPlatform {
    fn platform(&self) -> SocialPlatform {
        self.platform
    }

    async fn search(&self, _query: &Query, limit: u32) -> Result<Vec<SocialItem>> {
        debug!(platform = %self.platform, limit, "Platform not configured, returning no items");
        Ok(Vec::new())
    }
}
