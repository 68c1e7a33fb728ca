use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use dragnet_common::{CollectionStats, Query, SocialItem, SocialPlatform};

use crate::fanout::{fan_out, ProviderFailure, Settled};
use crate::traits::SocialSearcher;

/// Social results for one run, keyed by platform.
#[derive(Debug, Default)]
pub struct SocialOutcome {
    pub by_platform: BTreeMap<SocialPlatform, Vec<SocialItem>>,
    pub failures: Vec<ProviderFailure>,
}

impl SocialOutcome {
    pub fn total(&self) -> usize {
        self.by_platform.values().map(Vec::len).sum()
    }

    pub fn record(&self, stats: &mut CollectionStats) {
        for (platform, items) in &self.by_platform {
            stats.record_social_platform(*platform, items.len());
        }
    }
}

/// Same contract as the web fan-out, across social platform adapters.
pub struct SocialFanOut {
    searchers: Vec<Arc<dyn SocialSearcher>>,
    timeout: Duration,
}

impl SocialFanOut {
    pub fn new(searchers: Vec<Arc<dyn SocialSearcher>>, timeout: Duration) -> Self {
        Self { searchers, timeout }
    }

    pub async fn run(&self, query: &Query) -> SocialOutcome {
        let mut outcome = SocialOutcome::default();
        let mut tasks = Vec::with_capacity(self.searchers.len());

        for searcher in &self.searchers {
            let platform = searcher.platform();
            if !searcher.is_available() {
                info!(%platform, "Social platform not configured, skipping");
                outcome.by_platform.entry(platform).or_default();
                continue;
            }
            let searcher = searcher.clone();
            tasks.push((platform, async move {
                searcher.search(query, platform.default_limit()).await
            }));
        }

        info!(
            platforms = tasks.len(),
            timeout_secs = self.timeout.as_secs(),
            "Starting social fan-out"
        );

        let pool_size = tasks.len();
        for (platform, settled) in fan_out(tasks, pool_size, self.timeout).await {
            let items = match settled {
                Settled::Ok(items) => {
                    info!(%platform, count = items.len(), "Social search complete");
                    items
                }
                failed => {
                    let reason = failed.failure().unwrap_or_default();
                    warn!(%platform, error = reason.as_str(), "Social search failed");
                    outcome.failures.push(ProviderFailure {
                        provider: platform.to_string(),
                        reason,
                    });
                    Vec::new()
                }
            };
            outcome.by_platform.entry(platform).or_default().extend(items);
        }

        info!(
            total = outcome.total(),
            failed = outcome.failures.len(),
            "Social fan-out settled"
        );
        outcome
    }
}
